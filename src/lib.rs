//! Typed Akademia Kupula API client: an endpoint registry plus bearer-token injection and
//! unauthorized-session hooks layered over reqwest.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod client;
pub mod config;
pub mod credential;
pub mod endpoint;
pub mod error;
pub mod interceptor;
pub mod obs;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{
		Client as ReqwestClient, Error as ReqwestError, Method, Request, Response, StatusCode,
	};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
