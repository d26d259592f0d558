//! Optional observability helpers for API calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `kupula_client.request` with the `method`
//!   and `path` fields, plus a `warn` event whenever the backend answers HTTP 401.
//! - Enable `metrics` to increment the `kupula_client_request_total` counter for every
//!   attempt/success/failure, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to [`ApiClient::send`](crate::client::ApiClient::send).
	Attempt,
	/// The backend answered with a success status.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Logs an HTTP 401 and the navigation target reported to the host application.
pub fn unauthorized(url: &Url, target: &str) {
	#[cfg(feature = "tracing")]
	{
		::tracing::warn!(url = %url, target, "backend rejected the session");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (url, target);
	}
}
