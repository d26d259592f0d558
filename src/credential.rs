//! Token storage contracts, built-in stores, and the credential providers that feed the
//! bearer-token interceptor.
//!
//! [`KeyValueStore`] stands in for browser local storage: a process-wide string map the
//! application writes tokens into. [`CredentialProvider`] is the read side the client consults
//! before every request, injected explicitly instead of read from a global.

pub mod file;
pub mod memory;
pub mod secret;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use secret::TokenSecret;

// self
use crate::{_prelude::*, config::TOKEN_KEY};

/// String key/value storage shared by the application and the client.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`, if any.
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

	/// Removes `key`, returning the previous value.
	fn remove(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Supplies the bearer token attached to outgoing requests.
pub trait CredentialProvider
where
	Self: Send + Sync,
{
	/// Returns the current token, or `None` when the request should go out unauthenticated.
	fn token(&self) -> Result<Option<TokenSecret>>;
}
impl<F> CredentialProvider for F
where
	F: Send + Sync + Fn() -> Option<String>,
{
	fn token(&self) -> Result<Option<TokenSecret>> {
		Ok(self().filter(|t| !t.is_empty()).map(TokenSecret::new))
	}
}

/// Provider that never supplies a token.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentials;
impl CredentialProvider for NoCredentials {
	fn token(&self) -> Result<Option<TokenSecret>> {
		Ok(None)
	}
}

/// Reads the token from one key of a [`KeyValueStore`] on every call.
#[derive(Clone)]
pub struct StoredCredentials {
	store: Arc<dyn KeyValueStore>,
	key: String,
}
impl StoredCredentials {
	/// Reads the default `token` key.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self::with_key(store, TOKEN_KEY)
	}

	/// Reads a custom key.
	pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
		Self { store, key: key.into() }
	}

	/// Key consulted on every read.
	pub fn key(&self) -> &str {
		&self.key
	}
}
impl CredentialProvider for StoredCredentials {
	fn token(&self) -> Result<Option<TokenSecret>> {
		let value = self.store.get(&self.key)?;

		Ok(value.filter(|t| !t.is_empty()).map(TokenSecret::new))
	}
}
impl Debug for StoredCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StoredCredentials").field("key", &self.key).finish()
	}
}
