//! Login-state bookkeeping on top of a [`KeyValueStore`].
//!
//! The session writes the tokens the backend issues into the same store the client's
//! [`StoredCredentials`] read from, so every later call picks them up without further wiring.

// self
use crate::{
	_prelude::*,
	api::{ApiEnvelope, Credentials, LoginData},
	client::ApiClient,
	config::{REFRESH_TOKEN_KEY, TOKEN_KEY},
	credential::{KeyValueStore, StoredCredentials},
};

/// Couples an [`ApiClient`] with the token store it authenticates from.
#[derive(Clone)]
pub struct Session {
	client: ApiClient,
	store: Arc<dyn KeyValueStore>,
	guard: Arc<AsyncMutex<()>>,
}
impl Session {
	/// Wraps a client and the store its credential provider reads.
	pub fn new(client: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
		Self { client, store, guard: Default::default() }
	}

	/// Client used for every call.
	pub fn client(&self) -> &ApiClient {
		&self.client
	}

	/// Whether an access token is currently stored.
	pub fn is_authenticated(&self) -> Result<bool> {
		Ok(self.store.get(TOKEN_KEY)?.is_some_and(|t| !t.is_empty()))
	}

	/// Logs in and persists the issued tokens.
	pub async fn login(&self, credentials: &Credentials) -> Result<ApiEnvelope<LoginData>> {
		let _guard = self.guard.lock().await;
		let envelope = self.client.auth().login(credentials).await?;

		if let Some(data) = envelope.data.as_ref() {
			self.store.set(TOKEN_KEY, &data.access_token)?;

			match data.refresh_token.as_deref() {
				Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh)?,
				None => {
					self.store.remove(REFRESH_TOKEN_KEY)?;
				},
			}
		}

		Ok(envelope)
	}

	/// Trades the stored refresh token for a new access token and stores it.
	///
	/// Returns `Ok(None)` without calling the backend when no refresh token is stored.
	pub async fn refresh(&self) -> Result<Option<String>> {
		let _guard = self.guard.lock().await;

		if self.store.get(REFRESH_TOKEN_KEY)?.is_none_or(|t| t.is_empty()) {
			return Ok(None);
		}

		let refresher = self
			.client
			.with_credentials(StoredCredentials::with_key(self.store.clone(), REFRESH_TOKEN_KEY));
		let envelope = refresher.auth().refresh().await?;
		let Some(data) = envelope.data else {
			return Ok(None);
		};

		self.store.set(TOKEN_KEY, &data.access_token)?;

		Ok(Some(data.access_token))
	}

	/// Ends the backend session and clears both tokens.
	///
	/// The tokens are cleared even when the backend call fails; that failure is still returned.
	pub async fn logout(&self) -> Result<()> {
		let _guard = self.guard.lock().await;
		let outcome = self.client.auth().logout().await;

		self.store.remove(TOKEN_KEY)?;
		self.store.remove(REFRESH_TOKEN_KEY)?;

		outcome.map(|_| ())
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session").field("client", &self.client).finish()
	}
}
