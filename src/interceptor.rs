//! Request and response interceptors.
//!
//! Interceptors run synchronously on the send and receive paths of every call made through
//! [`ApiClient`](crate::client::ApiClient). Request interceptors may rewrite the outgoing
//! [`Request`] and abort the call by returning an error; that error reaches the caller
//! unchanged. Response interceptors see every successful [`Response`] and every [`Error`]
//! produced after the request was built.

// crates.io
use reqwest::header::{AUTHORIZATION, HeaderValue};
// self
use crate::{
	_prelude::*,
	config::LOGIN_PATH,
	credential::{CredentialProvider, NoCredentials},
	error::ConfigError,
	obs,
};

/// Hook invoked before a request leaves the client.
pub trait RequestInterceptor
where
	Self: Send + Sync,
{
	/// Inspects or rewrites the outgoing request.
	fn on_request(&self, request: &mut Request) -> Result<()>;
}

/// Hook invoked once the backend answered or the call failed.
pub trait ResponseInterceptor
where
	Self: Send + Sync,
{
	/// Inspects or replaces a successful response.
	fn on_response(&self, response: Response) -> Result<Response> {
		Ok(response)
	}

	/// Observes a failed call; the returned error is what the caller sees.
	fn on_error(&self, error: Error) -> Error {
		error
	}
}

/// Attaches `Authorization: Bearer <token>` whenever the provider yields a token.
#[derive(Clone)]
pub struct BearerAuth {
	provider: Arc<dyn CredentialProvider>,
}
impl BearerAuth {
	/// Wraps a credential provider.
	pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
		Self { provider }
	}
}
impl Default for BearerAuth {
	fn default() -> Self {
		Self::new(Arc::new(NoCredentials))
	}
}
impl RequestInterceptor for BearerAuth {
	fn on_request(&self, request: &mut Request) -> Result<()> {
		let Some(token) = self.provider.token()? else {
			return Ok(());
		};
		let mut value = HeaderValue::from_str(&token.bearer()).map_err(|_| {
			ConfigError::InvalidHeaderValue { name: AUTHORIZATION.as_str().to_owned() }
		})?;

		value.set_sensitive(true);
		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(())
	}
}
impl Debug for BearerAuth {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BearerAuth(..)")
	}
}

/// Emitted when the backend rejects a call with HTTP 401.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnauthorizedEvent {
	/// Where the host application should navigate, `/login` by default.
	pub target: String,
	/// URL of the rejected request.
	pub url: Url,
}

/// Receives [`UnauthorizedEvent`]s; the host application decides how to navigate.
pub trait UnauthorizedHandler
where
	Self: Send + Sync,
{
	/// Called once per rejected call, before the error is returned to the caller.
	fn on_unauthorized(&self, event: &UnauthorizedEvent);
}
impl<F> UnauthorizedHandler for F
where
	F: Send + Sync + Fn(&UnauthorizedEvent),
{
	fn on_unauthorized(&self, event: &UnauthorizedEvent) {
		self(event)
	}
}

/// Handler that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHandler;
impl UnauthorizedHandler for NoopHandler {
	fn on_unauthorized(&self, _: &UnauthorizedEvent) {}
}

/// Reports HTTP 401 responses to an [`UnauthorizedHandler`] and re-propagates the error.
#[derive(Clone)]
pub struct UnauthorizedRedirect {
	target: String,
	handler: Arc<dyn UnauthorizedHandler>,
}
impl UnauthorizedRedirect {
	/// Reports to `handler` with the default `/login` target.
	pub fn new(handler: Arc<dyn UnauthorizedHandler>) -> Self {
		Self::with_target(handler, LOGIN_PATH)
	}

	/// Reports to `handler` with a custom target.
	pub fn with_target(handler: Arc<dyn UnauthorizedHandler>, target: impl Into<String>) -> Self {
		Self { target: target.into(), handler }
	}

	/// Navigation target carried by emitted events.
	pub fn target(&self) -> &str {
		&self.target
	}
}
impl ResponseInterceptor for UnauthorizedRedirect {
	fn on_error(&self, error: Error) -> Error {
		if let Error::Status { status: 401, url, .. } = &error {
			obs::unauthorized(url, &self.target);
			self.handler.on_unauthorized(&UnauthorizedEvent {
				target: self.target.clone(),
				url: url.clone(),
			});
		}

		error
	}
}
impl Debug for UnauthorizedRedirect {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UnauthorizedRedirect").field("target", &self.target).finish()
	}
}
