//! Client factory and the configured API client.
//!
//! [`create_client`] takes a reqwest [`ClientBuilder`] (the HTTP client "constructor"), applies
//! the base URL, timeout, default headers, and cookie policy from a [`ClientConfig`], and
//! attaches two interceptors: [`BearerAuth`] on the way out and [`UnauthorizedRedirect`] on the
//! way back. Every call to the factory produces an independent client; nothing it applies
//! depends on earlier invocations.

// crates.io
use reqwest::{
	ClientBuilder,
	header::{HeaderMap, RETRY_AFTER},
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	credential::{CredentialProvider, NoCredentials},
	error::{ConfigError, TransportError},
	interceptor::{
		BearerAuth, NoopHandler, RequestInterceptor, ResponseInterceptor, UnauthorizedHandler,
		UnauthorizedRedirect,
	},
	obs::{self, RequestOutcome, RequestSpan},
};

/// Builds a configured [`ApiClient`] on top of the provided reqwest builder.
///
/// The bearer interceptor consults `credentials` before every request; the unauthorized
/// interceptor reports HTTP 401 responses to `handler` with the configured login path.
pub fn create_client(
	http: ClientBuilder,
	config: ClientConfig,
	credentials: Arc<dyn CredentialProvider>,
	handler: Arc<dyn UnauthorizedHandler>,
) -> Result<ApiClient> {
	config.validate()?;

	let http = http
		.timeout(config.defaults.timeout())
		.default_headers(config.defaults.header_map()?)
		.cookie_store(config.defaults.send_credentials)
		.build()
		.map_err(ConfigError::http_client_build)?;
	let bearer: Arc<dyn RequestInterceptor> = Arc::new(BearerAuth::new(credentials));
	let redirect: Arc<dyn ResponseInterceptor> =
		Arc::new(UnauthorizedRedirect::with_target(handler, config.login_path.clone()));

	Ok(ApiClient {
		http,
		config: Arc::new(config),
		request_interceptors: vec![bearer],
		response_interceptors: vec![redirect],
	})
}

/// HTTP client bound to a base URL, request defaults, and an interceptor chain.
#[derive(Clone)]
pub struct ApiClient {
	http: ReqwestClient,
	config: Arc<ClientConfig>,
	request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
	response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}
impl ApiClient {
	/// Creates a client with the provided configuration, no credentials, and no 401 handler.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::builder().config(config).build()
	}

	/// Starts a builder seeded with the default configuration.
	pub fn builder() -> ApiClientBuilder {
		ApiClientBuilder::default()
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Underlying reqwest client.
	pub fn http(&self) -> &ReqwestClient {
		&self.http
	}

	/// Returns a copy of the client whose bearer interceptor reads from `provider`.
	///
	/// Only the interceptor installed by [`create_client`] is replaced; interceptors appended
	/// later are kept.
	pub fn with_credentials(&self, provider: impl 'static + CredentialProvider) -> Self {
		let mut next = self.clone();

		if let Some(bearer) = next.request_interceptors.first_mut() {
			*bearer = Arc::new(BearerAuth::new(Arc::new(provider)));
		}

		next
	}

	/// Appends a request interceptor; interceptors run in insertion order.
	pub fn with_request_interceptor(
		mut self,
		interceptor: impl 'static + RequestInterceptor,
	) -> Self {
		self.request_interceptors.push(Arc::new(interceptor));

		self
	}

	/// Appends a response interceptor; interceptors run in insertion order.
	pub fn with_response_interceptor(
		mut self,
		interceptor: impl 'static + ResponseInterceptor,
	) -> Self {
		self.response_interceptors.push(Arc::new(interceptor));

		self
	}

	/// Sends one request and returns the raw response.
	///
	/// Construction failures (bad path, unserializable body, interceptor errors) are returned
	/// as-is. Transport failures and non-2xx statuses flow through the response interceptors'
	/// `on_error` hooks before reaching the caller. No retry is attempted.
	pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
	where
		B: ?Sized + Serialize,
	{
		let span = RequestSpan::new(&method, path);

		obs::record_request_outcome(&method, RequestOutcome::Attempt);

		let result = span.instrument(self.dispatch(method.clone(), path, body)).await;
		let outcome =
			if result.is_ok() { RequestOutcome::Success } else { RequestOutcome::Failure };

		obs::record_request_outcome(&method, outcome);

		result
	}

	/// `GET`s `path` and decodes the JSON body.
	pub async fn get<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.send::<()>(Method::GET, path, None).await?;

		decode(response).await
	}

	/// `POST`s `body` as JSON to `path` and decodes the JSON reply.
	pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let response = self.send(Method::POST, path, Some(body)).await?;

		decode(response).await
	}

	/// `PUT`s `body` as JSON to `path` and decodes the JSON reply.
	pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let response = self.send(Method::PUT, path, Some(body)).await?;

		decode(response).await
	}

	/// `DELETE`s `path` and decodes the JSON reply.
	pub async fn delete<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.send::<()>(Method::DELETE, path, None).await?;

		decode(response).await
	}

	async fn dispatch<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
	where
		B: ?Sized + Serialize,
	{
		let mut request = self.build_request(method, path, body)?;

		for interceptor in &self.request_interceptors {
			interceptor.on_request(&mut request)?;
		}

		match self.execute(request).await {
			Ok(mut response) => {
				for interceptor in &self.response_interceptors {
					response = interceptor.on_response(response)?;
				}

				Ok(response)
			},
			Err(mut error) => {
				for interceptor in &self.response_interceptors {
					error = interceptor.on_error(error);
				}

				Err(error)
			},
		}
	}

	fn build_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request>
	where
		B: ?Sized + Serialize,
	{
		let url = self.config.join(path)?;
		let mut builder = self.http.request(method, url);

		if let Some(body) = body {
			builder = builder.body(serde_json::to_vec(body).map_err(ConfigError::Body)?);
		}

		Ok(builder.build().map_err(ConfigError::http_request)?)
	}

	async fn execute(&self, request: Request) -> Result<Response> {
		let response = self.http.execute(request).await.map_err(TransportError::from)?;
		let status = response.status();

		if status.is_success() {
			return Ok(response);
		}

		let url = response.url().clone();
		let retry_after = parse_retry_after(response.headers());
		// The status decides the error; a body that fails mid-read is reported as empty.
		let body = response.text().await.unwrap_or_default();

		Err(Error::Status { status: status.as_u16(), url, body, retry_after })
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("request_interceptors", &self.request_interceptors.len())
			.field("response_interceptors", &self.response_interceptors.len())
			.finish()
	}
}

/// Builder for [`ApiClient`] values; every piece is optional.
pub struct ApiClientBuilder {
	http: Option<ClientBuilder>,
	config: ClientConfig,
	credentials: Arc<dyn CredentialProvider>,
	handler: Arc<dyn UnauthorizedHandler>,
}
impl ApiClientBuilder {
	/// Uses a caller-prepared reqwest builder (proxies, TLS roots, user agent, ...).
	pub fn http(mut self, http: ClientBuilder) -> Self {
		self.http = Some(http);

		self
	}

	/// Replaces the configuration.
	pub fn config(mut self, config: ClientConfig) -> Self {
		self.config = config;

		self
	}

	/// Sets the provider consulted for the bearer token.
	pub fn credentials(mut self, provider: impl 'static + CredentialProvider) -> Self {
		self.credentials = Arc::new(provider);

		self
	}

	/// Sets the handler notified on HTTP 401.
	pub fn on_unauthorized(mut self, handler: impl 'static + UnauthorizedHandler) -> Self {
		self.handler = Arc::new(handler);

		self
	}

	/// Runs [`create_client`] with the collected pieces.
	pub fn build(self) -> Result<ApiClient> {
		let http = self.http.unwrap_or_else(ReqwestClient::builder);

		create_client(http, self.config, self.credentials, self.handler)
	}
}
impl Default for ApiClientBuilder {
	fn default() -> Self {
		Self {
			http: None,
			config: ClientConfig::default(),
			credentials: Arc::new(NoCredentials),
			handler: Arc::new(NoopHandler),
		}
	}
}
impl Debug for ApiClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClientBuilder").field("config", &self.config).finish()
	}
}

async fn decode<T>(response: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let url = response.url().clone();
	let bytes = response.bytes().await.map_err(TransportError::from)?;
	let raw: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
	let mut de = serde_json::Deserializer::from_slice(raw);

	serde_path_to_error::deserialize(&mut de).map_err(|source| Error::Decode { url, source })
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
