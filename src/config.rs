//! Client configuration: base URL, request defaults, and the login redirect target.

// crates.io
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
// self
use crate::{_prelude::*, error::ConfigError};

/// Backend base URL used when none is configured.
pub const BASE_URL: &str = "http://localhost:5000";
/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Navigation target reported when the backend answers HTTP 401.
pub const LOGIN_PATH: &str = "/login";
/// Storage key holding the access token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Defaults applied to every outgoing request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestDefaults {
	/// Headers attached to every request.
	pub headers: BTreeMap<String, String>,
	/// Per-request timeout in milliseconds.
	pub timeout_ms: u64,
	/// Whether cookies are stored and replayed across requests.
	pub send_credentials: bool,
}
impl RequestDefaults {
	/// Per-request timeout as a std duration.
	pub fn timeout(&self) -> std::time::Duration {
		std::time::Duration::from_millis(self.timeout_ms)
	}

	/// Converts the header table into a validated [`HeaderMap`].
	pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
		let mut map = HeaderMap::with_capacity(self.headers.len());

		for (name, value) in &self.headers {
			let key = HeaderName::from_bytes(name.as_bytes())
				.map_err(|_| ConfigError::InvalidHeaderName { name: name.clone() })?;
			let value = HeaderValue::from_str(value)
				.map_err(|_| ConfigError::InvalidHeaderValue { name: name.clone() })?;

			map.insert(key, value);
		}

		Ok(map)
	}
}
impl Default for RequestDefaults {
	fn default() -> Self {
		let headers = [("Content-Type", "application/json"), ("Accept", "application/json")]
			.into_iter()
			.map(|(k, v)| (k.to_owned(), v.to_owned()))
			.collect();

		Self { headers, timeout_ms: DEFAULT_TIMEOUT_MS, send_credentials: false }
	}
}

/// Full client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
	/// Backend origin every relative path is appended to.
	pub base_url: Url,
	/// Request defaults.
	#[serde(rename = "request")]
	pub defaults: RequestDefaults,
	/// Navigation target reported on HTTP 401.
	pub login_path: String,
}
impl ClientConfig {
	/// Parses a (possibly partial) JSON document; missing fields keep their defaults.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		Self::from_json_slice(raw.as_bytes())
	}

	/// Parses a (possibly partial) JSON document from bytes.
	pub fn from_json_slice(raw: &[u8]) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_slice(raw);
		let config: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Parse { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Replaces the base URL.
	pub fn with_base_url(mut self, url: Url) -> Self {
		self.base_url = url;

		self
	}

	/// Replaces the request timeout.
	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.defaults.timeout_ms = timeout_ms;

		self
	}

	/// Adds or replaces a default header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.defaults.headers.insert(name.into(), value.into());

		self
	}

	/// Toggles cookie replay.
	pub fn with_send_credentials(mut self, enabled: bool) -> Self {
		self.defaults.send_credentials = enabled;

		self
	}

	/// Replaces the login redirect target.
	pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Checks the invariants the client relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.defaults.timeout_ms == 0 {
			return Err(ConfigError::NonPositiveTimeout);
		}

		self.defaults.header_map()?;

		Ok(())
	}

	/// Appends a relative path to the base URL.
	///
	/// Paths are concatenated rather than resolved, so a base URL carrying a path prefix keeps
	/// it. Absolute URLs (`scheme://...`, any scheme casing) are passed through untouched and
	/// protocol-relative ones (`//host/...`) inherit the base URL's scheme.
	pub fn join(&self, path: &str) -> Result<Url, ConfigError> {
		if path.starts_with("//") {
			let absolute = format!("{}:{path}", self.base_url.scheme());

			return Url::parse(&absolute)
				.map_err(|source| ConfigError::InvalidUrl { value: absolute, source });
		}
		if is_absolute(path) {
			return Url::parse(path)
				.map_err(|source| ConfigError::InvalidUrl { value: path.to_owned(), source });
		}

		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.is_empty() || path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl { value: joined, source })
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: Url::parse(BASE_URL).expect("BASE_URL is a valid URL literal."),
			defaults: RequestDefaults::default(),
			login_path: LOGIN_PATH.to_owned(),
		}
	}
}

fn is_absolute(path: &str) -> bool {
	let Some((scheme, _)) = path.split_once("://") else {
		return false;
	};
	let mut chars = scheme.chars();

	chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
