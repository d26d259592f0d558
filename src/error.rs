//! Client-level error types shared across the configuration, transport, and storage layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::credential::StoreError,
	),
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Backend answered with a non-success HTTP status.
	#[error("Request to {url} failed with HTTP {status}.")]
	Status {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Fully resolved request URL.
		url: Url,
		/// Raw response body, kept for diagnostics.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Response body could not be decoded into the requested type.
	#[error("Response from {url} could not be decoded.")]
	Decode {
		/// Fully resolved request URL.
		url: Url,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the HTTP status carried by the error, if the backend produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Whether the backend rejected the request with HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
	}
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request could not be assembled.
	#[error("HTTP request could not be constructed.")]
	HttpRequest {
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or request path could not be turned into a URL.
	#[error("URL `{value}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL does not use an HTTP scheme.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Header name is not a valid HTTP token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Header value contains characters HTTP does not allow.
	#[error("Value for header `{name}` is invalid.")]
	InvalidHeaderValue {
		/// Header the value was meant for.
		name: String,
	},
	/// Timeout must be a positive number of milliseconds.
	#[error("The request timeout must be positive.")]
	NonPositiveTimeout,
	/// Configuration document could not be parsed.
	#[error("Client configuration is malformed.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Body(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a request-construction failure inside [`ConfigError`].
	pub fn http_request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpRequest { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The configured timeout elapsed before the backend answered.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { source: Box::new(e) } } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn status_error(status: u16) -> Error {
		Error::Status {
			status,
			url: Url::parse("http://localhost:5000/api/auth/profile")
				.expect("Fixture URL should parse."),
			body: String::new(),
			retry_after: None,
		}
	}

	#[test]
	fn status_accessors_report_http_code() {
		assert_eq!(status_error(401).status(), Some(401));
		assert!(status_error(401).is_unauthorized());
		assert!(!status_error(403).is_unauthorized());
		assert_eq!(Error::from(ConfigError::NonPositiveTimeout).status(), None);
	}

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error =
			crate::credential::StoreError::Backend { message: "disk unavailable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));

		let source = StdError::source(&error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
