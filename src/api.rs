//! Thin typed calls over the endpoint registry.
//!
//! Each group borrows an [`ApiClient`] and maps one method to one registry route. Replies use
//! the backend's standard envelope (`success`, `message`, `data`, optional `errors`).

pub mod session;

pub use session::Session;

// crates.io
use serde_json::Value;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	endpoint::{AUTH, CART, CURSOS, CollectionRoutes, PAYMENT, TEST, WISHLIST},
};

/// Standard reply envelope produced by every backend route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T = Value> {
	/// Whether the backend considers the operation successful.
	#[serde(default)]
	pub success: bool,
	/// Human-readable status message.
	#[serde(default)]
	pub message: String,
	/// Operation payload.
	pub data: Option<T>,
	/// Field-level validation errors, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<Value>>,
}
impl<T> ApiEnvelope<T> {
	/// Returns the payload, if any.
	pub fn into_data(self) -> Option<T> {
		self.data
	}
}

/// Email/password credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
	/// Account email.
	pub email: String,
	/// Account password.
	pub password: String,
}
impl Credentials {
	/// Bundles an email/password pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Payload returned by a successful login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
	/// Short-lived access token.
	pub access_token: String,
	/// Refresh token, when issued.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Public user record.
	#[serde(default)]
	pub user: Value,
}

/// Payload returned by a successful refresh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefreshData {
	/// Replacement access token.
	pub access_token: String,
}

#[derive(Serialize)]
struct CursoRef<'a> {
	curso_id: &'a str,
}

#[derive(Serialize)]
struct CheckoutRequest<'a> {
	#[serde(rename = "courseId")]
	course_id: &'a str,
}

/// Authentication calls.
#[derive(Clone, Copy, Debug)]
pub struct AuthApi<'a>(pub &'a ApiClient);
impl AuthApi<'_> {
	/// Exchanges credentials for tokens.
	pub async fn login(&self, credentials: &Credentials) -> Result<ApiEnvelope<LoginData>> {
		self.0.post(AUTH.login, credentials).await
	}

	/// Creates an account; the body is forwarded verbatim.
	pub async fn register<B>(&self, account: &B) -> Result<ApiEnvelope>
	where
		B: ?Sized + Serialize,
	{
		self.0.post(AUTH.register, account).await
	}

	/// Ends the current session.
	pub async fn logout(&self) -> Result<ApiEnvelope> {
		self.0.post(AUTH.logout, &Value::Null).await
	}

	/// Fetches the authenticated user.
	pub async fn profile(&self) -> Result<ApiEnvelope> {
		self.0.get(AUTH.profile).await
	}

	/// Trades the current bearer token (a refresh token) for a new access token.
	pub async fn refresh(&self) -> Result<ApiEnvelope<RefreshData>> {
		self.0.post(AUTH.refresh, &Value::Null).await
	}
}

/// Course catalogue calls.
#[derive(Clone, Copy, Debug)]
pub struct CursosApi<'a>(pub &'a ApiClient);
impl CursosApi<'_> {
	/// Lists courses.
	pub async fn list(&self) -> Result<ApiEnvelope> {
		self.0.get(CURSOS.list).await
	}

	/// Fetches one course.
	pub async fn detail(&self, id: &str) -> Result<ApiEnvelope> {
		self.0.get(&(CURSOS.detail)(id)).await
	}

	/// Searches courses by free text.
	pub async fn search(&self, query: &str) -> Result<ApiEnvelope> {
		let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();

		self.0.get(&format!("{}?q={encoded}", CURSOS.search)).await
	}
}

/// Cart or wishlist calls; both collections share one shape.
#[derive(Clone, Copy, Debug)]
pub struct CollectionApi<'a> {
	client: &'a ApiClient,
	routes: CollectionRoutes,
}
impl<'a> CollectionApi<'a> {
	/// Cart calls.
	pub fn cart(client: &'a ApiClient) -> Self {
		Self { client, routes: CART }
	}

	/// Wishlist calls.
	pub fn wishlist(client: &'a ApiClient) -> Self {
		Self { client, routes: WISHLIST }
	}

	/// Lists the collection.
	pub async fn list(&self) -> Result<ApiEnvelope> {
		self.client.get(self.routes.list).await
	}

	/// Adds a course.
	pub async fn add(&self, curso_id: &str) -> Result<ApiEnvelope> {
		self.client.post(self.routes.add, &CursoRef { curso_id }).await
	}

	/// Removes a course.
	pub async fn remove(&self, curso_id: &str) -> Result<ApiEnvelope> {
		self.client.post(self.routes.remove, &CursoRef { curso_id }).await
	}

	/// Empties the collection.
	pub async fn clear(&self) -> Result<ApiEnvelope> {
		self.client.post(self.routes.clear, &Value::Null).await
	}
}

/// Checkout calls.
#[derive(Clone, Copy, Debug)]
pub struct PaymentApi<'a>(pub &'a ApiClient);
impl PaymentApi<'_> {
	/// Opens a checkout session for one course.
	pub async fn create_session(&self, course_id: &str) -> Result<ApiEnvelope> {
		self.0.post(PAYMENT.create_session, &CheckoutRequest { course_id }).await
	}

	/// Polls the status of a checkout session.
	pub async fn check_status(&self, session_id: &str) -> Result<ApiEnvelope> {
		self.0.get(&(PAYMENT.check_status)(session_id)).await
	}

	/// Lists past payments.
	pub async fn history(&self) -> Result<ApiEnvelope> {
		self.0.get(PAYMENT.history).await
	}
}

/// Connectivity probes.
#[derive(Clone, Copy, Debug)]
pub struct TestApi<'a>(pub &'a ApiClient);
impl TestApi<'_> {
	/// Liveness probe.
	pub async fn ping(&self) -> Result<ApiEnvelope> {
		self.0.get(TEST.ping).await
	}

	/// CORS echo probe.
	pub async fn cors(&self) -> Result<ApiEnvelope> {
		self.0.get(TEST.cors).await
	}
}

impl ApiClient {
	/// Authentication calls.
	pub fn auth(&self) -> AuthApi<'_> {
		AuthApi(self)
	}

	/// Course catalogue calls.
	pub fn cursos(&self) -> CursosApi<'_> {
		CursosApi(self)
	}

	/// Cart calls.
	pub fn cart(&self) -> CollectionApi<'_> {
		CollectionApi::cart(self)
	}

	/// Wishlist calls.
	pub fn wishlist(&self) -> CollectionApi<'_> {
		CollectionApi::wishlist(self)
	}

	/// Checkout calls.
	pub fn payment(&self) -> PaymentApi<'_> {
		PaymentApi(self)
	}

	/// Connectivity probes.
	pub fn test(&self) -> TestApi<'_> {
		TestApi(self)
	}
}
