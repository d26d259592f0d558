// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
// self
use kupula_client::{
	client::ApiClient,
	config::{ClientConfig, TOKEN_KEY},
	credential::{KeyValueStore, MemoryStore, StoredCredentials},
	interceptor::{UnauthorizedEvent, UnauthorizedHandler},
	url::Url,
};

/// Unauthorized handler that records every event it receives.
#[derive(Clone, Debug, Default)]
pub struct RecordingHandler(Arc<Mutex<Vec<UnauthorizedEvent>>>);
impl RecordingHandler {
	pub fn events(&self) -> Vec<UnauthorizedEvent> {
		self.0.lock().clone()
	}
}
impl UnauthorizedHandler for RecordingHandler {
	fn on_unauthorized(&self, event: &UnauthorizedEvent) {
		self.0.lock().push(event.clone());
	}
}

pub fn test_config(base_url: &str) -> ClientConfig {
	let url = Url::parse(base_url).expect("Mock server base URL should parse.");

	ClientConfig::default().with_base_url(url)
}

/// Builds a client backed by an in-memory token store and a recording 401 handler.
pub fn build_test_client(
	config: ClientConfig,
	token: Option<&str>,
) -> (ApiClient, Arc<MemoryStore>, RecordingHandler) {
	let store = Arc::new(MemoryStore::default());

	if let Some(token) = token {
		store.set(TOKEN_KEY, token).expect("Memory store writes are infallible.");
	}

	let handler = RecordingHandler::default();
	let client = ApiClient::builder()
		.config(config)
		.credentials(StoredCredentials::new(store.clone()))
		.on_unauthorized(handler.clone())
		.build()
		.expect("Test client should build.");

	(client, store, handler)
}
