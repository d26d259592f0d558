mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::{build_test_client, test_config};
use kupula_client::{
	api::{Credentials, Session},
	config::{REFRESH_TOKEN_KEY, TOKEN_KEY},
	credential::KeyValueStore,
};

#[tokio::test]
async fn login_persists_tokens_used_by_later_calls() {
	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/login")
				.header_missing("authorization")
				.json_body(json!({ "email": "ana@example.com", "password": "secreto" }));
			then.status(200).json_body(json!({
				"success": true,
				"message": "Inicio de sesión exitoso",
				"data": {
					"access_token": "access-1",
					"refresh_token": "refresh-1",
					"user": { "id": 3, "email": "ana@example.com" }
				}
			}));
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/profile").header("authorization", "Bearer access-1");
			then.status(200).json_body(json!({ "success": true, "data": { "id": 3 } }));
		})
		.await;
	let (client, store, _handler) = build_test_client(test_config(&server.base_url()), None);
	let session = Session::new(client, store.clone());

	assert!(!session.is_authenticated().expect("Memory store reads are infallible."));

	let envelope = session
		.login(&Credentials::new("ana@example.com", "secreto"))
		.await
		.expect("Login should succeed.");

	assert_eq!(envelope.data.map(|d| d.user["id"].clone()), Some(json!(3)));
	assert!(session.is_authenticated().expect("Memory store reads are infallible."));
	assert_eq!(store.get(REFRESH_TOKEN_KEY).expect("Reads are infallible."), Some("refresh-1".into()));

	let me = session.client().auth().profile().await.expect("Profile should succeed.");

	assert!(me.success);

	login.assert_async().await;
	profile.assert_async().await;
}

#[tokio::test]
async fn refresh_sends_refresh_token_and_stores_new_access_token() {
	let server = MockServer::start_async().await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh").header("authorization", "Bearer refresh-1");
			then.status(200).json_body(json!({
				"success": true,
				"message": "Token refrescado correctamente",
				"data": { "access_token": "access-2" }
			}));
		})
		.await;
	let (client, store, _handler) =
		build_test_client(test_config(&server.base_url()), Some("access-1"));

	store.set(REFRESH_TOKEN_KEY, "refresh-1").expect("Memory store writes are infallible.");

	let session = Session::new(client, store.clone());
	let token = session.refresh().await.expect("Refresh should succeed.");

	assert_eq!(token.as_deref(), Some("access-2"));
	assert_eq!(store.get(TOKEN_KEY).expect("Reads are infallible."), Some("access-2".into()));

	refresh.assert_async().await;
}

#[tokio::test]
async fn refresh_without_refresh_token_skips_the_backend() {
	let server = MockServer::start_async().await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200);
		})
		.await;
	let (client, store, _handler) =
		build_test_client(test_config(&server.base_url()), Some("access-1"));
	let session = Session::new(client, store);

	assert_eq!(session.refresh().await.expect("Skipping refresh is not an error."), None);

	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn logout_clears_tokens_even_when_backend_rejects() {
	let server = MockServer::start_async().await;
	let logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/logout").header("authorization", "Bearer access-1");
			then.status(401).json_body(json!({ "success": false, "message": "Token no válido" }));
		})
		.await;
	let (client, store, handler) =
		build_test_client(test_config(&server.base_url()), Some("access-1"));

	store.set(REFRESH_TOKEN_KEY, "refresh-1").expect("Memory store writes are infallible.");

	let session = Session::new(client, Arc::clone(&store) as Arc<dyn KeyValueStore>);
	let err = session.logout().await.expect_err("Rejected logout should surface the 401.");

	assert!(err.is_unauthorized());
	assert!(store.is_empty());
	assert_eq!(handler.events().len(), 1);

	logout.assert_async().await;
}
