mod common;

// std
use std::{
	io::{Read, Write},
	net::TcpListener,
	thread,
};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use common::{build_test_client, test_config};
use kupula_client::{
	api::ApiEnvelope,
	config::TOKEN_KEY,
	credential::KeyValueStore,
	endpoint::{AUTH, CART, CURSOS, PAYMENT, TEST},
	error::{Error, TransportError},
};

/// Serves one 401 whose body is cut short of its declared length, then closes the socket.
fn serve_truncated_unauthorized() -> Result<String> {
	let listener = TcpListener::bind("127.0.0.1:0")?;
	let base_url = format!("http://{}", listener.local_addr()?);

	thread::spawn(move || {
		let Ok((mut stream, _)) = listener.accept() else {
			return;
		};
		let mut request: Vec<u8> = Vec::new();
		let mut buf = [0_u8; 1024];

		while !request.windows(4).any(|w| w == b"\r\n\r\n") {
			match stream.read(&mut buf) {
				Ok(0) | Err(_) => return,
				Ok(n) => request.extend_from_slice(&buf[..n]),
			}
		}

		let _ = stream.write_all(
			b"HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"succ",
		);
		let _ = stream.flush();
	});

	Ok(base_url)
}

#[tokio::test]
async fn stored_token_becomes_bearer_header() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/profile").header("authorization", "Bearer abc");
			then.status(200).json_body(json!({ "success": true, "message": "ok", "data": {} }));
		})
		.await;
	let (client, _store, handler) = build_test_client(test_config(&server.base_url()), Some("abc"));
	let envelope: ApiEnvelope =
		client.get(AUTH.profile).await.expect("Authorized profile call should succeed.");

	assert!(envelope.success);
	assert!(handler.events().is_empty());

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_token_sends_no_authorization_header() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/test/ping").header_missing("authorization");
			then.status(200).json_body(json!({ "success": true, "message": "pong" }));
		})
		.await;
	let (client, _store, _handler) = build_test_client(test_config(&server.base_url()), None);
	let envelope = client.test().ping().await.expect("Anonymous ping should succeed.");

	assert_eq!(envelope.message, "pong");

	mock.assert_async().await;
}

#[tokio::test]
async fn token_is_read_fresh_for_every_request() {
	let server = MockServer::start_async().await;
	let anonymous = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cursos/").header_missing("authorization");
			then.status(200).json_body(json!({ "success": true, "data": [] }));
		})
		.await;
	let authorized = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cursos/").header("authorization", "Bearer later");
			then.status(200).json_body(json!({ "success": true, "data": [] }));
		})
		.await;
	let (client, store, _handler) = build_test_client(test_config(&server.base_url()), None);

	client.cursos().list().await.expect("Anonymous listing should succeed.");
	store.set(TOKEN_KEY, "later").expect("Memory store writes are infallible.");
	client.cursos().list().await.expect("Authorized listing should succeed.");

	anonymous.assert_calls_async(1).await;
	authorized.assert_calls_async(1).await;
}

#[tokio::test]
async fn default_headers_ride_on_every_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/user/cart/add")
				.header("content-type", "application/json")
				.header("accept", "application/json")
				.json_body(json!({ "curso_id": "7" }));
			then.status(200).json_body(json!({ "success": true, "message": "added" }));
		})
		.await;
	let (client, _store, _handler) = build_test_client(test_config(&server.base_url()), Some("t"));
	let envelope = client.cart().add("7").await.expect("Cart add should succeed.");

	assert_eq!(envelope.message, "added");

	mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_reports_login_target_and_returns_original_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/cart");
			then.status(401).json_body(json!({ "success": false, "message": "Token expirado" }));
		})
		.await;
	let (client, _store, handler) =
		build_test_client(test_config(&server.base_url()), Some("expired"));
	let err = client.get::<Value>(CART.list).await.expect_err("Expired session should fail.");

	match &err {
		Error::Status { status, url, body, .. } => {
			assert_eq!(*status, 401);
			assert_eq!(url.path(), "/api/user/cart");
			assert!(body.contains("Token expirado"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	let events = handler.events();

	assert_eq!(events.len(), 1);
	assert_eq!(events[0].target, "/login");
	assert_eq!(events[0].url.path(), "/api/user/cart");

	mock.assert_async().await;
}

#[tokio::test]
async fn other_error_statuses_do_not_navigate() {
	let server = MockServer::start_async().await;

	for (path, status) in [("/api/cursos/999", 404_u16), ("/api/payment/history", 500)] {
		server
			.mock_async(|when, then| {
				when.method(GET).path(path);
				then.status(status).header("retry-after", "3").body("{\"success\":false}");
			})
			.await;
	}

	let (client, _store, handler) = build_test_client(test_config(&server.base_url()), Some("t"));
	let not_found = client
		.get::<Value>(&(CURSOS.detail)("999"))
		.await
		.expect_err("Missing course should fail.");
	let server_error =
		client.get::<Value>(PAYMENT.history).await.expect_err("Server error should fail.");

	assert_eq!(not_found.status(), Some(404));
	assert_eq!(server_error.status(), Some(500));
	assert!(matches!(
		server_error,
		Error::Status { retry_after: Some(d), .. } if d == time::Duration::seconds(3)
	));
	assert!(handler.events().is_empty());
}

#[tokio::test]
async fn timeout_surfaces_as_transport_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/test/cors-test");
			then.status(200).delay(std::time::Duration::from_millis(1_500)).body("{}");
		})
		.await;

	let (client, _store, handler) =
		build_test_client(test_config(&server.base_url()).with_timeout_ms(100), None);
	let err = client.get::<Value>(TEST.cors).await.expect_err("Slow backend should time out.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })), "{err:?}");
	assert!(handler.events().is_empty());
}

#[tokio::test]
async fn undecodable_body_reports_decode_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/test/ping");
			then.status(200).body("pong");
		})
		.await;

	let (client, _store, _handler) = build_test_client(test_config(&server.base_url()), None);
	let err = client.test().ping().await.expect_err("Plain-text reply should not decode.");

	assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn unauthorized_with_unreadable_body_still_reports_login_target() -> Result<()> {
	let base_url = serve_truncated_unauthorized()?;
	let (client, _store, handler) = build_test_client(test_config(&base_url), Some("expired"));
	let err = client.get::<Value>(CART.list).await.expect_err("Expired session should fail.");

	assert_eq!(err.status(), Some(401), "{err:?}");
	assert!(err.is_unauthorized());

	let events = handler.events();

	assert_eq!(events.len(), 1);
	assert_eq!(events[0].target, "/login");
	assert_eq!(events[0].url.path(), "/api/user/cart");

	Ok(())
}

#[tokio::test]
async fn send_credentials_replays_cookies() -> Result<()> {
	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("set-cookie", "sid=1; Path=/")
				.json_body(json!({ "success": true, "message": "ok", "data": null }));
		})
		.await;
	let ping = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/test/ping").header("cookie", "sid=1");
			then.status(200).json_body(json!({ "success": true, "message": "pong" }));
		})
		.await;
	let config = test_config(&server.base_url()).with_send_credentials(true);
	let (client, _store, _handler) = build_test_client(config, None);

	client.post::<_, Value>(AUTH.login, &json!({})).await?;

	let envelope = client.test().ping().await?;

	assert_eq!(envelope.message, "pong");

	login.assert_async().await;
	ping.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn cookies_are_dropped_by_default() -> Result<()> {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("set-cookie", "sid=1; Path=/")
				.json_body(json!({ "success": true, "message": "ok", "data": null }));
		})
		.await;

	let ping = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/test/ping").header_missing("cookie");
			then.status(200).json_body(json!({ "success": true, "message": "pong" }));
		})
		.await;
	let (client, _store, _handler) = build_test_client(test_config(&server.base_url()), None);

	assert!(!client.config().defaults.send_credentials);

	client.post::<_, Value>(AUTH.login, &json!({})).await?;
	client.test().ping().await?;

	ping.assert_async().await;

	Ok(())
}
