#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_gate::{
	config::ClientConfig,
	gate::{ReqwestTokenGate, TokenGate},
	http::Request,
	store::{CredentialStore, MemoryStore},
	token::{Secret, TokenPair},
	url::Url,
};

const TOKEN_URI: &str = "/oauth/v2/token";
const CLIENT_ID: &str = "azerty";
const CLIENT_SECRET: &str = "abc123";
const USERNAME: &str = "john@mail.com";
const PASSWORD: &str = "123456";

fn build_gate(server: &MockServer) -> (ReqwestTokenGate, MemoryStore) {
	let store_backend = MemoryStore::default();
	let store: Arc<dyn CredentialStore> = Arc::new(store_backend.clone());
	let config = ClientConfig::default()
		.with_base_url(Url::parse(&server.base_url()).expect("Mock server URL should parse."))
		.with_token_uri(TOKEN_URI)
		.with_client(CLIENT_ID, CLIENT_SECRET)
		.with_user(USERNAME, PASSWORD);

	(TokenGate::new(store, config), store_backend)
}

fn seed_tokens(store: &MemoryStore, access: &str, refresh: &str) {
	<dyn CredentialStore>::store_pair(store, TokenPair::new(access, refresh))
		.expect("Seeding the token pair should succeed.");
}

fn stored(store: &MemoryStore) -> (Option<String>, Option<String>) {
	let pair = <dyn CredentialStore>::token_pair(store);

	(
		pair.access_token.as_ref().map(Secret::expose).map(str::to_owned),
		pair.refresh_token.as_ref().map(Secret::expose).map(str::to_owned),
	)
}

#[tokio::test]
async fn request_authenticates_before_first_query() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_URI).json_body(json!({
				"client_id": CLIENT_ID,
				"client_secret": CLIENT_SECRET,
				"grant_type": "password",
				"username": USERNAME,
				"password": PASSWORD,
			}));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"AT1","refresh_token":"RT1"}"#);
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch").header("authorization", "Bearer AT1");
			then.status(200).body("Success!");
		})
		.await;
	let outcome =
		gate.request(Request::get("/fetch")).await.expect("Gated request should succeed.");

	token_mock.assert_async().await;
	fetch_mock.assert_async().await;

	assert_eq!(outcome.body, "Success!");
	assert_eq!(outcome.request_header("Authorization"), Some("Bearer AT1"));
	assert_eq!(stored(&store), (Some("AT1".into()), Some("RT1".into())));
}

#[tokio::test]
async fn request_reuses_stored_token() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);

	seed_tokens(&store, "AT1", "RT1");

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_URI);
			then.status(500);
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch").header("authorization", "Bearer AT1");
			then.status(200).body("Success!");
		})
		.await;
	let outcome =
		gate.request(Request::get("/fetch")).await.expect("Gated request should succeed.");

	fetch_mock.assert_async().await;
	token_mock.assert_calls_async(0).await;

	assert_eq!(outcome.body, "Success!");
	assert_eq!(stored(&store), (Some("AT1".into()), Some("RT1".into())));
}

#[tokio::test]
async fn request_refreshes_once_after_401() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);

	seed_tokens(&store, "AT1", "RT1");

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_URI).json_body(json!({
				"client_id": CLIENT_ID,
				"client_secret": CLIENT_SECRET,
				"grant_type": "refresh_token",
				"refresh_token": "RT1",
			}));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"AT2","refresh_token":"RT2"}"#);
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch").header("authorization", "Bearer AT1");
			then.status(401).body("Unauthorized");
		})
		.await;
	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch").header("authorization", "Bearer AT2");
			then.status(200).body("Success!");
		})
		.await;
	let outcome =
		gate.request(Request::get("/fetch")).await.expect("Retried request should succeed.");

	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	fresh_mock.assert_async().await;

	assert_eq!(outcome.body, "Success!");
	assert_eq!(outcome.request_header("Authorization"), Some("Bearer AT2"));
	assert_eq!(stored(&store), (Some("AT2".into()), Some("RT2".into())));
	assert_eq!(gate.metrics.retries(), 1);
}

#[tokio::test]
async fn second_401_rejects_without_another_refresh() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);

	seed_tokens(&store, "AT1", "RT1");

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_URI);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"AT2","refresh_token":"RT2"}"#);
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch");
			then.status(401).body("Unauthorized");
		})
		.await;
	let err = gate
		.request(Request::get("/fetch"))
		.await
		.expect_err("A 401 on the retry must reject the call.");

	assert_eq!(err.status(), Some(401));

	refresh_mock.assert_calls_async(1).await;
	fetch_mock.assert_calls_async(2).await;

	assert_eq!(stored(&store), (Some("AT2".into()), Some("RT2".into())));
	assert_eq!(gate.metrics.refresh.attempts(), 1);
}

#[tokio::test]
async fn non_401_failures_skip_refresh() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);

	seed_tokens(&store, "AT1", "RT1");

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_URI);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"AT2","refresh_token":"RT2"}"#);
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch");
			then.status(409).body("Conflict");
		})
		.await;
	let err = gate
		.request(Request::get("/fetch"))
		.await
		.expect_err("A 409 must reject the call.");

	assert_eq!(err.status(), Some(409));
	assert_eq!(err.outcome().map(|outcome| outcome.body.as_str()), Some("Conflict"));

	fetch_mock.assert_async().await;
	token_mock.assert_calls_async(0).await;

	assert_eq!(stored(&store), (Some("AT1".into()), Some("RT1".into())));
}

#[tokio::test]
async fn authentication_failure_short_circuits() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_URI);
			then.status(400).body("Bad Request");
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch");
			then.status(200).body("Success!");
		})
		.await;
	let err = gate
		.request(Request::get("/fetch"))
		.await
		.expect_err("A failed password grant must reject the call.");

	assert_eq!(err.status(), Some(400));

	token_mock.assert_async().await;
	fetch_mock.assert_calls_async(0).await;

	assert_eq!(stored(&store), (None, None));
	assert_eq!(gate.metrics.authenticate.failures(), 1);
}

#[tokio::test]
async fn refresh_failure_replaces_the_401() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);

	seed_tokens(&store, "AT1", "RT1");

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_URI);
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_grant","error_description":"Refresh token expired."}"#);
		})
		.await;
	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch");
			then.status(401).body("Unauthorized");
		})
		.await;
	let err = gate
		.request(Request::get("/fetch"))
		.await
		.expect_err("A failed refresh must reject the call.");
	let outcome = err.outcome().expect("Refresh failure should carry its outcome.");

	assert_eq!(outcome.status, 400);
	assert_eq!(
		outcome.json.as_ref().and_then(|body| body.get("error")),
		Some(&json!("invalid_grant"))
	);

	refresh_mock.assert_async().await;
	fetch_mock.assert_calls_async(1).await;

	assert_eq!(stored(&store), (Some("AT1".into()), Some("RT1".into())));
	assert_eq!(gate.metrics.retries(), 0);
}

#[tokio::test]
async fn request_forwards_method_headers_and_json_body() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);

	seed_tokens(&store, "AT1", "RT1");

	let post_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/post")
				.header("authorization", "Bearer AT1")
				.header("x-trace", "trace-1")
				.json_body(json!({ "foo": "bar" }));
			then.status(201)
				.header("content-type", "application/json")
				.body(r#"{"foo":"bar"}"#);
		})
		.await;
	let request = Request::post("/post")
		.header("Content-Type", "application/json")
		.header("X-Trace", "trace-1")
		.json(json!({ "foo": "bar" }));
	let outcome = gate.request(request.clone()).await.expect("POST request should succeed.");

	post_mock.assert_async().await;

	assert_eq!(outcome.status, 201);
	assert_eq!(outcome.json, Some(json!({ "foo": "bar" })));
	assert_eq!(outcome.request_header("X-Trace"), Some("trace-1"));
	assert!(!request.headers.contains_key("Authorization"));
}

#[tokio::test]
async fn fetch_classifies_statuses_without_tokens() {
	let server = MockServer::start_async().await;
	let (gate, _store) = build_gate(&server);
	let get_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/get");
			then.status(200).body("FooBarBaz!");
		})
		.await;
	let error_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/error");
			then.status(500).body("Internal Server Error");
		})
		.await;
	let outcome = gate.fetch(&Request::get("/get")).await.expect("Plain fetch should succeed.");

	assert_eq!(outcome.body, "FooBarBaz!");
	assert!(outcome.json.is_none());
	assert!(outcome.request_header("Authorization").is_none());

	let err = gate.fetch(&Request::get("/error")).await.expect_err("HTTP 500 must reject.");

	assert_eq!(err.status(), Some(500));

	get_mock.assert_async().await;
	error_mock.assert_async().await;
}

#[tokio::test]
async fn execute_query_attaches_the_stored_token() {
	let server = MockServer::start_async().await;
	let (gate, store) = build_gate(&server);

	seed_tokens(&store, "AT1", "RT1");

	let fetch_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fetch").header("authorization", "Bearer AT1");
			then.status(200).body("plop");
		})
		.await;
	let outcome =
		gate.execute_query(&Request::get("/fetch")).await.expect("Query should succeed.");

	fetch_mock.assert_async().await;

	assert_eq!(outcome.request_header("Authorization"), Some("Bearer AT1"));
	assert_eq!(outcome.body, "plop");
}
