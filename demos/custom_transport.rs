//! Demonstrates plugging a custom [`HttpTransport`] into the gate.
//!
//! 1. Implement [`HttpTransport`] so every HTTP response, including 4xx/5xx, resolves to an
//!    [`Outcome`] that echoes the sent headers.
//! 2. Reserve [`TransportError`] for exchanges that produced no response.
//! 3. Pass the transport to [`TokenGate::with_transport`] and issue gated requests as usual.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
// self
use oauth2_gate::{
	config::ClientConfig,
	error::TransportError,
	gate::TokenGate,
	http::{HttpRequest, HttpTransport, Outcome, Request, TransportFuture},
	store::{CredentialStore, MemoryStore},
	url::Url,
};

/// In-process token server: issues `AT<n>` tokens and rejects every access token but the newest.
#[derive(Default)]
struct MockTransport {
	issued: AtomicUsize,
}
impl MockTransport {
	fn respond(&self, request: &HttpRequest) -> Result<Outcome, TransportError> {
		if request.url.path() == "/oauth/v2/token" {
			let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

			return Ok(Outcome::from_response(
				200,
				Some("application/json"),
				format!(r#"{{"access_token":"AT{n}","refresh_token":"RT{n}"}}"#),
			));
		}

		let newest = format!("Bearer AT{}", self.issued.load(Ordering::SeqCst));

		match request.headers.get("Authorization") {
			Some(value) if *value == newest => Ok(Outcome::new(200, "Success!")),
			Some(_) => Ok(Outcome::new(401, "Unauthorized")),
			None => Err(TransportError::InvalidRequest { message: "missing bearer token".into() }),
		}
	}
}
impl HttpTransport for MockTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let result =
			self.respond(&request).map(|outcome| outcome.with_request_headers(request.headers));

		Box::pin(async move { result })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::default()
		.with_base_url(Url::parse("https://api.example.com")?)
		.with_token_uri("/oauth/v2/token")
		.with_client("demo-client", "demo-secret")
		.with_user("john@mail.com", "123456");
	let gate = TokenGate::with_transport(store, config, Arc::new(MockTransport::default()));
	let outcome = gate.request(Request::get("/fetch")).await?;

	println!("Cold start answered {} with {:?}.", outcome.status, outcome.body);

	// Simulate server-side expiry: a second token gets issued behind the gate's back.
	gate.transport.issued.fetch_add(1, Ordering::SeqCst);

	let outcome = gate.request(Request::get("/fetch")).await?;

	println!(
		"After expiry the gate refreshed once and retried with {:?}.",
		outcome.request_header("Authorization")
	);
	println!("Refresh exchanges: {}.", gate.metrics.refresh.attempts());

	Ok(())
}
