//! Bootstraps a token pair with the password grant and calls a protected endpoint.
//!
//! Tokens persist in a JSON file, so a second run skips the password grant until the server
//! answers 401 and the gate refreshes.
//!
//! ```sh
//! OAUTH2_GATE_BASE_URL=http://localhost:8000 cargo run --example password_grant
//! ```

// std
use std::{env, sync::Arc, time::Duration};
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use oauth2_gate::{
	config::{ClientConfig, ConfigPatch},
	gate::ReqwestTokenGate,
	http::Request,
	store::{CredentialStore, FileStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let base_url =
		env::var("OAUTH2_GATE_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".into());
	let store: Arc<dyn CredentialStore> =
		Arc::new(FileStore::open(env::temp_dir().join("oauth2-gate-demo/tokens.json"))?);
	let gate = ReqwestTokenGate::new(
		store,
		ClientConfig::default()
			.with_base_url(Url::parse(&base_url)?)
			.with_timeout(Duration::from_secs(10)),
	);

	gate.configure(serde_json::from_str::<ConfigPatch>(
		r#"{"tokenUri":"/oauth/v2/token","clientId":"azerty","clientSecret":"abc123","username":"john@mail.com","password":"123456"}"#,
	)?);

	match gate.request(Request::get("/fetch")).await {
		Ok(outcome) => println!("{} {}", outcome.status, outcome.body),
		Err(err) => {
			let detail = err
				.outcome()
				.and_then(|outcome| outcome.json.as_ref())
				.and_then(|body| body.get("error_description"))
				.and_then(|value| value.as_str())
				.unwrap_or("no error description");

			return Err(eyre!("API connection failed: {err} ({detail})"));
		},
	}

	Ok(())
}
