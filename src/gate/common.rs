//! Shared helpers for grant exchanges (wire body, request resolution, outcome bookkeeping).

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::TransportError,
	gate::{ExchangeMetrics, TokenGate},
	http::{HttpRequest, HttpTransport, Outcome, Request},
	obs::{self, FlowKind, FlowOutcome},
	token::{Secret, TokenResponse},
};

/// OAuth 2.0 grant types the gate exchanges at the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Resource owner password credentials grant.
	Password,
	/// Refresh token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the `grant_type` value sent on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::Password => "password",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Grant exchange to perform, with the values it reads from outside the configuration.
#[derive(Clone, Debug)]
pub(crate) enum Grant {
	Password,
	RefreshToken(Option<Secret>),
}
impl Grant {
	fn grant_type(&self) -> GrantType {
		match self {
			Grant::Password => GrantType::Password,
			Grant::RefreshToken(_) => GrantType::RefreshToken,
		}
	}
}

/// JSON body posted to the token endpoint. Absent values serialize as `null`.
#[derive(Debug, Serialize)]
struct GrantBody<'a> {
	client_id: Option<&'a str>,
	client_secret: Option<&'a str>,
	grant_type: GrantType,
	#[serde(flatten)]
	params: GrantParams<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GrantParams<'a> {
	Password { username: Option<&'a str>, password: Option<&'a str> },
	RefreshToken { refresh_token: Option<&'a str> },
}

/// Builds the token endpoint request for `grant` from the current configuration.
pub(crate) fn grant_request(config: &ClientConfig, grant: &Grant) -> Result<HttpRequest> {
	let params = match grant {
		Grant::Password => GrantParams::Password {
			username: config.username.as_deref(),
			password: config.password.as_ref().map(Secret::expose),
		},
		Grant::RefreshToken(token) =>
			GrantParams::RefreshToken { refresh_token: token.as_ref().map(Secret::expose) },
	};
	let body = GrantBody {
		client_id: config.client_id.as_deref(),
		client_secret: config.client_secret.as_ref().map(Secret::expose),
		grant_type: grant.grant_type(),
		params,
	};
	let body = serde_json::to_value(body).map_err(TransportError::from)?;
	let headers = BTreeMap::from([
		("Accept".to_owned(), "application/json".to_owned()),
		("Content-Type".to_owned(), "application/json".to_owned()),
	]);

	Ok(HttpRequest {
		url: config.resolve_url(&config.token_uri)?,
		method: "POST".into(),
		headers,
		body: Some(body),
		timeout: config.timeout,
	})
}

/// Resolves a caller descriptor against the current configuration.
pub(crate) fn http_request(config: &ClientConfig, request: &Request) -> Result<HttpRequest> {
	Ok(HttpRequest {
		url: config.resolve_url(&request.url)?,
		method: request.method.clone(),
		headers: request.headers.clone(),
		body: request.body.clone(),
		timeout: config.timeout,
	})
}

/// Decodes a 200 token endpoint body.
pub(crate) fn decode_token_response(outcome: &Outcome) -> Result<TokenResponse> {
	let mut deserializer = serde_json::Deserializer::from_str(&outcome.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::TokenResponse { source, outcome: Box::new(outcome.clone()) })
}

/// Updates counters and the flow metric for a finished exchange.
pub(crate) fn record_exchange<V>(kind: FlowKind, counters: &ExchangeMetrics, result: &Result<V>) {
	match result {
		Ok(_) => {
			counters.record_success();
			obs::record_flow_outcome(kind, FlowOutcome::Success);
		},
		Err(_) => {
			counters.record_failure();
			obs::record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}
}

impl<T> TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	/// Posts `grant` to the token endpoint and stores the returned pair on HTTP 200.
	///
	/// Any other status rejects with the exchange outcome and leaves the store untouched.
	pub(crate) async fn exchange_grant(&self, grant: Grant) -> Result<Outcome> {
		let request = {
			let config = self.config.read();

			grant_request(&config, &grant)?
		};
		let outcome = self.transport.execute(request).await?;

		if outcome.status != 200 {
			return Err(outcome.into());
		}

		let response = decode_token_response(&outcome)?;

		self.store.store_pair(response.into())?;

		Ok(outcome)
	}
}
