//! Bearer-token gate for HTTP clients: bootstrap a token pair with the password grant,
//! attach it to every outgoing request, and rotate it once when the server answers 401.
//!
//! The crate is split along three seams:
//!
//! - [`store`] holds the access/refresh token pair behind the [`store::CredentialStore`]
//!   contract.
//! - [`gate`] exposes [`gate::TokenGate`], which runs the password and refresh grants and
//!   orchestrates the authenticate → execute → refresh → retry state machine.
//! - [`http`] defines the request/outcome model and the [`http::HttpTransport`] contract the
//!   gate executes against.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod obs;
pub mod store;
pub mod token;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
