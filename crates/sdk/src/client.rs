// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt, future::Future, sync::Arc};

use reqwest::{Client as ReqwestClient, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{
	config::{ApiFlavor, ClientConfig, ConfigError},
	envelope::{EnvelopeCodec, EnvelopeError},
	error::CryptoError,
	signing::{SigningError, TransactionSigner},
	types::{Web3TransactionRequest, WithdrawRequest},
};

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),
	#[error("Crypto error: {0}")]
	Crypto(#[from] CryptoError),
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),
	#[error("Envelope error: {0}")]
	Envelope(#[from] EnvelopeError),
	#[error("Network error: {0}")]
	Network(String),
	#[error("Server error: {0}")]
	Server(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("API Error [{code}]: {msg}")]
	Api { code: String, msg: String },
	#[error("Invalid request: {0}")]
	InvalidRequest(String),
	#[error("Runtime error: {0}")]
	Runtime(String),
}

/// HTTP method of an API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
	Get,
	Post,
}

impl fmt::Display for HttpMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			HttpMethod::Get => write!(f, "GET"),
			HttpMethod::Post => write!(f, "POST"),
		}
	}
}

/// Client for the custody platform API
///
/// Every call seals the request fields into an `{app_id, data}` envelope and
/// opens the response `data` field. POST sends the envelope as a form body,
/// GET as a query string. No other parameters go on the wire.
///
/// The client is cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Client {
	config: Arc<ClientConfig>,
	codec: EnvelopeCodec,
	signer: Option<TransactionSigner>,
	http: ReqwestClient,
}

impl Client {
	/// Create a client from a validated configuration
	pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
		config.validate()?;

		let http = ReqwestClient::builder()
			.timeout(config.timeout())
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		let codec = EnvelopeCodec::new(config.app_id(), config.envelope_cipher()?)
			.with_charset(config.charset())
			.strict(config.strict_decrypt())
			.log_payloads(config.debug());

		let signer = if config.sign_private_key().trim().is_empty() {
			None
		} else {
			Some(TransactionSigner::from_pem(config.sign_private_key())?)
		};

		Ok(Self {
			config: Arc::new(config),
			codec,
			signer,
			http,
		})
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	pub fn codec(&self) -> &EnvelopeCodec {
		&self.codec
	}

	/// Transaction signer, or a configuration error when no signing key is set
	pub(crate) fn signer(&self) -> Result<&TransactionSigner, ClientError> {
		self.signer
			.as_ref()
			.ok_or(ClientError::Config(ConfigError::Missing("sign_private_key")))
	}

	/// POST `fields` to `path`
	pub async fn post(&self, path: &str, fields: &Map<String, Value>) -> Result<Value, ClientError> {
		self.execute(HttpMethod::Post, path, fields).await
	}

	/// GET `path` with `fields`
	pub async fn get(&self, path: &str, fields: &Map<String, Value>) -> Result<Value, ClientError> {
		self.execute(HttpMethod::Get, path, fields).await
	}

	/// Seal, send, and open one API call
	pub async fn execute(
		&self,
		method: HttpMethod,
		path: &str,
		fields: &Map<String, Value>,
	) -> Result<Value, ClientError> {
		let envelope = self.codec.seal_request(fields)?;
		let url = self.config.url(path);
		debug!(target: "client", %method, %url, "Sending request");

		let request = match method {
			HttpMethod::Post => self.http.post(&url).form(&envelope),
			HttpMethod::Get => self.http.get(&url).query(&envelope),
		};

		let response = request
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		let status = response.status();
		if status != StatusCode::OK {
			let error_text = response
				.text()
				.await
				.unwrap_or_else(|_| format!("HTTP {}", status));
			return Err(ClientError::Server(format!("{}: {}", status, error_text)));
		}

		let body: Value = response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		Ok(self.codec.open_response_value(body)?)
	}

	/// Apply the configured API family's response rules
	///
	/// MPC responses are returned as decoded; custody responses must carry a
	/// success code.
	pub fn validate_response(&self, response: Value) -> Result<Value, ClientError> {
		match self.config.flavor() {
			ApiFlavor::Mpc => Ok(response),
			ApiFlavor::Custody => validate_response(response),
		}
	}
}

/// Check a custody API response for a success code
///
/// `code` must be `0` or `"0"`. Returns `data` when it is truthy, otherwise
/// the whole response. A missing `data` as well as `null`, `false`, `0`, `""`
/// count as absent; empty arrays and objects are returned as data.
pub fn validate_response(mut response: Value) -> Result<Value, ClientError> {
	let success = match response.get("code") {
		Some(Value::Number(n)) => n.as_i64() == Some(0),
		Some(Value::String(s)) => s == "0",
		_ => false,
	};

	if !success {
		let code = match response.get("code") {
			Some(Value::String(s)) => s.clone(),
			Some(Value::Null) | None => "undefined".to_string(),
			Some(other) => other.to_string(),
		};
		let msg = response
			.get("msg")
			.and_then(Value::as_str)
			.filter(|m| !m.is_empty())
			.unwrap_or("Unknown error")
			.to_string();
		return Err(ClientError::Api { code, msg });
	}

	if response.get("data").is_some_and(is_truthy) {
		return Ok(response["data"].take());
	}
	Ok(response)
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

/// Synchronous client wrapper
///
/// Runs the async [`Client`] on an owned tokio runtime. Must not be used
/// from inside another async runtime.
pub struct SyncClient {
	client: Client,
	runtime: tokio::runtime::Runtime,
}

impl SyncClient {
	pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
		let runtime = tokio::runtime::Runtime::new()
			.map_err(|e| ClientError::Runtime(format!("Failed to create tokio runtime: {}", e)))?;
		Ok(Self {
			client: Client::new(config)?,
			runtime,
		})
	}

	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Drive any async client call to completion
	pub fn block_on<F: Future>(&self, future: F) -> F::Output {
		self.runtime.block_on(future)
	}

	pub fn post(&self, path: &str, fields: &Map<String, Value>) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.post(path, fields))
	}

	pub fn get(&self, path: &str, fields: &Map<String, Value>) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.get(path, fields))
	}

	pub fn withdraw(&self, request: &WithdrawRequest) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.withdraw(request))
	}

	pub fn create_web3_transaction(
		&self,
		request: &Web3TransactionRequest,
	) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.create_web3_transaction(request))
	}
}
