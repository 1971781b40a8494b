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

//! Request/response envelope codec
//!
//! Requests: the caller's fields plus `time` (epoch millis) and `charset`
//! are serialized to JSON, sealed with the caller's private key and wrapped
//! as `{app_id, data}`.
//!
//! Responses: when the body carries a string `data` field it is opened
//! with the remote service's public key and the decrypted JSON replaces the
//! whole envelope. If opening fails the raw envelope is returned unchanged,
//! because the service sends plaintext error envelopes with a string
//! `data`. Strict mode turns that fallback into an error.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{cipher::SigningCipher, error::CryptoError, types::Envelope};

/// Charset injected into every sealed request
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Error types for envelope decoding
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
	#[error(transparent)]
	Crypto(#[from] CryptoError),
	#[error("Invalid JSON: {0}")]
	Json(String),
}

/// Stateless envelope codec bound to one credential set
#[derive(Clone)]
pub struct EnvelopeCodec {
	app_id: String,
	charset: String,
	cipher: Arc<dyn SigningCipher>,
	strict: bool,
	log_payloads: bool,
}

impl EnvelopeCodec {
	pub fn new(app_id: impl Into<String>, cipher: Arc<dyn SigningCipher>) -> Self {
		Self {
			app_id: app_id.into(),
			charset: DEFAULT_CHARSET.to_string(),
			cipher,
			strict: false,
			log_payloads: false,
		}
	}

	/// Override the injected `charset` value
	pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
		self.charset = charset.into();
		self
	}

	/// Fail instead of falling back when a response `data` field cannot be opened
	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	/// Log plaintext request args and decrypted responses at debug level
	pub fn log_payloads(mut self, enabled: bool) -> Self {
		self.log_payloads = enabled;
		self
	}

	pub fn logs_payloads(&self) -> bool {
		self.log_payloads
	}

	pub fn app_id(&self) -> &str {
		&self.app_id
	}

	pub fn cipher(&self) -> &Arc<dyn SigningCipher> {
		&self.cipher
	}

	/// Seal request fields, stamping the current time
	pub fn seal_request(&self, fields: &Map<String, Value>) -> Result<Envelope, CryptoError> {
		self.seal_request_at(fields, chrono::Utc::now().timestamp_millis())
	}

	/// Seal request fields with an explicit `time` (epoch milliseconds)
	pub fn seal_request_at(
		&self,
		fields: &Map<String, Value>,
		time_millis: i64,
	) -> Result<Envelope, CryptoError> {
		let payload = self.request_payload(fields, time_millis);
		if self.log_payloads {
			debug!(target: "envelope", app_id = %self.app_id, "Request args: {}", payload);
		}

		let data = self.cipher.seal(payload.as_bytes())?;
		debug!(
			target: "envelope",
			sealed_len = data.len(),
			"Sealed data: {}...",
			truncate(&data, 100)
		);

		Ok(Envelope {
			app_id: self.app_id.clone(),
			data,
		})
	}

	fn request_payload(&self, fields: &Map<String, Value>, time_millis: i64) -> String {
		let mut args = fields.clone();
		args.insert("time".to_string(), Value::from(time_millis));
		args.insert("charset".to_string(), Value::from(self.charset.as_str()));
		Value::Object(args).to_string()
	}

	/// Open a raw response body
	pub fn open_response(&self, raw: &str) -> Result<Value, EnvelopeError> {
		let response: Value =
			serde_json::from_str(raw).map_err(|e| EnvelopeError::Json(e.to_string()))?;
		self.open_response_value(response)
	}

	/// Open an already-parsed response
	///
	/// Returns the decrypted payload when `data` is a non-empty string that
	/// opens to JSON, otherwise the response unchanged (or an error in strict
	/// mode).
	pub fn open_response_value(&self, response: Value) -> Result<Value, EnvelopeError> {
		let sealed = match response.get("data") {
			Some(Value::String(data)) if !data.is_empty() => data.clone(),
			_ => return Ok(response),
		};

		match self.open_payload(&sealed) {
			Ok(payload) => {
				if self.log_payloads {
					debug!(target: "envelope", "Decrypted response: {}", payload);
				}
				Ok(payload)
			}
			Err(e) if self.strict => Err(e),
			Err(e) => {
				warn!(
					target: "envelope",
					error = %e,
					"Response data could not be decrypted, returning envelope as-is"
				);
				Ok(response)
			}
		}
	}

	/// Open a sealed payload and parse it as JSON
	pub fn open_payload(&self, sealed: &str) -> Result<Value, EnvelopeError> {
		let plaintext = self.cipher.open(sealed)?;
		serde_json::from_slice(&plaintext).map_err(|e| EnvelopeError::Json(e.to_string()))
	}
}

fn truncate(s: &str, max: usize) -> &str {
	match s.char_indices().nth(max) {
		Some((idx, _)) => &s[..idx],
		None => s,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		cipher::{RsaCipher, seal_private},
		test_keys::{CLIENT, SERVER},
	};
	use serde_json::json;

	/// Codec as the caller sees it: own private key, service public key
	fn caller_codec() -> EnvelopeCodec {
		let cipher = RsaCipher::from_keys(Some(CLIENT.private.clone()), Some(SERVER.public.clone()));
		EnvelopeCodec::new("app-123", Arc::new(cipher))
	}

	fn server_seal(payload: &Value) -> String {
		seal_private(payload.to_string().as_bytes(), &SERVER.private).unwrap()
	}

	#[test]
	fn test_seal_request_injects_time_and_charset() {
		let mut fields = Map::new();
		fields.insert("symbol".into(), json!("ETH"));
		fields.insert("charset".into(), json!("latin1"));

		let envelope = caller_codec().seal_request_at(&fields, 1_700_000_000_000).unwrap();
		assert_eq!(envelope.app_id, "app-123");

		let opened = crate::cipher::open_public(&envelope.data, &CLIENT.public).unwrap();
		let payload: Value = serde_json::from_slice(&opened).unwrap();
		assert_eq!(
			payload,
			json!({"symbol": "ETH", "charset": "utf-8", "time": 1_700_000_000_000i64})
		);
	}

	#[test]
	fn test_seal_request_uses_current_time() {
		let before = chrono::Utc::now().timestamp_millis();
		let envelope = caller_codec().seal_request(&Map::new()).unwrap();
		let opened = crate::cipher::open_public(&envelope.data, &CLIENT.public).unwrap();
		let payload: Value = serde_json::from_slice(&opened).unwrap();
		assert!(payload["time"].as_i64().unwrap() >= before);
	}

	#[test]
	fn test_open_response_replaces_envelope_with_payload() {
		let inner = json!({"code": "0", "msg": "success", "data": {"uid": 42}});
		let raw = json!({"data": server_seal(&inner)}).to_string();

		let opened = caller_codec().open_response(&raw).unwrap();
		assert_eq!(opened, inner);
	}

	#[test]
	fn test_open_response_falls_back_on_plaintext_error() {
		let raw = json!({"code": "100004", "msg": "sign error", "data": "not ciphertext"});
		let opened = caller_codec().open_response(&raw.to_string()).unwrap();
		assert_eq!(opened, raw);
	}

	#[test]
	fn test_open_response_strict_mode_errors() {
		let raw = json!({"code": "100004", "data": "not ciphertext"});
		let codec = caller_codec().strict(true);
		assert!(codec.open_response(&raw.to_string()).is_err());
	}

	#[test]
	fn test_open_response_without_string_data_is_passthrough() {
		for raw in [
			json!({"code": "0", "msg": "ok"}),
			json!({"code": "0", "data": {"already": "plain"}}),
			json!({"code": "0", "data": ""}),
		] {
			assert_eq!(caller_codec().open_response_value(raw.clone()).unwrap(), raw);
		}
	}

	#[test]
	fn test_open_response_rejects_invalid_outer_json() {
		let err = caller_codec().open_response("<html>").unwrap_err();
		assert!(matches!(err, EnvelopeError::Json(_)));
	}

	#[test]
	fn test_response_sealed_with_wrong_key_is_not_decrypted() {
		// sealed by the caller's own key, cannot be opened with the service key
		let sealed = seal_private(b"{\"x\":1}", &CLIENT.private).unwrap();
		let raw = json!({"data": sealed});
		assert_eq!(caller_codec().open_response_value(raw.clone()).unwrap(), raw);
	}

	#[test]
	fn test_payload_logging_is_opt_in() {
		let codec = caller_codec();
		assert!(!codec.logs_payloads());

		let codec = codec.log_payloads(true);
		assert!(codec.logs_payloads());
		// logging does not change what is sealed or opened
		let inner = json!({"code": "0"});
		let raw = json!({"data": server_seal(&inner)});
		assert_eq!(codec.open_response_value(raw).unwrap(), inner);
	}

	#[test]
	fn test_truncate_respects_char_boundaries() {
		assert_eq!(truncate("héllo", 2), "hé");
		assert_eq!(truncate("abc", 10), "abc");
	}
}
