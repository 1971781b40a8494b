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

//! Webhook notification codec
//!
//! The platform pushes deposit/withdrawal notifications and withdrawal
//! verification callbacks as a single sealed string. Decoding failures are
//! logged and reported as `None`: a webhook handler answers garbage with a
//! rejection, not an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{cipher::SigningCipher, client::Client};

/// Decodes inbound notifications and seals verification replies
#[derive(Clone)]
pub struct NotifyCodec {
	cipher: Arc<dyn SigningCipher>,
}

impl NotifyCodec {
	pub fn new(cipher: Arc<dyn SigningCipher>) -> Self {
		Self { cipher }
	}

	/// Decode a deposit/withdrawal notification
	pub fn notify_request(&self, cipher: &str) -> Option<Value> {
		self.decode("notify", cipher)
	}

	/// Decode a withdrawal verification callback
	pub fn verify_request(&self, cipher: &str) -> Option<Value> {
		self.decode("verify", cipher)
	}

	/// Seal the reply to a verification callback
	pub fn verify_response(&self, response: &Value) -> Option<String> {
		if response.is_null() {
			warn!(target: "notify", "Verify response cannot be empty");
			return None;
		}

		match self.cipher.seal(response.to_string().as_bytes()) {
			Ok(sealed) => Some(sealed),
			Err(e) => {
				warn!(target: "notify", error = %e, "Failed to seal verify response");
				None
			}
		}
	}

	fn decode(&self, kind: &'static str, cipher: &str) -> Option<Value> {
		if cipher.trim().is_empty() {
			warn!(target: "notify", kind, "Cipher cannot be empty");
			return None;
		}

		let plaintext = match self.cipher.open(cipher.trim()) {
			Ok(plaintext) => plaintext,
			Err(e) => {
				warn!(target: "notify", kind, error = %e, "Failed to decrypt notification");
				return None;
			}
		};

		match serde_json::from_slice::<Value>(&plaintext) {
			Ok(Value::Null) => {
				warn!(target: "notify", kind, "Notification decoded to null");
				None
			}
			Ok(value) => {
				debug!(target: "notify", kind, "Decrypted notification: {}", value);
				Some(value)
			}
			Err(e) => {
				warn!(target: "notify", kind, error = %e, "Notification is not valid JSON");
				None
			}
		}
	}
}

impl Client {
	/// Notification codec sharing this client's envelope cipher
	pub fn notify_codec(&self) -> NotifyCodec {
		NotifyCodec::new(self.codec().cipher().clone())
	}
}
