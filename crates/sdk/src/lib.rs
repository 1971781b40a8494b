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

//! Custody SDK - client core for a custody platform's open API
//!
//! This crate seals requests into `{app_id, data}` envelopes with the
//! caller's RSA private key, opens responses with the platform's public key,
//! canonicalizes and signs transaction parameters, and decodes webhook
//! notifications.
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No environment or configuration loading
//! - No global logging subscriber; events go through `tracing`

pub mod canonical;
pub mod cipher;
pub mod client;
pub mod config;
pub mod custody;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod mpc;
pub mod notify;
pub mod signing;
pub mod sweep;
pub mod types;
pub mod wallet;

pub use canonical::canonicalize;
pub use cipher::{RsaCipher, SigningCipher};
pub use client::{Client, ClientError, HttpMethod, SyncClient, validate_response};
pub use config::{ApiFlavor, ClientConfig, ClientConfigBuilder, ConfigError};
pub use custody::CustodyApi;
pub use envelope::{EnvelopeCodec, EnvelopeError};
pub use error::CryptoError;
pub use keys::{KeyRole, normalize_key};
pub use notify::NotifyCodec;
pub use signing::{SigningError, TransactionSigner, md5_hex};
pub use types::*;

#[cfg(test)]
pub(crate) mod test_keys {
	use std::sync::LazyLock;

	use rsa::{
		RsaPrivateKey, RsaPublicKey,
		pkcs1::EncodeRsaPrivateKey,
		pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
	};

	pub struct TestKey {
		pub private: RsaPrivateKey,
		pub public: RsaPublicKey,
		pub pkcs1_pem: String,
		pub pkcs8_pem: String,
		pub public_pem: String,
	}

	fn generate() -> TestKey {
		let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).unwrap();
		let public = RsaPublicKey::from(&private);
		TestKey {
			pkcs1_pem: private.to_pkcs1_pem(LineEnding::LF).unwrap().as_str().to_string(),
			pkcs8_pem: private.to_pkcs8_pem(LineEnding::LF).unwrap().as_str().to_string(),
			public_pem: public.to_public_key_pem(LineEnding::LF).unwrap(),
			private,
			public,
		}
	}

	/// The caller's key pair
	pub static CLIENT: LazyLock<TestKey> = LazyLock::new(generate);

	/// The platform's key pair
	pub static SERVER: LazyLock<TestKey> = LazyLock::new(generate);
}
