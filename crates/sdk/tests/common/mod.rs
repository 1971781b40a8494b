//! Shared fixtures for SDK integration tests

#![allow(dead_code)]

use std::{collections::HashMap, sync::LazyLock};

use custody_sdk::{
	ApiFlavor, ClientConfig,
	cipher::{open_public, seal_private},
};
use rsa::{
	RsaPrivateKey, RsaPublicKey,
	pkcs1::EncodeRsaPrivateKey,
	pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
};
use serde_json::{Value, json};

pub const APP_ID: &str = "test-app";

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

/// Caller's envelope key pair
pub static CLIENT: LazyLock<TestKey> = LazyLock::new(generate);

/// Platform's key pair
pub static SERVER: LazyLock<TestKey> = LazyLock::new(generate);

/// Caller's transaction signing key pair
pub static SIGNER: LazyLock<TestKey> = LazyLock::new(generate);

/// MPC client config pointing at a mock server
pub fn mpc_config(domain: &str) -> ClientConfig {
	ClientConfig::builder()
		.domain(format!("{}/", domain))
		.app_id(APP_ID)
		.rsa_private_key(CLIENT.pkcs8_pem.as_str())
		.waas_public_key(SERVER.public_pem.as_str())
		.build()
		.unwrap()
}

/// Custody (WaaS) client config pointing at a mock server, version `v1`
pub fn custody_config(domain: &str) -> ClientConfig {
	ClientConfig::builder()
		.domain(format!("{}/", domain))
		.app_id(APP_ID)
		.rsa_private_key(CLIENT.pkcs1_pem.as_str())
		.waas_public_key(SERVER.public_pem.as_str())
		.flavor(ApiFlavor::Custody)
		.build()
		.unwrap()
}

/// Decode `a=b&c=d` pairs
pub fn form_pairs(encoded: &str) -> HashMap<String, String> {
	let url = reqwest::Url::parse(&format!("http://localhost/?{}", encoded)).unwrap();
	url.query_pairs().into_owned().collect()
}

/// Envelope fields of a captured request (query for GET, form body for POST)
pub fn envelope_of(request: &wiremock::Request) -> HashMap<String, String> {
	if request.method.as_str() == "GET" {
		request.url.query_pairs().into_owned().collect()
	} else {
		form_pairs(&String::from_utf8(request.body.clone()).unwrap())
	}
}

/// Decrypted JSON payload of a captured request
pub fn open_request(request: &wiremock::Request) -> Value {
	let envelope = envelope_of(request);
	let opened = open_public(&envelope["data"], &CLIENT.public).unwrap();
	serde_json::from_slice(&opened).unwrap()
}

/// Response body whose `data` is `payload` sealed by the platform
pub fn sealed_response(payload: &Value) -> Value {
	let sealed = seal_private(payload.to_string().as_bytes(), &SERVER.private).unwrap();
	json!({ "data": sealed })
}
