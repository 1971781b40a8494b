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

//! Transaction signatures
//!
//! Withdrawals and Web3 transactions carry a `sign` field computed over the
//! canonical parameter string with a dedicated signing key (independent of
//! the envelope key):
//!
//! 1. `hex(md5(canonical))` as lowercase text
//! 2. RSA PKCS#1 v1.5 with SHA-256 over the UTF-8 bytes of that hex text
//! 3. standard base64 of the raw signature
//!
//! Empty input or an unset key produces an empty signature rather than an
//! error; callers decide whether an unsigned request is acceptable.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use md5::{Digest, Md5};
use rsa::{
	pkcs1v15::SigningKey,
	signature::{SignatureEncoding, Signer},
};
use serde_json::{Map, Value};
use sha2::Sha256;

use crate::{
	canonical::canonicalize,
	error::CryptoError,
	keys::load_private_key,
	types::{Web3TransactionRequest, WithdrawRequest},
};

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Key error: {0}")]
	Key(#[from] CryptoError),
	#[error("Signing error: {0}")]
	Signing(String),
}

/// Lowercase hex MD5 digest of the UTF-8 bytes of `data`
pub fn md5_hex(data: &str) -> String {
	hex::encode(Md5::digest(data.as_bytes()))
}

/// RSA-SHA256 signer holding a parsed signing key
///
/// The key is parsed once; signing is read-only and may be shared across
/// threads.
#[derive(Clone)]
pub struct TransactionSigner {
	key: SigningKey<Sha256>,
}

impl TransactionSigner {
	/// Parse a PKCS#1 or PKCS#8 private key (PEM or bare base64)
	pub fn from_pem(signing_key: &str) -> Result<Self, SigningError> {
		let key = load_private_key(signing_key)?;
		Ok(Self {
			key: SigningKey::<Sha256>::new(key),
		})
	}

	/// Sign a canonical string; empty input yields an empty signature
	pub fn sign(&self, canonical: &str) -> Result<String, SigningError> {
		if canonical.is_empty() {
			return Ok(String::new());
		}

		let digest = md5_hex(canonical);
		let signature = self
			.key
			.try_sign(digest.as_bytes())
			.map_err(|e| SigningError::Signing(e.to_string()))?;

		Ok(STANDARD.encode(signature.to_bytes()))
	}

	/// Canonicalize then sign a field map
	pub fn sign_fields(&self, fields: &Map<String, Value>) -> Result<String, SigningError> {
		self.sign(&canonicalize(fields))
	}

	/// Signature over the withdrawal field set
	pub fn sign_withdraw(&self, request: &WithdrawRequest) -> Result<String, SigningError> {
		self.sign_fields(&withdraw_sign_fields(request))
	}

	/// Signature over the Web3 transaction field set
	pub fn sign_web3(&self, request: &Web3TransactionRequest) -> Result<String, SigningError> {
		self.sign_fields(&web3_sign_fields(request))
	}
}

/// Sign a canonical string with raw key material
///
/// Returns an empty string when either input is empty.
pub fn sign(canonical: &str, signing_key: &str) -> Result<String, SigningError> {
	if canonical.is_empty() || signing_key.trim().is_empty() {
		return Ok(String::new());
	}
	TransactionSigner::from_pem(signing_key)?.sign(canonical)
}

/// Withdrawal signature from raw key material (empty key yields an empty signature)
pub fn generate_withdraw_sign(
	request: &WithdrawRequest,
	signing_key: &str,
) -> Result<String, SigningError> {
	sign(&canonicalize(&withdraw_sign_fields(request)), signing_key)
}

/// Web3 transaction signature from raw key material (empty key yields an empty signature)
pub fn generate_web3_sign(
	request: &Web3TransactionRequest,
	signing_key: &str,
) -> Result<String, SigningError> {
	sign(&canonicalize(&web3_sign_fields(request)), signing_key)
}

/// Fields covered by a withdrawal signature
pub fn withdraw_sign_fields(request: &WithdrawRequest) -> Map<String, Value> {
	let mut fields = Map::new();
	fields.insert("request_id".into(), request.request_id.clone().into());
	fields.insert("sub_wallet_id".into(), request.sub_wallet_id.to_string().into());
	fields.insert("symbol".into(), request.symbol.clone().into());
	fields.insert("address_to".into(), request.address_to.clone().into());
	fields.insert("amount".into(), request.amount.clone().into());
	fields.insert("memo".into(), optional(&request.memo));
	fields.insert("outputs".into(), optional(&request.outputs));
	fields
}

/// Fields covered by a Web3 transaction signature
pub fn web3_sign_fields(request: &Web3TransactionRequest) -> Map<String, Value> {
	let mut fields = Map::new();
	fields.insert("request_id".into(), request.request_id.clone().into());
	fields.insert("sub_wallet_id".into(), request.sub_wallet_id.to_string().into());
	fields.insert("main_chain_symbol".into(), request.main_chain_symbol.clone().into());
	fields.insert(
		"interactive_contract".into(),
		request.interactive_contract.clone().into(),
	);
	fields.insert("amount".into(), request.amount.clone().into());
	fields.insert("input_data".into(), request.input_data.clone().into());
	fields
}

fn optional(value: &Option<String>) -> Value {
	value.clone().map(Value::String).unwrap_or(Value::Null)
}
