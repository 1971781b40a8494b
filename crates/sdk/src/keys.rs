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

//! Key normalization and loading
//!
//! Key material arrives in many shapes: bare base64 pasted from a console,
//! PEM with arbitrary whitespace, PKCS#1 or PKCS#8 private keys. Everything
//! is normalized into strict PEM (64-character lines, canonical headers)
//! before it reaches the RSA primitives.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use pem::{EncodeConfig, LineEnding, Pem};
use rsa::{
	RsaPrivateKey, RsaPublicKey,
	pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
	pkcs8::{DecodePrivateKey, DecodePublicKey},
};

use crate::error::CryptoError;

/// PEM label for PKCS#1 RSA private keys
pub const PKCS1_PRIVATE_LABEL: &str = "RSA PRIVATE KEY";

/// PEM label for PKCS#8 private keys
pub const PKCS8_PRIVATE_LABEL: &str = "PRIVATE KEY";

/// PEM label for SubjectPublicKeyInfo public keys
pub const PUBLIC_LABEL: &str = "PUBLIC KEY";

/// DER encoding of the rsaEncryption AlgorithmIdentifier OID (1.2.840.113549.1.1.1).
/// Only a PKCS#8 wrapper carries it; a bare PKCS#1 key does not.
const RSA_ENCRYPTION_OID: [u8; 11] = [
	0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01,
];

const PEM_LINE_WIDTH: usize = 64;

/// Role of a key inside a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
	Private,
	Public,
}

/// Private key container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKeyFormat {
	Pkcs1,
	Pkcs8,
}

impl PrivateKeyFormat {
	fn label(self) -> &'static str {
		match self {
			PrivateKeyFormat::Pkcs1 => PKCS1_PRIVATE_LABEL,
			PrivateKeyFormat::Pkcs8 => PKCS8_PRIVATE_LABEL,
		}
	}
}

/// Normalize raw key material into a strict PEM block
///
/// Whitespace and any `-----BEGIN ...-----` / `-----END ...-----` markers are
/// stripped, the base64 payload is re-wrapped at 64 characters per line and
/// canonical headers are applied:
///
/// - `Public` keys always get `PUBLIC KEY` headers.
/// - `Private` keys get PKCS#1 headers unless `preserve_format` is set, in
///   which case the original header wins, and a headerless key is classified
///   by looking for the rsaEncryption OID in its DER bytes.
///
/// Blank input is returned unchanged and means "no key configured".
pub fn normalize_key(
	raw: &str,
	role: KeyRole,
	preserve_format: bool,
) -> Result<String, CryptoError> {
	match decode_key(raw, role, preserve_format)? {
		Some(block) => Ok(encode_pem(&block)),
		None => Ok(raw.to_string()),
	}
}

/// Strip armor and whitespace, decode the payload and pick the canonical label
///
/// Returns `None` for blank input.
fn decode_key(raw: &str, role: KeyRole, preserve_format: bool) -> Result<Option<Pem>, CryptoError> {
	if raw.trim().is_empty() {
		return Ok(None);
	}

	let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
	let body = strip_armor(&compact);
	if body.is_empty() {
		return Err(CryptoError::InvalidKeyFormat(
			"no key material between PEM markers".to_string(),
		));
	}

	let der = STANDARD
		.decode(body.as_bytes())
		.map_err(|e| CryptoError::InvalidKeyFormat(format!("Invalid base64: {}", e)))?;

	let label = match role {
		KeyRole::Public => PUBLIC_LABEL,
		KeyRole::Private if preserve_format => detect_private_format(raw, &der).label(),
		KeyRole::Private => PKCS1_PRIVATE_LABEL,
	};

	Ok(Some(Pem::new(label, der)))
}

/// Classify a private key from its original header, falling back to DER inspection
fn detect_private_format(raw: &str, der: &[u8]) -> PrivateKeyFormat {
	if raw.contains("BEGIN RSA PRIVATE KEY") {
		return PrivateKeyFormat::Pkcs1;
	}
	if raw.contains("BEGIN PRIVATE KEY") {
		return PrivateKeyFormat::Pkcs8;
	}

	let has_oid = der
		.windows(RSA_ENCRYPTION_OID.len())
		.any(|window| window == RSA_ENCRYPTION_OID);
	if has_oid {
		PrivateKeyFormat::Pkcs8
	} else {
		PrivateKeyFormat::Pkcs1
	}
}

/// Remove `-----BEGIN...-----` and `-----END...-----` markers from a
/// whitespace-free key string. Unrecognized dashes are left in place so
/// that base64 validation rejects them.
fn strip_armor(compact: &str) -> String {
	let mut body = String::with_capacity(compact.len());
	let mut rest = compact;

	while let Some(start) = rest.find("-----") {
		let after = &rest[start + 5..];
		let is_marker = after.starts_with("BEGIN") || after.starts_with("END");
		match after.find("-----") {
			Some(end) if is_marker => {
				body.push_str(&rest[..start]);
				rest = &after[end + 5..];
			}
			_ => break,
		}
	}

	body.push_str(rest);
	body
}

/// LF line endings, 64-column body, no trailing newline
fn encode_pem(block: &Pem) -> String {
	let config = EncodeConfig::new()
		.set_line_ending(LineEnding::LF)
		.set_line_wrap(PEM_LINE_WIDTH);
	pem::encode_config(block, config).trim_end().to_string()
}

/// Load an RSA private key from any accepted key shape
///
/// The PEM label is not trusted: envelope keys are relabelled as PKCS#1
/// even when their payload is PKCS#8, so both DER structures are tried.
pub fn load_private_key(raw: &str) -> Result<RsaPrivateKey, CryptoError> {
	let der = decode_pem_body(raw, KeyRole::Private)?;

	RsaPrivateKey::from_pkcs1_der(&der)
		.or_else(|_| RsaPrivateKey::from_pkcs8_der(&der))
		.map_err(|e| CryptoError::InvalidKeyFormat(format!("Unreadable RSA private key: {}", e)))
}

/// Load an RSA public key (SubjectPublicKeyInfo, or bare PKCS#1)
pub fn load_public_key(raw: &str) -> Result<RsaPublicKey, CryptoError> {
	let der = decode_pem_body(raw, KeyRole::Public)?;

	RsaPublicKey::from_public_key_der(&der)
		.or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
		.map_err(|e| CryptoError::InvalidKeyFormat(format!("Unreadable RSA public key: {}", e)))
}

fn decode_pem_body(raw: &str, role: KeyRole) -> Result<Vec<u8>, CryptoError> {
	decode_key(raw, role, true)?
		.map(Pem::into_contents)
		.ok_or_else(|| CryptoError::InvalidKeyFormat("empty key".to_string()))
}
