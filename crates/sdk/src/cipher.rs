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

//! Segmented RSA envelope cipher
//!
//! Requests are "encrypted" with the caller's private key and responses are
//! "decrypted" with the remote service's public key, both under PKCS#1 v1.5
//! block type 1 padding (the sign-as-encrypt construction). Payloads longer
//! than one RSA block are processed segment by segment and the segment
//! outputs are concatenated.
//!
//! Segment sizes are part of the wire protocol and are not derived from
//! the key: 234 plaintext bytes per sealed block, 256 ciphertext bytes
//! (a 2048-bit modulus) per opened block.

use base64::{
	Engine as _, alphabet,
	engine::{
		DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
		general_purpose::URL_SAFE_NO_PAD,
	},
};
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey, traits::PublicKeyParts};

use crate::{
	error::CryptoError,
	keys::{load_private_key, load_public_key},
};

/// Maximum plaintext bytes sealed per RSA block
pub const MAX_ENCRYPT_BLOCK: usize = 234;

/// Ciphertext bytes opened per RSA block
pub const MAX_DECRYPT_BLOCK: usize = 256;

/// PKCS#1 v1.5 overhead: 0x00 0x01, at least eight 0xff, 0x00
const PKCS1_MIN_PADDING: usize = 11;

const LENIENT_PADDING: GeneralPurposeConfig =
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// URL-safe alphabet, padded or not
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_PADDING);

/// Standard alphabet, padded or not
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_PADDING);

/// Pluggable envelope cipher
///
/// The built-in implementation is [`RsaCipher`]. Deployments that keep the
/// private key in an HSM or KMS implement this trait instead and pass it to
/// the client configuration.
pub trait SigningCipher: Send + Sync {
	/// Seal plaintext with the caller's private key, producing URL-safe base64
	fn seal(&self, plaintext: &[u8]) -> Result<String, CryptoError>;

	/// Open URL-safe base64 ciphertext with the remote service's public key
	fn open(&self, ciphertext: &str) -> Result<Vec<u8>, CryptoError>;
}

/// RSA implementation of [`SigningCipher`]
///
/// Either key may be absent; the corresponding direction then fails with
/// [`CryptoError::KeyNotConfigured`].
#[derive(Clone)]
pub struct RsaCipher {
	private_key: Option<RsaPrivateKey>,
	public_key: Option<RsaPublicKey>,
}

impl RsaCipher {
	/// Build a cipher from raw key material; blank strings mean "not configured"
	pub fn from_pem(private_key: &str, public_key: &str) -> Result<Self, CryptoError> {
		let private_key = if private_key.trim().is_empty() {
			None
		} else {
			Some(load_private_key(private_key)?)
		};
		let public_key = if public_key.trim().is_empty() {
			None
		} else {
			Some(load_public_key(public_key)?)
		};

		Ok(Self {
			private_key,
			public_key,
		})
	}

	pub fn from_keys(private_key: Option<RsaPrivateKey>, public_key: Option<RsaPublicKey>) -> Self {
		Self {
			private_key,
			public_key,
		}
	}
}

impl SigningCipher for RsaCipher {
	fn seal(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
		let key = self
			.private_key
			.as_ref()
			.ok_or(CryptoError::KeyNotConfigured("private key"))?;
		seal_private(plaintext, key)
	}

	fn open(&self, ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
		let key = self
			.public_key
			.as_ref()
			.ok_or(CryptoError::KeyNotConfigured("public key"))?;
		open_public(ciphertext, key)
	}
}

/// Seal `plaintext` block by block with the private key
///
/// Empty input yields an empty string (zero blocks).
pub fn seal_private(plaintext: &[u8], key: &RsaPrivateKey) -> Result<String, CryptoError> {
	let mut sealed = Vec::with_capacity(plaintext.len().div_ceil(MAX_ENCRYPT_BLOCK) * key.size());

	for block in plaintext.chunks(MAX_ENCRYPT_BLOCK) {
		// An unprefixed PKCS#1 v1.5 signature is exactly the private-key
		// "encrypt" primitive: 0x00 0x01 ff..ff 0x00 || block, then m^d mod n.
		let encrypted = key
			.sign(Pkcs1v15Sign::new_unprefixed(), block)
			.map_err(|e| CryptoError::CryptoOperationFailed(format!("Failed to encrypt with private key: {}", e)))?;
		sealed.extend_from_slice(&encrypted);
	}

	Ok(URL_SAFE_NO_PAD.encode(&sealed))
}

/// Open a sealed payload block by block with the public key
///
/// The final block may be shorter than [`MAX_DECRYPT_BLOCK`]; it is handed
/// to the RSA primitive as-is and only rejected if the primitive rejects it.
pub fn open_public(ciphertext: &str, key: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
	let sealed = decode_ciphertext(ciphertext)?;

	let mut opened = Vec::with_capacity(sealed.len());
	for block in sealed.chunks(MAX_DECRYPT_BLOCK) {
		opened.extend_from_slice(&recover_block(block, key)?);
	}

	Ok(opened)
}

/// Public-key "decrypt": c^e mod n, then strip block type 1 padding
fn recover_block(block: &[u8], key: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
	let k = key.size();
	if block.len() > k {
		return Err(CryptoError::CryptoOperationFailed(format!(
			"Failed to decrypt with public key: block of {} bytes exceeds modulus size {}",
			block.len(),
			k
		)));
	}

	let c = BigUint::from_bytes_be(block);
	if c >= *key.n() {
		return Err(CryptoError::CryptoOperationFailed(
			"Failed to decrypt with public key: block out of range for modulus".to_string(),
		));
	}

	let m = c.modpow(key.e(), key.n()).to_bytes_be();
	let mut em = vec![0u8; k];
	em[k - m.len()..].copy_from_slice(&m);

	unpad_block_type_1(&em)
}

fn unpad_block_type_1(em: &[u8]) -> Result<Vec<u8>, CryptoError> {
	let invalid = || {
		CryptoError::CryptoOperationFailed(
			"Failed to decrypt with public key: invalid PKCS#1 padding".to_string(),
		)
	};

	if em.len() < PKCS1_MIN_PADDING || em[0] != 0x00 || em[1] != 0x01 {
		return Err(invalid());
	}

	let padding_len = em[2..].iter().take_while(|&&b| b == 0xff).count();
	let separator = 2 + padding_len;
	if padding_len < 8 || separator >= em.len() || em[separator] != 0x00 {
		return Err(invalid());
	}

	Ok(em[separator + 1..].to_vec())
}

/// Decode sealed text in either base64 alphabet, with or without padding
///
/// Embedded whitespace (line-wrapped payloads) is ignored.
fn decode_ciphertext(ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
	let compact: String = ciphertext
		.chars()
		.filter(|c| !c.is_ascii_whitespace())
		.collect();

	URL_SAFE_LENIENT
		.decode(&compact)
		.or_else(|e| STANDARD_LENIENT.decode(&compact).map_err(|_| e))
		.map_err(|e| CryptoError::CryptoOperationFailed(format!("Invalid ciphertext encoding: {}", e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_keys::{CLIENT, SERVER};

	fn round_trip(len: usize) {
		let plaintext: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
		let sealed = seal_private(&plaintext, &CLIENT.private).unwrap();
		let opened = open_public(&sealed, &CLIENT.public).unwrap();
		assert_eq!(opened, plaintext, "round trip failed for {} bytes", len);
	}

	#[test]
	fn test_round_trip_across_block_boundaries() {
		for len in [0, 1, 233, 234, 235, 10_000] {
			round_trip(len);
		}
	}

	#[test]
	fn test_empty_plaintext_seals_to_empty_string() {
		assert_eq!(seal_private(b"", &CLIENT.private).unwrap(), "");
		assert!(open_public("", &CLIENT.public).unwrap().is_empty());
	}

	#[test]
	fn test_sealed_output_is_url_safe_and_block_aligned() {
		let sealed = seal_private(&[0xfbu8; 500], &CLIENT.private).unwrap();
		assert!(!sealed.contains('+'));
		assert!(!sealed.contains('/'));
		assert!(!sealed.contains('='));

		let raw = URL_SAFE_NO_PAD.decode(&sealed).unwrap();
		// 500 bytes -> 3 blocks of 234/234/32
		assert_eq!(raw.len(), 3 * MAX_DECRYPT_BLOCK);
	}

	#[test]
	fn test_sealing_is_deterministic() {
		let a = seal_private(b"{\"a\":1}", &CLIENT.private).unwrap();
		let b = seal_private(b"{\"a\":1}", &CLIENT.private).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn test_utf8_payload_round_trips() {
		let text = "提现 0.5 ETH → 0xAbC".repeat(40);
		let sealed = seal_private(text.as_bytes(), &CLIENT.private).unwrap();
		let opened = open_public(&sealed, &CLIENT.public).unwrap();
		assert_eq!(String::from_utf8(opened).unwrap(), text);
	}

	#[test]
	fn test_wrong_public_key_fails() {
		let sealed = seal_private(b"hello", &CLIENT.private).unwrap();
		let err = open_public(&sealed, &SERVER.public).unwrap_err();
		assert!(matches!(err, CryptoError::CryptoOperationFailed(_)));
	}

	#[test]
	fn test_truncated_ciphertext_fails() {
		let sealed = seal_private(b"hello", &CLIENT.private).unwrap();
		let truncated = &sealed[..sealed.len() - 8];
		assert!(open_public(truncated, &CLIENT.public).is_err());
	}

	#[test]
	fn test_accepts_standard_padded_alphabet() {
		let sealed = seal_private(b"padding", &CLIENT.private).unwrap();
		let raw = URL_SAFE_NO_PAD.decode(&sealed).unwrap();
		let standard = base64::engine::general_purpose::STANDARD.encode(&raw);
		assert!(standard.ends_with('='));
		assert_eq!(open_public(&standard, &CLIENT.public).unwrap(), b"padding");
	}

	#[test]
	fn test_line_wrapped_ciphertext_opens() {
		let plaintext = [0x5au8; 500];
		let sealed = seal_private(&plaintext, &CLIENT.private).unwrap();
		let wrapped = sealed
			.as_bytes()
			.chunks(76)
			.map(|line| std::str::from_utf8(line).unwrap())
			.collect::<Vec<_>>()
			.join("\r\n");
		assert!(wrapped.contains("\r\n"));

		assert_eq!(open_public(&wrapped, &CLIENT.public).unwrap(), plaintext);
		assert_eq!(
			open_public(&format!("  {}\n", wrapped), &CLIENT.public).unwrap(),
			plaintext
		);
	}

	#[test]
	fn test_cipher_without_keys_reports_missing_key() {
		let cipher = RsaCipher::from_keys(None, None);
		assert_eq!(
			cipher.seal(b"x").unwrap_err(),
			CryptoError::KeyNotConfigured("private key")
		);
		assert_eq!(
			cipher.open("").unwrap_err(),
			CryptoError::KeyNotConfigured("public key")
		);
	}

	#[test]
	fn test_cipher_from_pem_round_trip() {
		let cipher = RsaCipher::from_pem(&CLIENT.pkcs8_pem, &CLIENT.public_pem).unwrap();
		let sealed = cipher.seal(b"{\"code\":\"0\"}").unwrap();
		assert_eq!(cipher.open(&sealed).unwrap(), b"{\"code\":\"0\"}");
	}

	#[test]
	fn test_unpad_rejects_short_padding() {
		let mut em = vec![0u8; 16];
		em[1] = 0x01;
		em[2..5].fill(0xff);
		assert!(unpad_block_type_1(&em).is_err());
	}
}
