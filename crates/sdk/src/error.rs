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

use thiserror::Error;

/// Error types for key handling and the envelope cipher
///
/// Callers must not infer a specific cause from `CryptoOperationFailed`:
/// a corrupt ciphertext, a mismatched key and a truncated input all
/// surface the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
	#[error("Invalid key format: {0}")]
	InvalidKeyFormat(String),
	#[error("Crypto operation failed: {0}")]
	CryptoOperationFailed(String),
	#[error("Key not configured: {0}")]
	KeyNotConfigured(&'static str),
}
