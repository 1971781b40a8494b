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

//! Canonical parameter string for transaction signatures
//!
//! The remote service recomputes this exact string before checking a
//! withdrawal or Web3 signature, so the rules are fixed:
//!
//! - fields whose value is null or an empty string are dropped
//! - the `amount` field loses trailing fractional zeros (and a bare `.`)
//! - keys are sorted by byte value, then joined as `k1=v1&k2=v2`
//! - the whole string is lower-cased, values included

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

/// Field whose value is numerically normalized before signing
pub const AMOUNT_FIELD: &str = "amount";

/// Build the canonical signing string for a field map
///
/// Returns an empty string for `None` or when no field survives filtering.
pub fn canonicalize<'a>(fields: impl Into<Option<&'a Map<String, Value>>>) -> String {
	let Some(fields) = fields.into() else {
		return String::new();
	};

	let mut sorted: BTreeMap<&str, String> = BTreeMap::new();
	for (key, value) in fields {
		let Some(mut value) = param_string(value) else {
			continue;
		};
		if key == AMOUNT_FIELD {
			value = trim_amount(&value);
		}
		sorted.insert(key.as_str(), value);
	}

	sorted
		.iter()
		.map(|(key, value)| format!("{}={}", key, value))
		.collect::<Vec<_>>()
		.join("&")
		.to_lowercase()
}

/// String form of a field value, `None` when the field must be skipped
fn param_string(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) if s.is_empty() => None,
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(number_string(n)),
		Value::Bool(b) => Some(b.to_string()),
		other => Some(other.to_string()),
	}
}

/// Render a JSON number the way it is signed
///
/// Floats use f64 `Display`, which never switches to exponent notation:
/// `1e-7` renders as `0.0000001` and `1e21` as `1000000000000000000000`.
/// Callers needing a specific textual form for tiny or huge amounts should
/// pass the amount as a string, which is signed verbatim after trimming.
fn number_string(n: &Number) -> String {
	if let Some(i) = n.as_i64() {
		i.to_string()
	} else if let Some(u) = n.as_u64() {
		u.to_string()
	} else {
		// f64 Display is the shortest round-trip form: 1.5 -> "1.5", 2.0 -> "2"
		n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
	}
}

/// Strip trailing zeros after the last decimal point, then a dangling `.`
///
/// `"1.0001000"` -> `"1.0001"`, `"100.000"` -> `"100"`, `"100"` -> `"100"`.
/// Only an all-digit fraction is trimmed.
pub fn trim_amount(amount: &str) -> String {
	let mut trimmed = amount;
	if let Some(dot) = amount.rfind('.') {
		let fraction = &amount[dot + 1..];
		if fraction.bytes().all(|b| b.is_ascii_digit()) {
			let kept = fraction.trim_end_matches('0').len();
			trimmed = &amount[..dot + 1 + kept];
		}
	}

	trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}
