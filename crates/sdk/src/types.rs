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

use serde::{Deserialize, Serialize};

/// Outer request envelope sent as form fields (POST) or query string (GET)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
	/// Application identifier issued by the custody platform
	pub app_id: String,
	/// Sealed JSON payload, URL-safe base64 without padding
	pub data: String,
}

/// Request to initiate an MPC withdrawal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WithdrawRequest {
	/// Caller-unique request ID (idempotency key)
	pub request_id: String,
	/// Sub-wallet to withdraw from
	pub sub_wallet_id: u64,
	/// Coin symbol (e.g., "USDTERC20")
	pub symbol: String,
	/// Amount as a decimal string
	pub amount: String,
	/// Destination address
	pub address_to: String,
	/// Specific source address
	#[serde(default)]
	pub from: Option<String>,
	/// Address memo / tag for coins that require it
	#[serde(default)]
	pub memo: Option<String>,
	#[serde(default)]
	pub remark: Option<String>,
	/// UTXO outputs, JSON-encoded
	#[serde(default)]
	pub outputs: Option<String>,
	/// Attach a transaction signature (`sign` field)
	#[serde(default)]
	pub need_transaction_sign: bool,
}

/// Request to create an MPC Web3 (contract interaction) transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Web3TransactionRequest {
	/// Caller-unique request ID (idempotency key)
	pub request_id: String,
	pub sub_wallet_id: u64,
	/// Main chain coin symbol (e.g., "ETH")
	pub main_chain_symbol: String,
	/// Contract address the transaction interacts with
	pub interactive_contract: String,
	/// Native coin amount as a decimal string
	pub amount: String,
	/// Hex-encoded call data
	pub input_data: String,
	#[serde(default)]
	pub gas_price: Option<String>,
	#[serde(default)]
	pub gas_limit: Option<String>,
	/// Attach a transaction signature (`sign` field)
	#[serde(default)]
	pub need_transaction_sign: bool,
}

/// Wallet visibility in the platform App and web portal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ShowStatus {
	Show,
	#[default]
	Hide,
}

impl From<ShowStatus> for u8 {
	fn from(status: ShowStatus) -> u8 {
		match status {
			ShowStatus::Show => 1,
			ShowStatus::Hide => 2,
		}
	}
}

impl TryFrom<u8> for ShowStatus {
	type Error = String;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		match code {
			1 => Ok(ShowStatus::Show),
			2 => Ok(ShowStatus::Hide),
			other => Err(format!("app_show_status must be 1 or 2, got {}", other)),
		}
	}
}

/// Filters for the coin details listing; unset fields are not sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoinDetailsQuery {
	pub symbol: Option<String>,
	/// Main chain coin symbol (e.g., "ETH")
	pub base_symbol: Option<String>,
	/// `true` for opened coins, `false` for unopened ones
	pub open_chain: Option<bool>,
	pub max_id: Option<u64>,
	/// Page size, the platform defaults to 1500
	pub limit: Option<u32>,
}

/// Request to buy TRON energy or bandwidth for an address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TronDelegateRequest {
	/// Caller-unique request ID (idempotency key)
	pub request_id: String,
	/// Address paying for the resources
	pub address_from: String,
	pub service_charge_type: String,
	#[serde(default)]
	pub buy_type: Option<u32>,
	/// 0 for energy, 1 for bandwidth
	#[serde(default)]
	pub resource_type: Option<u32>,
	#[serde(default)]
	pub energy_num: Option<u64>,
	#[serde(default)]
	pub net_num: Option<u64>,
	/// Address receiving the resources
	#[serde(default)]
	pub address_to: Option<String>,
	#[serde(default)]
	pub contract_address: Option<String>,
}
