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

//! Custody (WaaS) API endpoints
//!
//! Every custody call is a sealed POST whose opened response must carry a
//! success `code`; see [`validate_response`]. Parameters are passed through
//! as given, the platform owns their validation.
//!
//! ```ignore
//! let client = Client::new(config)?;
//! let mut params = Map::new();
//! params.insert("symbol".into(), "ETH".into());
//! let account = client.custody().company_account(&params).await?;
//! ```

use serde_json::{Map, Value};
use tracing::info;

use crate::client::{Client, ClientError, validate_response};

pub const REGISTER_MOBILE_PATH: &str = "/user/createUser";
pub const REGISTER_EMAIL_PATH: &str = "/user/registerEmail";
pub const USER_INFO_PATH: &str = "/user/info";
pub const USER_ACCOUNT_PATH: &str = "/account/getByUidAndSymbol";
pub const DEPOSIT_ADDRESS_PATH: &str = "/account/getDepositAddress";
pub const COMPANY_ACCOUNT_PATH: &str = "/account/getCompanyBySymbol";
pub const DEPOSIT_ADDRESS_INFO_PATH: &str = "/account/getDepositAddressInfo";
pub const SYNC_ADDRESS_LIST_PATH: &str = "/address/syncList";
pub const WITHDRAW_PATH: &str = "/billing/withdraw";
pub const WITHDRAW_LIST_PATH: &str = "/billing/withdrawList";
pub const SYNC_WITHDRAW_LIST_PATH: &str = "/billing/syncWithdrawList";
pub const DEPOSIT_LIST_PATH: &str = "/billing/depositList";
pub const SYNC_DEPOSIT_LIST_PATH: &str = "/billing/syncDepositList";
pub const MINER_FEE_LIST_PATH: &str = "/billing/minerFeeList";
pub const SYNC_MINER_FEE_LIST_PATH: &str = "/billing/syncMinerFeeList";
pub const COIN_LIST_PATH: &str = "/coin/list";
pub const TRANSFER_PATH: &str = "/transfer/transfer";
pub const TRANSFER_LIST_PATH: &str = "/transfer/transferList";
pub const SYNC_TRANSFER_LIST_PATH: &str = "/transfer/syncTransferList";

/// Custody endpoints bound to a [`Client`]
#[derive(Clone, Copy)]
pub struct CustodyApi<'a> {
	client: &'a Client,
}

impl Client {
	/// Custody (WaaS) endpoints; the client should use [`crate::ApiFlavor::Custody`]
	pub fn custody(&self) -> CustodyApi<'_> {
		CustodyApi { client: self }
	}
}

impl CustodyApi<'_> {
	async fn call(&self, path: &str, params: &Map<String, Value>) -> Result<Value, ClientError> {
		let response = self.client.post(path, params).await?;
		validate_response(response)
	}

	/// Register a user by `country` and `mobile`
	pub async fn register_mobile_user(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		info!(target: "custody", "Registering mobile user");
		self.call(REGISTER_MOBILE_PATH, params).await
	}

	/// Register a user by `email`
	pub async fn register_email_user(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		info!(target: "custody", "Registering email user");
		self.call(REGISTER_EMAIL_PATH, params).await
	}

	/// Look up a user by `country` + `mobile` or by `email`
	pub async fn user_info(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(USER_INFO_PATH, params).await
	}

	/// Balance of a user (`uid`) for `symbol`
	pub async fn user_account(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(USER_ACCOUNT_PATH, params).await
	}

	/// Deposit address of a user (`uid`) for `symbol`
	pub async fn user_address(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(DEPOSIT_ADDRESS_PATH, params).await
	}

	/// Company (main) account balance for `symbol`
	pub async fn company_account(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(COMPANY_ACCOUNT_PATH, params).await
	}

	/// Owner and coin behind a deposit `address`
	pub async fn user_address_info(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(DEPOSIT_ADDRESS_INFO_PATH, params).await
	}

	/// User addresses with an ID above `max_id`
	pub async fn sync_user_addresses(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(SYNC_ADDRESS_LIST_PATH, params).await
	}

	/// Initiate a withdrawal from a user account
	pub async fn withdraw(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		info!(
			target: "custody",
			request_id = params.get("request_id").and_then(serde_json::Value::as_str).unwrap_or_default(),
			"Submitting withdrawal"
		);
		self.call(WITHDRAW_PATH, params).await
	}

	/// Withdrawal records by comma-separated `ids`
	pub async fn withdraw_list(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(WITHDRAW_LIST_PATH, params).await
	}

	/// Withdrawal records with an ID above `max_id`
	pub async fn sync_withdraw_list(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(SYNC_WITHDRAW_LIST_PATH, params).await
	}

	/// Deposit records by comma-separated `ids`
	pub async fn deposit_list(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(DEPOSIT_LIST_PATH, params).await
	}

	/// Deposit records with an ID above `max_id`
	pub async fn sync_deposit_list(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(SYNC_DEPOSIT_LIST_PATH, params).await
	}

	/// Miner fee records by comma-separated `ids`
	pub async fn miner_fee_list(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(MINER_FEE_LIST_PATH, params).await
	}

	/// Miner fee records with an ID above `max_id`
	pub async fn sync_miner_fee_list(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(SYNC_MINER_FEE_LIST_PATH, params).await
	}

	/// Coins supported by the platform
	pub async fn coin_list(&self) -> Result<Value, ClientError> {
		self.call(COIN_LIST_PATH, &Map::new()).await
	}

	/// Move funds between accounts inside the platform
	pub async fn account_transfer(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		info!(
			target: "custody",
			request_id = params.get("request_id").and_then(serde_json::Value::as_str).unwrap_or_default(),
			"Submitting account transfer"
		);
		self.call(TRANSFER_PATH, params).await
	}

	/// Transfer records by `ids`, interpreted per `ids_type`
	pub async fn account_transfer_list(&self, params: &Map<String, Value>) -> Result<Value, ClientError> {
		self.call(TRANSFER_LIST_PATH, params).await
	}

	/// Transfer records with an ID above `max_id`
	pub async fn sync_account_transfer_list(
		&self,
		params: &Map<String, Value>,
	) -> Result<Value, ClientError> {
		self.call(SYNC_TRANSFER_LIST_PATH, params).await
	}
}
