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

//! MPC wallet and workspace endpoints
//!
//! Sub-wallet lifecycle (create, addresses, assets, visibility) and the
//! read-only workspace queries: opened main chains, coin details and chain
//! heights.

use serde_json::{Map, Value};
use tracing::info;

use crate::{
	client::{Client, ClientError},
	mpc::max_id_query,
	types::{CoinDetailsQuery, ShowStatus},
};

pub const CREATE_WALLET_PATH: &str = "/api/mpc/sub_wallet/create";
pub const CREATE_ADDRESS_PATH: &str = "/api/mpc/sub_wallet/create/address";
pub const ADDRESS_LIST_PATH: &str = "/api/mpc/sub_wallet/get/address/list";
pub const WALLET_ASSETS_PATH: &str = "/api/mpc/sub_wallet/assets";
pub const SHOW_STATUS_PATH: &str = "/api/mpc/sub_wallet/change_show_status";
pub const ADDRESS_INFO_PATH: &str = "/api/mpc/sub_wallet/address/info";
pub const OPEN_COIN_PATH: &str = "/api/mpc/wallet/open_coin";
pub const COIN_LIST_PATH: &str = "/api/mpc/coin_list";
pub const CHAIN_HEIGHT_PATH: &str = "/api/mpc/chain_height";

/// Longest accepted sub-wallet name, in characters
pub const MAX_WALLET_NAME_LEN: usize = 50;

impl Client {
	/// Create a sub-wallet under the main wallet
	pub async fn create_wallet(
		&self,
		name: &str,
		show_status: Option<ShowStatus>,
	) -> Result<Value, ClientError> {
		if name.is_empty() {
			return Err(ClientError::InvalidRequest(
				"Parameter \"sub_wallet_name\" is required".to_string(),
			));
		}
		if name.chars().count() > MAX_WALLET_NAME_LEN {
			return Err(ClientError::InvalidRequest(format!(
				"Wallet name cannot be longer than {} characters",
				MAX_WALLET_NAME_LEN
			)));
		}

		let mut body = Map::new();
		body.insert("sub_wallet_name".into(), name.into());
		if let Some(status) = show_status {
			body.insert("app_show_status".into(), u8::from(status).into());
		}

		info!(target: "mpc", wallet_name = %name, "Creating sub-wallet");
		let response = self.post(CREATE_WALLET_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Create a new `symbol` address in a sub-wallet
	pub async fn create_wallet_address(
		&self,
		sub_wallet_id: u64,
		symbol: &str,
	) -> Result<Value, ClientError> {
		let body = wallet_symbol(sub_wallet_id, symbol)?;
		let response = self.post(CREATE_ADDRESS_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Addresses of a sub-wallet for `symbol`, starting after `max_id`
	pub async fn wallet_addresses(
		&self,
		sub_wallet_id: u64,
		symbol: &str,
		max_id: u64,
	) -> Result<Value, ClientError> {
		let mut body = wallet_symbol(sub_wallet_id, symbol)?;
		body.insert("max_id".into(), max_id.into());
		let response = self.post(ADDRESS_LIST_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Balance of `symbol` held by a sub-wallet
	pub async fn wallet_assets(&self, sub_wallet_id: u64, symbol: &str) -> Result<Value, ClientError> {
		let query = wallet_symbol(sub_wallet_id, symbol)?;
		let response = self.get(WALLET_ASSETS_PATH, &query).await?;
		self.validate_response(response)
	}

	/// Show or hide sub-wallets in the App and web portal
	///
	/// Returns whether the platform acknowledged the change with code `0`.
	pub async fn change_wallet_show_status(
		&self,
		sub_wallet_ids: &[u64],
		status: ShowStatus,
	) -> Result<bool, ClientError> {
		if sub_wallet_ids.is_empty() {
			return Err(ClientError::InvalidRequest(
				"Parameter \"sub_wallet_ids\" is required".to_string(),
			));
		}

		let ids: Vec<String> = sub_wallet_ids.iter().map(u64::to_string).collect();
		let mut body = Map::new();
		body.insert("sub_wallet_ids".into(), ids.join(",").into());
		body.insert("app_show_status".into(), u8::from(status).into());

		let response = self.post(SHOW_STATUS_PATH, &body).await?;
		let response = self.validate_response(response)?;
		Ok(is_success_code(&response))
	}

	/// Custody user and coin behind an arbitrary address
	pub async fn wallet_address_info(
		&self,
		address: &str,
		memo: Option<&str>,
	) -> Result<Value, ClientError> {
		if address.is_empty() {
			return Err(ClientError::InvalidRequest(
				"Parameter \"address\" is required".to_string(),
			));
		}

		let mut query = Map::new();
		query.insert("address".into(), address.into());
		if let Some(memo) = memo.filter(|m| !m.is_empty()) {
			query.insert("memo".into(), memo.into());
		}

		let response = self.get(ADDRESS_INFO_PATH, &query).await?;
		self.validate_response(response)
	}

	/// Main chains opened for the workspace
	pub async fn supported_main_chains(&self) -> Result<Value, ClientError> {
		let response = self.get(OPEN_COIN_PATH, &Map::new()).await?;
		self.validate_response(response)
	}

	/// Coin details, filtered by whichever fields of `query` are set
	pub async fn coin_details(&self, query: &CoinDetailsQuery) -> Result<Value, ClientError> {
		let mut fields = Map::new();
		if let Some(symbol) = query.symbol.as_deref().filter(|s| !s.is_empty()) {
			fields.insert("symbol".into(), symbol.into());
		}
		if let Some(base) = query.base_symbol.as_deref().filter(|s| !s.is_empty()) {
			fields.insert("base_symbol".into(), base.into());
		}
		if let Some(open) = query.open_chain {
			fields.insert("open_chain".into(), open.into());
		}
		if let Some(max_id) = query.max_id {
			fields.extend(max_id_query(max_id));
		}
		if let Some(limit) = query.limit {
			fields.insert("limit".into(), limit.into());
		}

		let response = self.get(COIN_LIST_PATH, &fields).await?;
		self.validate_response(response)
	}

	/// Latest block height of a main chain
	pub async fn last_block_height(&self, base_symbol: &str) -> Result<Value, ClientError> {
		if base_symbol.is_empty() {
			return Err(ClientError::InvalidRequest(
				"Parameter \"base_symbol\" is required".to_string(),
			));
		}

		let mut query = Map::new();
		query.insert("base_symbol".into(), base_symbol.into());
		let response = self.get(CHAIN_HEIGHT_PATH, &query).await?;
		self.validate_response(response)
	}
}

fn wallet_symbol(sub_wallet_id: u64, symbol: &str) -> Result<Map<String, Value>, ClientError> {
	if sub_wallet_id == 0 {
		return Err(ClientError::InvalidRequest(
			"Parameter \"sub_wallet_id\" is required".to_string(),
		));
	}
	if symbol.is_empty() {
		return Err(ClientError::InvalidRequest(
			"Parameter \"symbol\" is required".to_string(),
		));
	}

	let mut body = Map::new();
	body.insert("sub_wallet_id".into(), sub_wallet_id.into());
	body.insert("symbol".into(), symbol.into());
	Ok(body)
}

fn is_success_code(response: &Value) -> bool {
	match response.get("code") {
		Some(Value::String(code)) => code == "0",
		Some(Value::Number(code)) => code.as_i64() == Some(0),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{config::ClientConfig, test_keys::CLIENT};
	use serde_json::json;

	fn client() -> Client {
		let config = ClientConfig::builder()
			.domain("http://127.0.0.1:9/")
			.app_id("app")
			.rsa_private_key(CLIENT.pkcs1_pem.as_str())
			.build()
			.unwrap();
		Client::new(config).unwrap()
	}

	#[test]
	fn test_wallet_symbol_requires_both_fields() {
		assert!(matches!(wallet_symbol(0, "ETH"), Err(ClientError::InvalidRequest(_))));
		assert!(matches!(wallet_symbol(7, ""), Err(ClientError::InvalidRequest(_))));

		let body = wallet_symbol(7, "ETH").unwrap();
		assert_eq!(Value::Object(body), json!({"sub_wallet_id": 7, "symbol": "ETH"}));
	}

	#[test]
	fn test_success_code_accepts_string_or_number() {
		assert!(is_success_code(&json!({"code": "0"})));
		assert!(is_success_code(&json!({"code": 0})));
		assert!(!is_success_code(&json!({"code": "100004"})));
		assert!(!is_success_code(&json!({"msg": "ok"})));
	}

	#[tokio::test]
	async fn test_create_wallet_validates_name() {
		let client = client();
		assert!(matches!(
			client.create_wallet("", None).await,
			Err(ClientError::InvalidRequest(_))
		));

		let long_name = "w".repeat(MAX_WALLET_NAME_LEN + 1);
		assert!(matches!(
			client.create_wallet(&long_name, None).await,
			Err(ClientError::InvalidRequest(_))
		));
	}

	#[tokio::test]
	async fn test_show_status_requires_ids() {
		assert!(matches!(
			client().change_wallet_show_status(&[], ShowStatus::Show).await,
			Err(ClientError::InvalidRequest(_))
		));
	}

	#[tokio::test]
	async fn test_address_queries_require_input() {
		let client = client();
		assert!(matches!(
			client.wallet_address_info("", None).await,
			Err(ClientError::InvalidRequest(_))
		));
		assert!(matches!(
			client.last_block_height("").await,
			Err(ClientError::InvalidRequest(_))
		));
	}

	#[test]
	fn test_show_status_codes() {
		assert_eq!(u8::from(ShowStatus::Show), 1);
		assert_eq!(u8::from(ShowStatus::Hide), 2);
		assert!(ShowStatus::try_from(3).is_err());
	}
}
