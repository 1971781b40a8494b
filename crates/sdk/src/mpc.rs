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

//! MPC wallet endpoints
//!
//! Thin wrappers over [`Client::post`] / [`Client::get`] for withdrawals,
//! Web3 transactions and deposit records. Withdrawals and Web3 transactions
//! optionally carry a transaction signature produced with the configured
//! signing key.

use serde_json::{Map, Value};
use tracing::info;

use crate::{
	client::{Client, ClientError},
	signing::{SigningError, web3_sign_fields, withdraw_sign_fields},
	types::{Web3TransactionRequest, WithdrawRequest},
};

pub const WITHDRAW_PATH: &str = "/api/mpc/billing/withdraw";
pub const WITHDRAW_LIST_PATH: &str = "/api/mpc/billing/withdraw_list";
pub const SYNC_WITHDRAW_LIST_PATH: &str = "/api/mpc/billing/sync_withdraw_list";
pub const DEPOSIT_LIST_PATH: &str = "/api/mpc/billing/deposit_list";
pub const SYNC_DEPOSIT_LIST_PATH: &str = "/api/mpc/billing/sync_deposit_list";
pub const WEB3_CREATE_PATH: &str = "/api/mpc/web3/trans/create";
pub const WEB3_ACCELERATE_PATH: &str = "/api/mpc/web3/trans/pending";
pub const WEB3_LIST_PATH: &str = "/api/mpc/web3/trans_list";
pub const SYNC_WEB3_LIST_PATH: &str = "/api/mpc/web3/sync_trans_list";

impl Client {
	/// Initiate a withdrawal
	pub async fn withdraw(&self, request: &WithdrawRequest) -> Result<Value, ClientError> {
		if request.request_id.is_empty()
			|| request.sub_wallet_id == 0
			|| request.symbol.is_empty()
			|| request.amount.is_empty()
			|| request.address_to.is_empty()
		{
			return Err(ClientError::InvalidRequest(
				"Required parameters: request_id, sub_wallet_id, symbol, amount, address_to"
					.to_string(),
			));
		}

		let mut body = Map::new();
		body.insert("request_id".into(), request.request_id.clone().into());
		body.insert("sub_wallet_id".into(), request.sub_wallet_id.into());
		body.insert("symbol".into(), request.symbol.clone().into());
		body.insert("amount".into(), request.amount.clone().into());
		body.insert("address_to".into(), request.address_to.clone().into());
		insert_non_empty(&mut body, "from", &request.from);
		insert_non_empty(&mut body, "memo", &request.memo);
		insert_non_empty(&mut body, "remark", &request.remark);
		insert_non_empty(&mut body, "outputs", &request.outputs);

		if request.need_transaction_sign {
			let sign = self.signer()?.sign_fields(&withdraw_sign_fields(request))?;
			if sign.is_empty() {
				return Err(ClientError::Signing(SigningError::Signing(
					"Failed to generate withdrawal signature".to_string(),
				)));
			}
			body.insert("sign".into(), sign.into());
		}

		info!(
			target: "mpc",
			request_id = %request.request_id,
			symbol = %request.symbol,
			signed = request.need_transaction_sign,
			"Submitting withdrawal"
		);
		let response = self.post(WITHDRAW_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Withdrawal records by request ID (up to 100)
	pub async fn withdraw_records(&self, request_ids: &[String]) -> Result<Value, ClientError> {
		let response = self.get(WITHDRAW_LIST_PATH, &ids_query("request_ids", request_ids)?).await?;
		self.validate_response(response)
	}

	/// Withdrawal records with an ID above `max_id`
	pub async fn sync_withdraw_records(&self, max_id: u64) -> Result<Value, ClientError> {
		let response = self.get(SYNC_WITHDRAW_LIST_PATH, &max_id_query(max_id)).await?;
		self.validate_response(response)
	}

	/// Create a Web3 (contract interaction) transaction
	pub async fn create_web3_transaction(
		&self,
		request: &Web3TransactionRequest,
	) -> Result<Value, ClientError> {
		if request.request_id.is_empty()
			|| request.sub_wallet_id == 0
			|| request.main_chain_symbol.is_empty()
			|| request.interactive_contract.is_empty()
			|| request.amount.is_empty()
		{
			return Err(ClientError::InvalidRequest(
				"Required parameters: request_id, sub_wallet_id, main_chain_symbol, \
				 interactive_contract, amount"
					.to_string(),
			));
		}

		let mut body = Map::new();
		body.insert("request_id".into(), request.request_id.clone().into());
		body.insert("sub_wallet_id".into(), request.sub_wallet_id.into());
		body.insert(
			"main_chain_symbol".into(),
			request.main_chain_symbol.clone().into(),
		);
		body.insert(
			"interactive_contract".into(),
			request.interactive_contract.clone().into(),
		);
		body.insert("amount".into(), request.amount.clone().into());
		body.insert("input_data".into(), request.input_data.clone().into());
		insert_non_empty(&mut body, "gas_price", &request.gas_price);
		insert_non_empty(&mut body, "gas_limit", &request.gas_limit);

		if request.need_transaction_sign {
			let sign = self.signer()?.sign_fields(&web3_sign_fields(request))?;
			if sign.is_empty() {
				return Err(ClientError::Signing(SigningError::Signing(
					"Failed to generate web3 transaction signature".to_string(),
				)));
			}
			body.insert("sign".into(), sign.into());
		}

		info!(
			target: "mpc",
			request_id = %request.request_id,
			chain = %request.main_chain_symbol,
			signed = request.need_transaction_sign,
			"Submitting web3 transaction"
		);
		let response = self.post(WEB3_CREATE_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Re-broadcast a pending Web3 transaction with a higher fee
	pub async fn accelerate_web3_transaction(
		&self,
		request_id: &str,
		gas_price: &str,
		gas_limit: Option<&str>,
	) -> Result<Value, ClientError> {
		if request_id.is_empty() || gas_price.is_empty() {
			return Err(ClientError::InvalidRequest(
				"Required parameters: request_id, gas_price".to_string(),
			));
		}

		let mut body = Map::new();
		body.insert("request_id".into(), request_id.into());
		body.insert("gas_price".into(), gas_price.into());
		if let Some(limit) = gas_limit.filter(|l| !l.is_empty()) {
			body.insert("gas_limit".into(), limit.into());
		}

		let response = self.post(WEB3_ACCELERATE_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Web3 transaction records by request ID (up to 100)
	pub async fn web3_records(&self, request_ids: &[String]) -> Result<Value, ClientError> {
		let response = self.get(WEB3_LIST_PATH, &ids_query("request_ids", request_ids)?).await?;
		self.validate_response(response)
	}

	/// Web3 transaction records with an ID above `max_id`
	pub async fn sync_web3_records(&self, max_id: u64) -> Result<Value, ClientError> {
		let response = self.get(SYNC_WEB3_LIST_PATH, &max_id_query(max_id)).await?;
		self.validate_response(response)
	}

	/// Deposit records by deposit ID (up to 100)
	pub async fn deposit_records(&self, ids: &[u64]) -> Result<Value, ClientError> {
		let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
		let response = self.get(DEPOSIT_LIST_PATH, &ids_query("ids", &ids)?).await?;
		self.validate_response(response)
	}

	/// Deposit records with an ID above `max_id`
	pub async fn sync_deposit_records(&self, max_id: u64) -> Result<Value, ClientError> {
		let response = self.get(SYNC_DEPOSIT_LIST_PATH, &max_id_query(max_id)).await?;
		self.validate_response(response)
	}
}

pub(crate) fn insert_non_empty(body: &mut Map<String, Value>, key: &str, value: &Option<String>) {
	if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
		body.insert(key.to_string(), v.into());
	}
}

pub(crate) fn ids_query(param: &str, ids: &[String]) -> Result<Map<String, Value>, ClientError> {
	if ids.is_empty() {
		return Err(ClientError::InvalidRequest(format!(
			"Parameter \"{}\" is required and must be a non-empty list",
			param
		)));
	}
	let mut query = Map::new();
	query.insert("ids".into(), ids.join(",").into());
	Ok(query)
}

pub(crate) fn max_id_query(max_id: u64) -> Map<String, Value> {
	let mut query = Map::new();
	query.insert("max_id".into(), max_id.into());
	query
}
