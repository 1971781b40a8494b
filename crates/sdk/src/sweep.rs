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

//! Auto-sweep and TRON resource endpoints

use serde_json::{Map, Value};
use tracing::info;

use crate::{
	client::{Client, ClientError},
	mpc::{ids_query, insert_non_empty, max_id_query},
	types::TronDelegateRequest,
};

pub const AUTO_COLLECT_WALLETS_PATH: &str = "/api/mpc/auto_collect/sub_wallets";
pub const AUTO_COLLECT_SYMBOL_PATH: &str = "/api/mpc/auto_collect/symbol/set";
pub const SYNC_AUTO_COLLECT_PATH: &str = "/api/mpc/billing/sync_auto_collect_list";
pub const TRON_DELEGATE_PATH: &str = "/api/mpc/tron/delegate";
pub const TRON_DELEGATE_LIST_PATH: &str = "/api/mpc/tron/delegate/trans_list";
pub const SYNC_TRON_DELEGATE_PATH: &str = "/api/mpc/tron/delegate/sync_trans_list";

impl Client {
	/// Sub-wallets swept automatically for `symbol`
	pub async fn auto_collect_wallets(&self, symbol: &str) -> Result<Value, ClientError> {
		if symbol.is_empty() {
			return Err(ClientError::InvalidRequest(
				"Parameter \"symbol\" is required".to_string(),
			));
		}

		let mut query = Map::new();
		query.insert("symbol".into(), symbol.into());
		let response = self.get(AUTO_COLLECT_WALLETS_PATH, &query).await?;
		self.validate_response(response)
	}

	/// Configure sweeping for `symbol`
	///
	/// `collect_min` is the smallest balance worth sweeping and
	/// `fueling_limit` caps the miner fee, both decimal strings.
	pub async fn set_auto_collect_symbol(
		&self,
		symbol: &str,
		collect_min: &str,
		fueling_limit: &str,
	) -> Result<Value, ClientError> {
		if symbol.is_empty() || collect_min.is_empty() || fueling_limit.is_empty() {
			return Err(ClientError::InvalidRequest(
				"Required parameters: symbol, collect_min, fueling_limit".to_string(),
			));
		}

		let mut body = Map::new();
		body.insert("symbol".into(), symbol.into());
		body.insert("collect_min".into(), collect_min.into());
		body.insert("fueling_limit".into(), fueling_limit.into());

		info!(target: "mpc", %symbol, %collect_min, %fueling_limit, "Updating auto-sweep settings");
		let response = self.post(AUTO_COLLECT_SYMBOL_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Sweep records with an ID above `max_id`
	pub async fn sync_auto_collect_records(&self, max_id: u64) -> Result<Value, ClientError> {
		let response = self.get(SYNC_AUTO_COLLECT_PATH, &max_id_query(max_id)).await?;
		self.validate_response(response)
	}

	/// Buy TRON energy or bandwidth
	pub async fn create_tron_delegate(&self, request: &TronDelegateRequest) -> Result<Value, ClientError> {
		for (field, value) in [
			("request_id", &request.request_id),
			("address_from", &request.address_from),
			("service_charge_type", &request.service_charge_type),
		] {
			if value.is_empty() {
				return Err(ClientError::InvalidRequest(format!(
					"Required parameter: {}",
					field
				)));
			}
		}

		let mut body = Map::new();
		body.insert("request_id".into(), request.request_id.clone().into());
		body.insert("address_from".into(), request.address_from.clone().into());
		body.insert(
			"service_charge_type".into(),
			request.service_charge_type.clone().into(),
		);
		let numbers = [
			("buy_type", request.buy_type.map(u64::from)),
			("resource_type", request.resource_type.map(u64::from)),
			("energy_num", request.energy_num),
			("net_num", request.net_num),
		];
		for (field, value) in numbers {
			if let Some(value) = value {
				body.insert(field.into(), value.into());
			}
		}
		insert_non_empty(&mut body, "address_to", &request.address_to);
		insert_non_empty(&mut body, "contract_address", &request.contract_address);

		info!(
			target: "mpc",
			request_id = %request.request_id,
			from = %request.address_from,
			"Buying TRON resources"
		);
		let response = self.post(TRON_DELEGATE_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Resource purchase records by request ID
	pub async fn tron_delegate_records(&self, request_ids: &[String]) -> Result<Value, ClientError> {
		let body = ids_query("request_ids", request_ids)?;
		let response = self.post(TRON_DELEGATE_LIST_PATH, &body).await?;
		self.validate_response(response)
	}

	/// Resource purchase records with an ID above `max_id`
	pub async fn sync_tron_delegate_records(&self, max_id: u64) -> Result<Value, ClientError> {
		let response = self.post(SYNC_TRON_DELEGATE_PATH, &max_id_query(max_id)).await?;
		self.validate_response(response)
	}
}
