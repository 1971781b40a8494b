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

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, bail};
use custody_sdk::{ApiFlavor, ClientConfig};
use serde::Deserialize;

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log directory component name
pub const LOG_COMPONENT_NAME: &str = "cli";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// API configuration constants
/// Default API domain (can be overridden by CUSTODY_DOMAIN)
pub const DEFAULT_DOMAIN: &str = custody_sdk::config::DEFAULT_DOMAIN;

/// Default HTTP timeout in milliseconds (can be overridden by CUSTODY_TIMEOUT_MS)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Environment variable prefix for CLI configuration
pub const ENV_PREFIX: &str = "CUSTODY";

/// CLI configuration
///
/// Key fields accept inline key material (PEM or bare base64) or `@path`
/// to read the key from a file.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
	pub domain: String,
	#[serde(default)]
	pub app_id: String,
	#[serde(default)]
	pub rsa_private_key: String,
	#[serde(default)]
	pub waas_public_key: String,
	#[serde(default)]
	pub sign_private_key: String,
	pub timeout_ms: u64,
	/// `mpc` or `custody`
	pub flavor: String,
	#[serde(default)]
	pub debug: bool,
	#[serde(default)]
	pub strict_decrypt: bool,
}

impl CliConfig {
	/// Load from an optional config file, then `CUSTODY_*` environment variables
	pub fn load(path: Option<&Path>) -> Result<Self> {
		dotenv::dotenv().ok();

		let mut builder = config::Config::builder()
			.set_default("domain", DEFAULT_DOMAIN)?
			.set_default("timeout_ms", DEFAULT_TIMEOUT_MS as i64)?
			.set_default("flavor", "mpc")?;

		if let Some(path) = path {
			builder = builder.add_source(config::File::from(path));
		}

		let cfg = builder
			.add_source(config::Environment::with_prefix(ENV_PREFIX))
			.build()
			.context("Failed to load configuration")?;

		cfg.try_deserialize()
			.context("Failed to parse configuration")
	}

	pub fn flavor(&self) -> Result<ApiFlavor> {
		match self.flavor.to_ascii_lowercase().as_str() {
			"mpc" => Ok(ApiFlavor::Mpc),
			"custody" | "waas" => Ok(ApiFlavor::Custody),
			other => bail!("Unknown API flavor: {}", other),
		}
	}

	/// Build the SDK client configuration
	pub fn client_config(&self) -> Result<ClientConfig> {
		let config = ClientConfig::builder()
			.domain(self.domain.as_str())
			.app_id(self.app_id.as_str())
			.rsa_private_key(key_material(&self.rsa_private_key)?)
			.waas_public_key(key_material(&self.waas_public_key)?)
			.sign_private_key(key_material(&self.sign_private_key)?)
			.timeout(Duration::from_millis(self.timeout_ms))
			.flavor(self.flavor()?)
			.debug(self.debug)
			.strict_decrypt(self.strict_decrypt)
			.build()
			.context("Invalid client configuration")?;
		Ok(config)
	}
}

/// Resolve `@path` references to file contents
pub fn key_material(value: &str) -> Result<String> {
	match value.strip_prefix('@') {
		Some(path) => fs::read_to_string(path)
			.with_context(|| format!("Failed to read key file: {}", path)),
		None => Ok(value.to_string()),
	}
}
