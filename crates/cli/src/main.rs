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

//! Custody CLI
//!
//! Operator tool over the custody SDK: key generation and normalization,
//! offline seal/open/sign helpers for debugging integrations, raw API calls
//! and webhook decoding.
//!
//! API commands read their configuration from an optional file (`--config`)
//! and `CUSTODY_*` environment variables (a `.env` file is honored).

mod config;
mod logging;

use std::{
	fs,
	io::{self, Read},
	path::PathBuf,
};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use custody_sdk::{
	Client, HttpMethod, KeyRole, NotifyCodec, RsaCipher, SigningCipher, WithdrawRequest,
	canonicalize, normalize_key, signing,
};
use rsa::{
	RsaPrivateKey, RsaPublicKey,
	pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
	config::{CliConfig, key_material},
	logging::init_logging,
};

#[derive(Parser)]
#[command(name = "custody", version, about = "Custody platform API toolkit")]
struct Cli {
	/// Configuration file (toml, yaml or json)
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Generate an RSA key pair (PKCS#8 private key, SPKI public key)
	Keygen {
		#[arg(long, default_value_t = 2048)]
		bits: usize,
		/// Write `private.pem` and `public.pem` here instead of stdout
		#[arg(long)]
		out_dir: Option<PathBuf>,
	},
	/// Re-wrap key material as strict PEM
	NormalizeKey {
		/// Key file (stdin when omitted)
		#[arg(long)]
		input: Option<PathBuf>,
		#[arg(long, value_enum, default_value_t = Role::Private)]
		role: Role,
		/// Keep a PKCS#8 private key as PKCS#8
		#[arg(long)]
		preserve_format: bool,
	},
	/// Seal text with a private key
	Seal {
		/// Private key: inline or @path
		#[arg(long)]
		key: String,
		/// Plaintext file (stdin when omitted)
		#[arg(long)]
		input: Option<PathBuf>,
	},
	/// Open sealed text with a public key
	Open {
		/// Public key: inline or @path
		#[arg(long)]
		key: String,
		/// Ciphertext file (stdin when omitted)
		#[arg(long)]
		input: Option<PathBuf>,
	},
	/// Print the canonical parameter string of a JSON object
	Canonicalize {
		#[arg(long)]
		fields: String,
	},
	/// Sign the canonical form of a JSON object
	Sign {
		#[arg(long)]
		fields: String,
		/// Signing private key: inline or @path
		#[arg(long)]
		key: String,
	},
	/// Send an enveloped API request and print the decoded response
	Call {
		#[arg(long, value_enum, default_value_t = Method::Post)]
		method: Method,
		#[arg(long)]
		path: String,
		/// Request fields as a JSON object
		#[arg(long, default_value = "{}")]
		fields: String,
	},
	/// Initiate an MPC withdrawal
	Withdraw {
		/// Idempotency key (random UUID when omitted)
		#[arg(long)]
		request_id: Option<String>,
		#[arg(long)]
		sub_wallet_id: u64,
		#[arg(long)]
		symbol: String,
		#[arg(long)]
		amount: String,
		#[arg(long)]
		address_to: String,
		#[arg(long)]
		memo: Option<String>,
		#[arg(long)]
		remark: Option<String>,
		/// Attach a transaction signature (needs a signing key)
		#[arg(long)]
		sign: bool,
	},
	/// Decode a webhook notification body
	Notify {
		/// Notification body file (stdin when omitted)
		#[arg(long)]
		input: Option<PathBuf>,
		/// Decode as a withdrawal verification callback
		#[arg(long)]
		verify: bool,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
	Private,
	Public,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
	Get,
	Post,
}

impl From<Method> for HttpMethod {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => HttpMethod::Get,
			Method::Post => HttpMethod::Post,
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	init_logging()?;
	let cli = Cli::parse();

	match cli.command {
		Command::Keygen { bits, out_dir } => keygen(bits, out_dir),
		Command::NormalizeKey {
			input,
			role,
			preserve_format,
		} => {
			let role = match role {
				Role::Private => KeyRole::Private,
				Role::Public => KeyRole::Public,
			};
			let pem = normalize_key(&read_input(input)?, role, preserve_format)?;
			println!("{}", pem);
			Ok(())
		}
		Command::Seal { key, input } => {
			let cipher = RsaCipher::from_pem(&key_material(&key)?, "")?;
			println!("{}", cipher.seal(read_input(input)?.as_bytes())?);
			Ok(())
		}
		Command::Open { key, input } => {
			let cipher = RsaCipher::from_pem("", &key_material(&key)?)?;
			let opened = cipher.open(read_input(input)?.trim())?;
			println!(
				"{}",
				String::from_utf8(opened).context("Decrypted payload is not UTF-8")?
			);
			Ok(())
		}
		Command::Canonicalize { fields } => {
			println!("{}", canonicalize(&parse_fields(&fields)?));
			Ok(())
		}
		Command::Sign { fields, key } => {
			let canonical = canonicalize(&parse_fields(&fields)?);
			let sign = signing::sign(&canonical, &key_material(&key)?)?;
			if sign.is_empty() {
				bail!("Nothing to sign: canonical string is empty");
			}
			println!("{}", sign);
			Ok(())
		}
		Command::Call {
			method,
			path,
			fields,
		} => {
			let client = client(cli.config)?;
			let response = client
				.execute(method.into(), &path, &parse_fields(&fields)?)
				.await?;
			let response = client.validate_response(response)?;
			print_json(&response)
		}
		Command::Withdraw {
			request_id,
			sub_wallet_id,
			symbol,
			amount,
			address_to,
			memo,
			remark,
			sign,
		} => {
			let request = WithdrawRequest {
				request_id: request_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
				sub_wallet_id,
				symbol,
				amount,
				address_to,
				memo,
				remark,
				need_transaction_sign: sign,
				..Default::default()
			};
			info!(target: "cli", request_id = %request.request_id, "Withdrawal requested");
			let response = client(cli.config)?.withdraw(&request).await?;
			print_json(&response)
		}
		Command::Notify { input, verify } => {
			let config = CliConfig::load(cli.config.as_deref())?;
			let cipher = RsaCipher::from_pem(
				&key_material(&config.rsa_private_key)?,
				&key_material(&config.waas_public_key)?,
			)?;
			let codec = NotifyCodec::new(std::sync::Arc::new(cipher));
			let body = read_input(input)?;
			let decoded = if verify {
				codec.verify_request(&body)
			} else {
				codec.notify_request(&body)
			};
			let decoded = decoded.ok_or_else(|| anyhow!("Notification could not be decoded"))?;
			print_json(&decoded)
		}
	}
}

fn client(config_path: Option<PathBuf>) -> Result<Client> {
	let config = CliConfig::load(config_path.as_deref())?;
	let client = Client::new(config.client_config()?)?;
	info!(target: "cli", domain = %config.domain, flavor = %config.flavor, "Client ready");
	Ok(client)
}

fn keygen(bits: usize, out_dir: Option<PathBuf>) -> Result<()> {
	let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
		.with_context(|| format!("Failed to generate {}-bit RSA key", bits))?;
	let public = RsaPublicKey::from(&private);

	let private_pem = private
		.to_pkcs8_pem(LineEnding::LF)
		.context("Failed to encode private key")?;
	let public_pem = public
		.to_public_key_pem(LineEnding::LF)
		.context("Failed to encode public key")?;

	match out_dir {
		Some(dir) => {
			fs::create_dir_all(&dir)
				.with_context(|| format!("Failed to create {}", dir.display()))?;
			fs::write(dir.join("private.pem"), private_pem.as_bytes())
				.context("Failed to write private.pem")?;
			fs::write(dir.join("public.pem"), public_pem.as_bytes())
				.context("Failed to write public.pem")?;
			info!(target: "cli", dir = %dir.display(), bits, "Key pair written");
		}
		None => {
			print!("{}", private_pem.as_str());
			print!("{}", public_pem);
		}
	}
	Ok(())
}

fn read_input(path: Option<PathBuf>) -> Result<String> {
	match path {
		Some(path) => fs::read_to_string(&path)
			.with_context(|| format!("Failed to read {}", path.display())),
		None => {
			let mut buf = String::new();
			io::stdin()
				.read_to_string(&mut buf)
				.context("Failed to read stdin")?;
			Ok(buf)
		}
	}
}

fn parse_fields(raw: &str) -> Result<Map<String, Value>> {
	match serde_json::from_str(raw).context("Fields must be JSON")? {
		Value::Object(map) => Ok(map),
		_ => bail!("Fields must be a JSON object"),
	}
}

fn print_json(value: &Value) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
