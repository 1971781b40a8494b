//! Integration tests for the envelope client
//!
//! These tests verify:
//! - Wire format (only app_id and data, form body vs query string)
//! - Payload injection (time, charset)
//! - Response decryption and plaintext fallback
//! - Transport error mapping

use custody_sdk::{ApiFlavor, Client, ClientConfig, ClientError};
use serde_json::{Map, Value, json};
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{method, path, query_param},
};

mod common;
use common::{APP_ID, CLIENT, SERVER, envelope_of, mpc_config, open_request, sealed_response};

fn fields(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		_ => panic!("expected object"),
	}
}

#[tokio::test]
async fn test_post_sends_only_app_id_and_data() {
	let server = MockServer::start().await;
	let reply = json!({"code": "0", "msg": "success", "data": {"uid": 1001}});
	Mock::given(method("POST"))
		.and(path("/api/mpc/wallet/create"))
		.respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(&reply)))
		.expect(1)
		.mount(&server)
		.await;

	let client = Client::new(mpc_config(&server.uri())).unwrap();
	let response = client
		.post(
			"/api/mpc/wallet/create",
			&fields(json!({"sub_wallet_name": "ops", "app_show_status": 1})),
		)
		.await
		.unwrap();
	assert_eq!(response, reply);

	let requests = server.received_requests().await.unwrap();
	assert_eq!(requests.len(), 1);
	let content_type = requests[0].headers.get("content-type").unwrap();
	assert_eq!(content_type, "application/x-www-form-urlencoded");

	let envelope = envelope_of(&requests[0]);
	let mut keys: Vec<_> = envelope.keys().cloned().collect();
	keys.sort();
	assert_eq!(keys, vec!["app_id", "data"]);
	assert_eq!(envelope["app_id"], APP_ID);

	let payload = open_request(&requests[0]);
	assert_eq!(payload["sub_wallet_name"], "ops");
	assert_eq!(payload["app_show_status"], 1);
	assert_eq!(payload["charset"], "utf-8");
	assert!(payload["time"].as_i64().unwrap() > 1_600_000_000_000);
}

#[tokio::test]
async fn test_get_sends_envelope_as_query() {
	let server = MockServer::start().await;
	let reply = json!({"code": "0", "data": []});
	Mock::given(method("GET"))
		.and(path("/api/mpc/billing/sync_deposit_list"))
		.and(query_param("app_id", APP_ID))
		.respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(&reply)))
		.expect(1)
		.mount(&server)
		.await;

	let client = Client::new(mpc_config(&server.uri())).unwrap();
	let response = client.sync_deposit_records(7).await.unwrap();
	assert_eq!(response, reply);

	let requests = server.received_requests().await.unwrap();
	assert!(requests[0].body.is_empty());
	let payload = open_request(&requests[0]);
	assert_eq!(payload["max_id"], 7);
}

#[tokio::test]
async fn test_plaintext_error_envelope_passes_through() {
	let server = MockServer::start().await;
	let error = json!({"code": "100004", "msg": "app_id not found", "data": "not encrypted"});
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_json(error.clone()))
		.mount(&server)
		.await;

	let client = Client::new(mpc_config(&server.uri())).unwrap();
	let response = client.post("/api/mpc/any", &Map::new()).await.unwrap();
	assert_eq!(response, error);
}

#[tokio::test]
async fn test_strict_decrypt_surfaces_failure() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(
			ResponseTemplate::new(200).set_body_json(json!({"code": "1", "data": "garbage"})),
		)
		.mount(&server)
		.await;

	let config = ClientConfig::builder()
		.domain(format!("{}/", server.uri()))
		.app_id(APP_ID)
		.rsa_private_key(CLIENT.pkcs1_pem.as_str())
		.waas_public_key(SERVER.public_pem.as_str())
		.strict_decrypt(true)
		.build()
		.unwrap();
	let client = Client::new(config).unwrap();
	let err = client.post("/api/mpc/any", &Map::new()).await.unwrap_err();
	assert!(matches!(err, ClientError::Envelope(_)));
}

#[tokio::test]
async fn test_response_without_string_data_is_unchanged() {
	let server = MockServer::start().await;
	let body = json!({"code": 0, "msg": "ok", "data": {"plain": true}});
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
		.mount(&server)
		.await;

	let client = Client::new(mpc_config(&server.uri())).unwrap();
	let response = client.get("/api/mpc/any", &Map::new()).await.unwrap();
	assert_eq!(response, body);
}

#[tokio::test]
async fn test_non_200_status_is_server_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
		.mount(&server)
		.await;

	let client = Client::new(mpc_config(&server.uri())).unwrap();
	let err = client.post("/api/mpc/any", &Map::new()).await.unwrap_err();
	match err {
		ClientError::Server(message) => {
			assert!(message.starts_with("502"));
			assert!(message.ends_with("bad gateway"));
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[tokio::test]
async fn test_non_json_body_is_serialization_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
		.mount(&server)
		.await;

	let client = Client::new(mpc_config(&server.uri())).unwrap();
	let err = client.post("/api/mpc/any", &Map::new()).await.unwrap_err();
	assert!(matches!(err, ClientError::Serialization(_)));
}

#[tokio::test]
async fn test_custody_flavor_prefixes_version_and_checks_code() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/user/info"))
		.respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(&json!({
			"code": "0",
			"msg": "ok",
			"data": {"uid": 42}
		}))))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/v1/user/missing"))
		.respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(&json!({
			"code": "110",
			"msg": "user not found"
		}))))
		.mount(&server)
		.await;

	let config = ClientConfig::builder()
		.domain(format!("{}/", server.uri()))
		.app_id(APP_ID)
		.rsa_private_key(CLIENT.pkcs1_pem.as_str())
		.waas_public_key(SERVER.public_pem.as_str())
		.flavor(ApiFlavor::Custody)
		.build()
		.unwrap();
	let client = Client::new(config).unwrap();

	let response = client.get("/user/info", &Map::new()).await.unwrap();
	assert_eq!(client.validate_response(response).unwrap(), json!({"uid": 42}));

	let response = client.get("/user/missing", &Map::new()).await.unwrap();
	let err = client.validate_response(response).unwrap_err();
	assert_eq!(err.to_string(), "API Error [110]: user not found");
}
