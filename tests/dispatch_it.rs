// crates.io
use httpmock::prelude::*;
// self
use upapi_broker::{
	_preludet::*,
	auth::CredentialKind,
	cache::MemoryCache,
	client::AppClient,
	dispatch::{CONTRACT_INFO, OperationTable},
	ops::{ContractInfoRequest, ContractStatus},
};

const BACKEND_TOKEN_BODY: &str =
	"{\"resp\":\"00\",\"msg\":\"success\",\"params\":{\"backendToken\":\"bt-1\",\"expiresIn\":7200}}";

fn info_request() -> ContractInfoRequest {
	ContractInfoRequest { open_id: "open-1".into() }
}

#[tokio::test]
async fn contract_info_decodes_payload_and_reuses_backend_token() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_test_client(test_config(&server.url("/")));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200).header("content-type", "application/json").body(BACKEND_TOKEN_BODY);
		})
		.await;
	let info_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/contract.info").header("content-type", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"resp\":\"00\",\"params\":{\"contractId\":\"X\",\"contractStatus\":\"1\"}}");
		})
		.await;
	let first = client.contract_info(&info_request()).await.expect("ContractInfo should succeed.");
	let second =
		client.contract_info(&info_request()).await.expect("Repeated ContractInfo should succeed.");

	assert_eq!(first.contract_id, "X");
	assert_eq!(first.status(), Some(ContractStatus::Opened));
	assert_eq!(first, second);

	token_mock.assert_calls_async(1).await;
	info_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn non_success_code_surfaces_platform_message() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_test_client(test_config(&server.url("/")));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200).header("content-type", "application/json").body(BACKEND_TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/contract.info");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"resp\":\"99\",\"msg\":\"bad\"}");
		})
		.await;

	let err = client.contract_info(&info_request()).await.expect_err("resp 99 should fail.");

	assert!(matches!(err, Error::Code { ref code, .. } if code == "99"));
	assert_eq!(err.to_string(), "(99)bad");
	assert_eq!(err.error_code(), "3110");
}

#[tokio::test]
async fn empty_message_falls_back_to_operation_name() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_test_client(test_config(&server.url("/")));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200).header("content-type", "application/json").body(BACKEND_TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/contract.info");
			then.status(500).header("content-type", "application/json").body("{\"resp\":\"34\"}");
		})
		.await;

	let err = client
		.request_value(CONTRACT_INFO, Map::new())
		.await
		.expect_err("resp 34 should fail even with a 500 status.");

	assert_eq!(err.to_string(), "(34)ContractInfo");
}

#[tokio::test]
async fn unknown_operation_makes_no_network_calls() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_test_client(test_config(&server.url("/")));
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200).header("content-type", "application/json").body(BACKEND_TOKEN_BODY);
		})
		.await;
	let err = client
		.request_value("Refund", Map::new())
		.await
		.expect_err("Unregistered operations should be rejected.");

	assert!(matches!(err, Error::MethodNotFound { ref name } if name == "Refund"));
	assert_eq!(err.error_code(), "3102");

	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn failed_token_acquisition_maps_to_authorization_failure() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_test_client(test_config(&server.url("/")));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"resp\":\"13\",\"msg\":\"denied\"}");
		})
		.await;

	let info_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/contract.info");
			then.status(200).header("content-type", "application/json").body("{\"resp\":\"00\"}");
		})
		.await;
	let err = client
		.contract_info(&info_request())
		.await
		.expect_err("Token issuance failure should abort the call.");

	assert!(matches!(err, Error::AuthorizationFailed { .. }));
	assert_eq!(err.error_code(), "3103");
	assert_eq!(
		StdError::source(&err).map(ToString::to_string).as_deref(),
		Some("(13)denied"),
	);
	assert!(client.tokens().peek(CredentialKind::Backend).await.is_none());

	info_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn non_json_response_is_an_unmarshal_error() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_test_client(test_config(&server.url("/")));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200).header("content-type", "application/json").body(BACKEND_TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/contract.info");
			then.status(502).body("<html>bad gateway</html>");
		})
		.await;

	let err = client
		.contract_info(&info_request())
		.await
		.expect_err("HTML bodies should not decode.");

	assert!(matches!(err, Error::Unmarshal(_)));
	assert_eq!(err.error_code(), "3105");
}

#[tokio::test]
async fn payload_shape_mismatch_is_an_unmarshal_error() {
	let server = MockServer::start_async().await;
	let (client, _cache) = build_test_client(test_config(&server.url("/")));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200).header("content-type", "application/json").body(BACKEND_TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/contract.info");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"resp\":\"00\",\"params\":{\"contractId\":42}}");
		})
		.await;

	let err = client
		.contract_info(&info_request())
		.await
		.expect_err("A numeric contractId should not decode into a string.");

	assert!(matches!(err, Error::Unmarshal(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
	let server = MockServer::start_async().await;
	let config = test_config(&server.url("/"));
	let dead = Url::parse("http://127.0.0.1:9/contract.info").expect("Dead URL should parse.");
	let operations = OperationTable::default().with_endpoint(CONTRACT_INFO, dead);
	let client = AppClient::with_operations(
		config,
		Arc::new(MemoryCache::default()),
		Arc::new(test_reqwest_http_client()),
		operations,
	)
	.expect("Client with a custom table should build.");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/backendToken");
			then.status(200).header("content-type", "application/json").body(BACKEND_TOKEN_BODY);
		})
		.await;

	let err = client
		.request_value(CONTRACT_INFO, Map::new())
		.await
		.expect_err("Connection refused should surface as a transport failure.");

	assert!(matches!(err, Error::Request(_)));
	assert_eq!(err.error_code(), "3104");
}
