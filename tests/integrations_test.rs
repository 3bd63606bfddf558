//! Key Vault secrets and Airtable error wrapping against a mock HTTP server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mpt_extension_sdk::integrations::airtable::{wrap_http_error, AirTableError};
use mpt_extension_sdk::integrations::{KeyVault, KeyVaultError};

fn key_vault(server: &MockServer) -> KeyVault {
    KeyVault::with_vault_url("test-key-vault-name", server.uri(), "aad-token").unwrap()
}

#[tokio::test]
async fn test_get_secret_returns_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secrets/test-secret-name"))
        .and(query_param("api-version", "7.4"))
        .and(header("authorization", "Bearer aad-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": "mock_secret_value",
            "id": "https://test-key-vault-name.vault.azure.net/secrets/test-secret-name/1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let secret = key_vault(&server).get_secret("test-secret-name").await.unwrap();
    assert_eq!(secret.as_deref(), Some("mock_secret_value"));
}

#[tokio::test]
async fn test_missing_secret_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secrets/test-secret-name"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "SecretNotFound", "message": "Secret not found"},
        })))
        .mount(&server)
        .await;

    let secret = key_vault(&server).get_secret("test-secret-name").await.unwrap();
    assert!(secret.is_none());
}

#[tokio::test]
async fn test_get_secret_surfaces_other_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secrets/test-secret-name"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let error = key_vault(&server)
        .get_secret("test-secret-name")
        .await
        .unwrap_err();
    assert!(matches!(error, KeyVaultError::Http { status: 403, .. }));
}

#[tokio::test]
async fn test_set_secret_returns_stored_value() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/secrets/test-secret-name"))
        .and(query_param("api-version", "7.4"))
        .and(body_json(json!({"value": "mock_secret_value"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "mock_secret_value"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secrets/test-secret-name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "mock_secret_value"})))
        .expect(1)
        .mount(&server)
        .await;

    let secret = key_vault(&server)
        .set_secret("test-secret-name", "mock_secret_value")
        .await
        .unwrap();
    assert_eq!(secret.as_deref(), Some("mock_secret_value"));
}

#[tokio::test]
async fn test_set_secret_http_failure_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/secrets/test-secret-name"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "BadParameter", "message": "Request failed"},
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secrets/test-secret-name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "unused"})))
        .expect(0)
        .mount(&server)
        .await;

    let secret = key_vault(&server)
        .set_secret("test-secret-name", "mock_secret_value")
        .await
        .unwrap();
    assert!(secret.is_none());
}

#[tokio::test]
async fn test_airtable_json_failure_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/appBASE/Orders"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {"type": "INVALID_FILTER", "message": "airtable api error"},
        })))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let error = wrap_http_error(http.get(format!("{}/v0/appBASE/Orders", server.uri())).send())
        .await
        .unwrap_err();

    match &error {
        AirTableError::Api { code, message, .. } => {
            assert_eq!(*code, 422);
            assert_eq!(message, "airtable api error");
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert_eq!(error.to_string(), "422 - airtable api error");
}

#[tokio::test]
async fn test_airtable_text_failure_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/appBASE/Orders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let error = wrap_http_error(http.get(format!("{}/v0/appBASE/Orders", server.uri())).send())
        .await
        .unwrap_err();

    assert!(matches!(
        &error,
        AirTableError::Http { status: 500, content } if content == "server error"
    ));
    assert_eq!(error.to_string(), "500 - server error");
}

#[tokio::test]
async fn test_airtable_success_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/appBASE/Orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let response = wrap_http_error(http.get(format!("{}/v0/appBASE/Orders", server.uri())).send())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
