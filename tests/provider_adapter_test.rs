//! 平台适配器集成测试：用 wiremock 模拟令牌端点与用户信息接口

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use oauth_gateway::binding::Provider;
use oauth_gateway::config::OAuthClientConfig;
use oauth_gateway::error::GatewayError;
use oauth_gateway::providers::{
    DiscordAdapter, GithubAdapter, GmailAdapter, ProviderAdapter, StackExchangeAdapter,
};

fn client_config(server: &MockServer) -> OAuthClientConfig {
    OAuthClientConfig {
        client_id: "client-1".to_string(),
        client_secret: "secret-1".to_string(),
        redirect_uri: "http://127.0.0.1:8080/oauth/callback".to_string(),
        token_url: Some(format!("{}/token", server.uri())),
        api_base_url: Some(server.uri()),
        ..Default::default()
    }
}

async fn mount_token(server: &MockServer, code: &str, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(format!("code={code}")))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "token_type": "bearer",
        })))
        .mount(server)
        .await;
}

fn assert_exchange_failed(err: &GatewayError, provider: Provider) {
    assert!(
        matches!(err, GatewayError::Exchange { provider: p, .. } if p == provider.as_str()),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.to_http_response_parts().1, "EXCHANGE_FAILED");
}

#[tokio::test]
async fn test_github_resolves_login() {
    let server = MockServer::start().await;
    mount_token(&server, "c1", "gho_token").await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer gho_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "login": "alice123",
            "name": "Alice",
        })))
        .mount(&server)
        .await;

    let adapter = GithubAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let claim = adapter.resolve("c1").await.unwrap();

    assert_eq!(claim.provider, Provider::Github);
    assert_eq!(claim.account_id.as_str(), "alice123");
    assert_eq!(claim.display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_github_error_body_is_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired.",
        })))
        .mount(&server)
        .await;

    let adapter = GithubAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let err = adapter.resolve("stale").await.unwrap_err();

    assert_exchange_failed(&err, Provider::Github);
    assert!(err.to_string().contains("bad_verification_code"));
}

#[tokio::test]
async fn test_discord_numeric_id_is_normalised() {
    let server = MockServer::start().await;
    mount_token(&server, "c2", "dc_token").await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", "Bearer dc_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id": 80351110224678912, "username": "nelly"}"#,
        ))
        .mount(&server)
        .await;

    let adapter = DiscordAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let claim = adapter.resolve("c2").await.unwrap();

    assert_eq!(claim.account_id.as_str(), "80351110224678912");
    assert_eq!(claim.display_name.as_deref(), Some("nelly"));
}

#[tokio::test]
async fn test_discord_profile_error_status() {
    let server = MockServer::start().await;
    mount_token(&server, "c3", "dc_token").await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "401: Unauthorized"})),
        )
        .mount(&server)
        .await;

    let adapter = DiscordAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let err = adapter.resolve("c3").await.unwrap_err();

    assert_exchange_failed(&err, Provider::Discord);
}

#[tokio::test]
async fn test_gmail_resolves_email_without_display_name() {
    let server = MockServer::start().await;
    mount_token(&server, "c4", "ya29.token").await;
    Mock::given(method("GET"))
        .and(path("/gmail/v1/users/me/profile"))
        .and(header("authorization", "Bearer ya29.token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "emailAddress": "alice@gmail.com",
            "messagesTotal": 10,
        })))
        .mount(&server)
        .await;

    let adapter = GmailAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let claim = adapter.resolve("c4").await.unwrap();

    assert_eq!(claim.provider, Provider::Gmail);
    assert_eq!(claim.account_id.as_str(), "alice@gmail.com");
    assert_eq!(claim.display_name, None);
}

#[tokio::test]
async fn test_token_endpoint_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let adapter = GmailAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let err = adapter.resolve("c5").await.unwrap_err();

    assert_exchange_failed(&err, Provider::Gmail);
}

#[tokio::test]
async fn test_stackexchange_float_account_id() {
    let server = MockServer::start().await;
    mount_token(&server, "c6", "se_token").await;
    Mock::given(method("GET"))
        .and(path("/2.3/me"))
        .and(query_param("site", "stackoverflow"))
        .and(query_param("key", "se-key"))
        .and(query_param("access_token", "se_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"items": [{"account_id": 12345.0, "display_name": "so-user"}], "has_more": false}"#,
        ))
        .mount(&server)
        .await;

    let config = OAuthClientConfig {
        api_key: Some("se-key".to_string()),
        ..client_config(&server)
    };
    let adapter = StackExchangeAdapter::new(&config, reqwest::Client::new()).unwrap();
    let claim = adapter.resolve("c6").await.unwrap();

    assert_eq!(claim.provider, Provider::StackExchange);
    assert_eq!(claim.account_id.as_str(), "12345");
    assert_eq!(claim.display_name.as_deref(), Some("so-user"));
}

#[tokio::test]
async fn test_stackexchange_error_message() {
    let server = MockServer::start().await;
    mount_token(&server, "c7", "se_token").await;
    Mock::given(method("GET"))
        .and(path("/2.3/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error_id": 403,
            "error_message": "access_token was not created with this key",
            "error_name": "access_denied",
        })))
        .mount(&server)
        .await;

    let adapter =
        StackExchangeAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let err = adapter.resolve("c7").await.unwrap_err();

    assert_exchange_failed(&err, Provider::StackExchange);
    assert!(err.to_string().contains("access_token was not created"));
}

#[tokio::test]
async fn test_stackexchange_empty_items() {
    let server = MockServer::start().await;
    mount_token(&server, "c8", "se_token").await;
    Mock::given(method("GET"))
        .and(path("/2.3/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let adapter =
        StackExchangeAdapter::new(&client_config(&server), reqwest::Client::new()).unwrap();
    let err = adapter.resolve("c8").await.unwrap_err();

    assert_exchange_failed(&err, Provider::StackExchange);
}
