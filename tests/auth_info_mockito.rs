use mockito::Server;
use std::sync::Arc;

use document_ai_viewer::api::auth_info::{HttpAuthInfoProvider, StaticAuthInfo};
use document_ai_viewer::api::pkce::PkceGenerator;
use document_ai_viewer::api::reauth::ReauthFlow;
use document_ai_viewer::api::store::{KeyValueStore, MemoryStore, PKCE_VERIFIER_KEY};
use document_ai_viewer::api::{AuthInfo, AuthInfoProvider};
use document_ai_viewer::ViewerError;

#[test]
fn http_provider_reads_camel_case_auth_info() {
    // Create mock server outside any tokio runtime
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/api/auth-info")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"loginUrl":"na1.my.salesforce.com","clientId":"abc"}"#)
        .create();

    let provider = HttpAuthInfoProvider::new(format!("{}/", server.url()));
    let rt = tokio::runtime::Runtime::new().unwrap();
    let info = rt.block_on(async move { provider.auth_info().await }).unwrap();
    assert_eq!(info, AuthInfo::new("na1.my.salesforce.com", "abc"));
}

#[test]
fn begin_with_http_provider_builds_url() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/api/auth-info")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"loginUrl":"https://login.salesforce.com","clientId":"cid"}"#)
        .create();

    let store = Arc::new(MemoryStore::new());
    let flow = ReauthFlow::new(PkceGenerator::default(), store.clone(), "http://localhost:5000/auth/callback");
    let provider = HttpAuthInfoProvider::new(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let req = rt.block_on(async { flow.begin_with(&provider).await }).unwrap();

    assert!(req.url.starts_with("https://login.salesforce.com/services/oauth2/authorize?response_type=code&client_id=cid&"));
    assert!(store.get(PKCE_VERIFIER_KEY).unwrap().is_some());
}

#[test]
fn unconfigured_backend_yields_auth_not_configured() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/api/auth-info")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"loginUrl":null,"clientId":null}"#)
        .create();

    let flow = ReauthFlow::new(PkceGenerator::default(), Arc::new(MemoryStore::new()), "http://localhost/cb");
    let provider = HttpAuthInfoProvider::new(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let res = rt.block_on(async { flow.begin_with(&provider).await });
    assert!(matches!(res, Err(ViewerError::AuthNotConfigured(_))));
}

#[test]
fn backend_missing_config_error_yields_auth_not_configured() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/api/auth-info")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Salesforce config missing on server"}"#)
        .create();

    let store = Arc::new(MemoryStore::new());
    let flow = ReauthFlow::new(PkceGenerator::default(), store.clone(), "http://localhost/cb");
    let provider = HttpAuthInfoProvider::new(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt.block_on(async { flow.begin_with(&provider).await }).unwrap_err();
    assert!(matches!(err, ViewerError::AuthNotConfigured(_)));
    assert!(err.needs_configuration());
    assert!(store.get(PKCE_VERIFIER_KEY).unwrap().is_none());
}

#[test]
fn backend_error_is_auth_info_error() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/api/auth-info")
        .with_status(500)
        .with_body("boom")
        .create();

    let provider = HttpAuthInfoProvider::new(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let res = rt.block_on(async move { provider.auth_info().await });
    match res {
        Err(ViewerError::AuthInfo(msg)) => assert!(msg.contains("500") && msg.contains("boom")),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn static_provider_returns_configured_info() {
    let provider = StaticAuthInfo::new(AuthInfo::new("login.salesforce.com", "abc"));
    assert!(provider.auth_info().await.unwrap().is_configured());
}
