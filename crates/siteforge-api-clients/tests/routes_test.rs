//! HTTP contract tests: in-memory store, unconfigured adapters, oneshot.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use siteforge_api_clients::{clients_router, ClientsAppState};
use siteforge_provisioning::adapters::{
    Adapters, HttpDatastoreProvisioner, HttpDeploymentService, HttpDomainConfigurator,
    HttpIdentityBootstrapper, ProviderConfig, WebhookNotificationService,
};
use siteforge_provisioning::{
    DeprovisioningOrchestrator, ProvisioningConfig, ProvisioningOrchestrator, TemplateResolver,
};
use siteforge_store::{ClientStore, MemoryClientStore};

/// Adapters with nothing configured: every call takes the fallback path and
/// no network traffic happens.
fn unconfigured_adapters() -> Adapters {
    let timeout = Duration::from_secs(5);
    Adapters {
        datastore: Arc::new(HttpDatastoreProvisioner::new(None, timeout)),
        deployment: Arc::new(HttpDeploymentService::new(None, timeout)),
        domains: Arc::new(HttpDomainConfigurator::new(None, timeout)),
        identity: Arc::new(HttpIdentityBootstrapper::new(false, timeout)),
        notifications: Arc::new(WebhookNotificationService::new(None, timeout)),
    }
}

fn app() -> Router {
    app_with(unconfigured_adapters())
}

fn app_with(adapters: Adapters) -> Router {
    let store = Arc::new(MemoryClientStore::new());
    let config = ProvisioningConfig::default();
    let provisioner = Arc::new(ProvisioningOrchestrator::new(
        Arc::clone(&store) as Arc<dyn ClientStore>,
        adapters.clone(),
        TemplateResolver::with_defaults(),
        config.clone(),
    ));
    let deprovisioner = Arc::new(DeprovisioningOrchestrator::new(
        Arc::clone(&store) as Arc<dyn ClientStore>,
        adapters,
        config,
        provisioner.locks(),
    ));
    clients_router(ClientsAppState {
        store,
        provisioner,
        deprovisioner,
        cancel: CancellationToken::new(),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn create_body(domain: &str) -> Value {
    json!({
        "name": "Acme",
        "contactEmail": "owner@acme.nl",
        "domain": domain,
        "template": "starter",
    })
}

/// Create a client and return its id as a string.
async fn provision(app: &Router, domain: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/clients", create_body(domain)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    body["client_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_returns_placeholder_urls() {
    let app = app();
    let response = app
        .oneshot(post_json("/clients", create_body("acme-test")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(
        body["deployment_url"],
        Value::String("https://acme-test-mock.siteforge.app".to_string())
    );
    assert!(body["log"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["level"] == "fallback"));
}

#[tokio::test]
async fn test_create_validation_lists_all_fields() {
    let app = app();
    let response = app
        .oneshot(post_json(
            "/clients",
            json!({"name": "", "contactEmail": "nope", "domain": "UPPER", "template": "missing"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "contactEmail", "domain", "template"]);
}

#[tokio::test]
async fn test_create_failure_returns_partial_log() {
    // A configured datastore provider that refuses connections makes the
    // first pipeline step fail critically.
    let timeout = Duration::from_secs(5);
    let mut adapters = unconfigured_adapters();
    adapters.datastore = Arc::new(HttpDatastoreProvisioner::new(
        Some(ProviderConfig::new("http://127.0.0.1:9", "token")),
        timeout,
    ));
    let app = app_with(adapters);

    let response = app
        .clone()
        .oneshot(post_json("/clients", create_body("acme-test")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("provision-datastore"));
    // The partial audit log of the failed run is part of the response.
    let log = body["log"].as_array().unwrap();
    assert!(!log.is_empty());
    assert!(log.iter().any(|e| e["level"] == "error"));

    // Nothing was registered.
    let response = app.oneshot(get("/clients")).await.unwrap();
    assert_eq!(body_json(response).await["total"], 0);
}

#[tokio::test]
async fn test_create_duplicate_domain_is_conflict() {
    let app = app();
    provision(&app, "acme").await;

    let response = app
        .oneshot(post_json("/clients", create_body("acme")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_client_roundtrip_and_unknown() {
    let app = app();
    let id = provision(&app, "acme").await;

    let response = app.clone().oneshot(get(&format!("/clients/{id}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["domain"], "acme");
    assert_eq!(body["status"], "active");

    let response = app
        .oneshot(get(&format!("/clients/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_clients_filters_by_status() {
    let app = app();
    provision(&app, "acme").await;
    provision(&app, "beta").await;

    let response = app
        .clone()
        .oneshot(get("/clients?status=active&per_page=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["clients"].as_array().unwrap().len(), 1);

    let response = app.oneshot(get("/clients?status=suspended")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_patch_updates_plan_and_rejects_empty_body() {
    let app = app();
    let id = provision(&app, "acme").await;

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/clients/{id}"))
        .header("content-type", "application/json")
        .body(Body::from(json!({"plan": "business"}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["plan"], "business");

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/clients/{id}"))
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suspend_activate_cycle() {
    let app = app();
    let id = provision(&app, "acme").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/clients/{id}/suspend"),
            json!({"reason": "unpaid invoice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "suspended");
    assert_eq!(body["suspension_reason"], "unpaid invoice");

    // Suspending a suspended client violates the state machine.
    let response = app
        .clone()
        .oneshot(post_json(&format!("/clients/{id}/suspend"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(post_json(&format!("/clients/{id}/activate"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "active");
}

#[tokio::test]
async fn test_delete_archives_and_is_idempotent() {
    let app = app();
    let id = provision(&app, "acme").await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/clients/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert!(body["failed_steps"].as_array().unwrap().is_empty());

    // Record archived, not gone.
    let response = app.clone().oneshot(get(&format!("/clients/{id}"))).await.unwrap();
    assert_eq!(body_json(response).await["status"], "deleted");

    // Repeating teardown still succeeds.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/clients/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], Value::Bool(true));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app();
    let id = provision(&app, "acme").await;

    let response = app
        .oneshot(get(&format!("/clients/{id}/health")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "active");
    assert!(body["uptime_secs"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_deployment_history_falls_back_to_records() {
    let app = app();
    let id = provision(&app, "acme").await;

    let response = app
        .oneshot(get(&format!("/clients/{id}/deployments")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["source"], "recorded");
    let deployments = body["deployments"].as_array().unwrap();
    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments[0]["trigger"], "provision");
}

#[tokio::test]
async fn test_redeploy_without_provider_returns_mock() {
    let app = app();
    let id = provision(&app, "acme").await;

    let response = app
        .clone()
        .oneshot(post_json(&format!("/clients/{id}/redeploy"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["mock"], Value::Bool(true));
    assert_eq!(body["state"], "MOCK");

    // History now has the provision row plus the redeploy row.
    let response = app
        .oneshot(get(&format!("/clients/{id}/deployments")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["deployments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_redeploy_unknown_client_is_404() {
    let app = app();
    let response = app
        .oneshot(post_json(
            &format!("/clients/{}/redeploy", uuid::Uuid::new_v4()),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_counts_lifecycle_states() {
    let app = app();
    let a = provision(&app, "acme").await;
    provision(&app, "beta").await;

    app.clone()
        .oneshot(post_json(&format!("/clients/{a}/suspend"), json!({})))
        .await
        .unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_clients"], 2);
    assert_eq!(body["active"], 1);
    assert_eq!(body["suspended"], 1);
}
