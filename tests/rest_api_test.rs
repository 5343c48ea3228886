//! REST surface tests.
//!
//! Spins up the real axum server on a random port with a stub gateway
//! behind it and exercises each route over HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use fortuned::config::ServiceConfig;
use fortuned::model::{ModelError, ModelGateway, ModelSummary};
use fortuned::{rest, AppContext};

/// Find a free local port by binding to port 0.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

struct StubGateway {
    invoke_response: Result<Value, u16>,
    catalog: Vec<ModelSummary>,
}

#[async_trait]
impl ModelGateway for StubGateway {
    async fn invoke(&self, _model_id: &str, _body: Value) -> Result<Value, ModelError> {
        match &self.invoke_response {
            Ok(v) => Ok(v.clone()),
            Err(status) => Err(ModelError::Gateway {
                status: *status,
                body: "upstream unhappy".to_string(),
            }),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, ModelError> {
        Ok(self.catalog.clone())
    }
}

/// Start the server on a random port and wait until it accepts connections.
async fn start_test_server(dir: &TempDir, gateway: StubGateway) -> String {
    let port = find_free_port();
    let config = ServiceConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
    );
    let ctx = Arc::new(AppContext::new(config, Arc::new(gateway)));
    tokio::spawn(rest::start_rest_server(ctx));

    let addr = format!("127.0.0.1:{port}");
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(&addr).await.is_ok() {
            return format!("http://{addr}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server did not come up on {addr}");
}

fn catalog_entry(id: &str, status: &str) -> ModelSummary {
    serde_json::from_value(json!({
        "modelId": id,
        "modelName": id,
        "providerName": "x",
        "inputModalities": ["TEXT"],
        "outputModalities": ["TEXT"],
        "inferenceTypesSupported": ["ON_DEMAND"],
        "responseStreamingSupported": true,
        "modelLifecycle": { "status": status },
    }))
    .unwrap()
}

// ─── Routes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok_and_default_model() {
    let dir = TempDir::new().unwrap();
    let base = start_test_server(
        &dir,
        StubGateway {
            invoke_response: Ok(json!({})),
            catalog: Vec::new(),
        },
    )
    .await;

    let body: Value = reqwest::get(format!("{base}/api/v1/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["default_model"], "deepseek.r1-v1:0");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn fortune_route_returns_the_extracted_fortune() {
    let dir = TempDir::new().unwrap();
    let base = start_test_server(
        &dir,
        StubGateway {
            invoke_response: Ok(json!({
                "choices": [{
                    "text": "<think>hm</think><fortune>Fortune favors the rested.</fortune>",
                }],
            })),
            catalog: Vec::new(),
        },
    )
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/v1/fortune"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fortune"], "Fortune favors the rested.");
    assert_eq!(body["modelId"], "deepseek.r1-v1:0");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn fortune_route_maps_gateway_failures_to_502() {
    let dir = TempDir::new().unwrap();
    let base = start_test_server(
        &dir,
        StubGateway {
            invoke_response: Err(500),
            catalog: Vec::new(),
        },
    )
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/v1/fortune"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 502);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Failed to generate fortune");
}

#[tokio::test]
async fn fortune_route_rejects_unknown_models_with_400() {
    let dir = TempDir::new().unwrap();
    let base = start_test_server(
        &dir,
        StubGateway {
            invoke_response: Ok(json!({})),
            catalog: Vec::new(),
        },
    )
    .await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/v1/fortune"))
        .json(&json!({ "modelId": "acme.oracle-v1:0" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn models_route_hides_and_dedupes_then_flags_invocability() {
    let dir = TempDir::new().unwrap();
    let base = start_test_server(
        &dir,
        StubGateway {
            invoke_response: Ok(json!({})),
            catalog: vec![
                catalog_entry("deepseek.r1-v1:0", "ACTIVE"),
                catalog_entry("deepseek.r1-v1:1", "ACTIVE"),
                catalog_entry("cohere.command-r-v1:0", "ACTIVE"),
                catalog_entry("amazon.titan-text-express-v1", "LEGACY"),
            ],
        },
    )
    .await;

    let body: Value = reqwest::get(format!("{base}/api/v1/models"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["modelId"], "deepseek.r1-v1:0");
    assert_eq!(models[0]["invocable"], true);
    // Unknown family stays listed but is not invocable.
    assert_eq!(models[1]["modelId"], "cohere.command-r-v1:0");
    assert_eq!(models[1]["invocable"], false);
}

#[tokio::test]
async fn unknown_paths_get_a_named_404() {
    let dir = TempDir::new().unwrap();
    let base = start_test_server(
        &dir,
        StubGateway {
            invoke_response: Ok(json!({})),
            catalog: Vec::new(),
        },
    )
    .await;

    let resp = reqwest::get(format!("{base}/api/v1/nope")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let body: Value = resp.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("/api/v1/nope"));
}
