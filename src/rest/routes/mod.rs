pub mod fortune;
pub mod health;
pub mod models;

use axum::http::{StatusCode, Uri};
use axum::Json;
use serde_json::{json, Value};

/// Catch-all for unknown paths: a JSON 404 naming what missed.
pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{uri} not found") })),
    )
}
