// rest/routes/fortune.rs — Fortune route.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::model::ModelError;
use crate::AppContext;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FortuneRequest {
    /// Model to invoke; omit for the configured default.
    pub model_id: Option<String>,
}

pub async fn tell_fortune(
    State(ctx): State<Arc<AppContext>>,
    body: Option<Json<FortuneRequest>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let req = body.map(|Json(b)| b).unwrap_or_default();

    match ctx.fortune.tell(req.model_id.as_deref()).await {
        Ok(f) => Ok(Json(json!({
            "fortune": f.fortune,
            "modelId": f.model_id,
            "timestamp": f.timestamp,
        }))),
        Err(e) => {
            error!(err = %e, "fortune generation failed");
            Err((
                error_status(&e),
                Json(json!({
                    "error": "Failed to generate fortune",
                    "details": e.to_string(),
                })),
            ))
        }
    }
}

/// A bad model id is the caller's fault; everything else is the gateway's.
fn error_status(err: &ModelError) -> StatusCode {
    match err {
        ModelError::UnsupportedModel(_) => StatusCode::BAD_REQUEST,
        ModelError::Gateway { .. } | ModelError::Http(_) | ModelError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}
