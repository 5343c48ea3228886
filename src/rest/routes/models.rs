// rest/routes/models.rs — Model catalog route.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::model::{dedupe_catalog, is_invocable, should_hide};
use crate::AppContext;

pub async fn list_models(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let catalog = match ctx.gateway.list_models().await {
        Ok(models) => models,
        Err(e) => {
            error!(err = %e, "model catalog fetch failed");
            return Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Failed to list models",
                    "details": e.to_string(),
                })),
            ));
        }
    };

    let visible = dedupe_catalog(
        catalog
            .into_iter()
            .filter(|m| !should_hide(m))
            .collect(),
    );

    let list: Vec<Value> = visible
        .iter()
        .map(|m| {
            json!({
                "modelId": m.model_id,
                "modelName": m.model_name,
                "providerName": m.provider_name,
                "outputModalities": m.output_modalities,
                "responseStreamingSupported": m.response_streaming_supported,
                "invocable": is_invocable(m),
            })
        })
        .collect();

    Ok(Json(json!({ "models": list })))
}
