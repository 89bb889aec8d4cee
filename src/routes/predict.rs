use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::GatewayError;
use crate::inference::Instance;
use crate::state::SharedState;
use crate::storage::object_uri;

pub const PREDICT_OK_MESSAGE: &str = "Prediction successful.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictBody {
    pub bucket_name: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub message: &'static str,
    pub predictions: Vec<Value>,
}

/// POST /predict - run the configured endpoint on one stored object.
///
/// The object is not checked for existence here; the inference service
/// reports a missing object like any other failure.
pub async fn predict(
    State(state): State<SharedState>,
    body: Result<Json<PredictBody>, JsonRejection>,
) -> Result<Json<PredictResponse>, GatewayError> {
    let Json(body) = body.map_err(|rejection| {
        state.metrics.record_prediction_failure();
        GatewayError::Inference(anyhow::anyhow!(
            "unreadable predict body: {}",
            rejection.body_text()
        ))
    })?;

    let instance = Instance {
        content: object_uri(
            &state.config.storage.uri_scheme,
            &body.bucket_name,
            &body.file_name,
        ),
    };
    info!("requesting prediction for {} from {}", instance.content, state.endpoint);

    let predictions = state
        .inference
        .predict(&state.endpoint, vec![instance])
        .await
        .map_err(|err| {
            state.metrics.record_prediction_failure();
            GatewayError::Inference(err)
        })?;

    state.metrics.record_prediction();
    Ok(Json(PredictResponse {
        message: PREDICT_OK_MESSAGE,
        predictions,
    }))
}
