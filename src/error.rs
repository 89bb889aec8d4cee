use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub const INVALID_FORMAT_MESSAGE: &str = "Invalid file format. Please upload JPEG or PNG images.";
pub const MISSING_FILE_MESSAGE: &str = "No image file provided.";
pub const TOO_LARGE_MESSAGE: &str = "Image exceeds the upload size limit.";
pub const STORE_WRITE_MESSAGE: &str = "Failed to upload image to Cloud Storage.";
pub const INTERNAL_MESSAGE: &str = "Internal server error.";
pub const INFERENCE_MESSAGE: &str = "Error during prediction.";

/// Failures surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("unsupported content type {0:?}")]
    InvalidFormat(String),

    #[error("no image file in request")]
    MissingFile,

    #[error("upload body exceeds the size limit")]
    TooLarge,

    #[error("object store write failed: {0:#}")]
    StoreWrite(#[source] anyhow::Error),

    #[error("event publish failed: {0:#}")]
    Publish(#[source] anyhow::Error),

    #[error("inference failed: {0:#}")]
    Inference(#[source] anyhow::Error),

    #[error("internal error: {0:#}")]
    Internal(#[source] anyhow::Error),
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidFormat(_) | GatewayError::MissingFile => StatusCode::BAD_REQUEST,
            GatewayError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::InvalidFormat(_) => INVALID_FORMAT_MESSAGE,
            GatewayError::MissingFile => MISSING_FILE_MESSAGE,
            GatewayError::TooLarge => TOO_LARGE_MESSAGE,
            GatewayError::StoreWrite(_) => STORE_WRITE_MESSAGE,
            GatewayError::Publish(_) | GatewayError::Internal(_) => INTERNAL_MESSAGE,
            GatewayError::Inference(_) => INFERENCE_MESSAGE,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("rejected request: {}", self);
        }
        let body = MessageBody {
            message: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
