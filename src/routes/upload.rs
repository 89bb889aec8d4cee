use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use crate::error::{GatewayError, MessageBody};
use crate::events::ProcessingEvent;
use crate::state::SharedState;
use crate::storage::UploadedImage;

pub const UPLOAD_FIELD: &str = "image";
pub const UPLOAD_OK_MESSAGE: &str = "Image uploaded and processing initiated.";

/// POST /upload - store one image, then announce it on the event topic.
///
/// The event is published only after the write has succeeded. A publish
/// failure is reported as a server error even though the object is already
/// stored; nothing is rolled back or retried.
pub async fn upload_image(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageBody>, GatewayError> {
    let image = match read_image(multipart).await {
        Ok(image) => image,
        Err(err) => {
            if matches!(err, GatewayError::InvalidFormat(_) | GatewayError::MissingFile) {
                state.metrics.record_rejected();
            }
            return Err(err);
        }
    };

    let bucket = &state.config.storage.bucket;
    if let Err(err) = state
        .store
        .write(bucket, &image.file_name, &image.data, &image.content_type)
        .await
    {
        state.metrics.record_store_failure();
        return Err(GatewayError::StoreWrite(err));
    }
    info!(
        "stored {}/{} ({} bytes, {})",
        bucket,
        image.file_name,
        image.data.len(),
        image.content_type
    );

    let event = ProcessingEvent::new(&image.file_name, bucket);
    let payload = event
        .to_bytes()
        .map_err(|e| GatewayError::Internal(e.into()))?;

    let topic = &state.config.events.topic;
    match state.publisher.publish(topic, &payload).await {
        Ok(message_id) => {
            info!(
                "published event for {} to {} (message id {})",
                image.file_name,
                topic,
                message_id.as_deref().unwrap_or("-")
            );
        }
        Err(err) => {
            state.metrics.record_publish_failure();
            error!(
                "object {}/{} is stored but its event was not confirmed",
                bucket, image.file_name
            );
            return Err(GatewayError::Publish(err));
        }
    }

    state.metrics.record_upload(image.data.len() as u64);
    Ok(Json(MessageBody {
        message: UPLOAD_OK_MESSAGE,
    }))
}

async fn read_image(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedImage, GatewayError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("not a multipart request: {}", rejection.body_text());
        GatewayError::MissingFile
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(GatewayError::MissingFile),
        };
        let content_type = field.content_type().unwrap_or_default().to_string();

        // Reject before buffering the body.
        if !crate::storage::is_allowed_content_type(&content_type) {
            return Err(GatewayError::InvalidFormat(content_type));
        }

        let data = field.bytes().await.map_err(multipart_error)?.to_vec();
        return Ok(UploadedImage {
            file_name,
            content_type,
            data,
        });
    }

    Err(GatewayError::MissingFile)
}

fn multipart_error(err: MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::TooLarge
    } else {
        GatewayError::Internal(err.into())
    }
}
