pub mod pubsub;
pub mod log;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Notification that an image has been stored and is ready for processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingEvent {
    pub file_name: String,
    pub bucket_name: String,
}

impl ProcessingEvent {
    pub fn new(file_name: &str, bucket_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            bucket_name: bucket_name.to_string(),
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Publish/subscribe topic client. Publishing does not wait for subscribers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one message and returns the id assigned to it, if any.
    async fn publish(&self, topic: &str, data: &[u8]) -> anyhow::Result<Option<String>>;

    fn name(&self) -> &'static str;
}
