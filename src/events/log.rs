use async_trait::async_trait;
use tracing::info;

use crate::events::EventPublisher;

/// Writes events to the log instead of a topic; used for local runs.
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, topic: &str, data: &[u8]) -> anyhow::Result<Option<String>> {
        info!(topic, payload = %String::from_utf8_lossy(data), "event published");
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
