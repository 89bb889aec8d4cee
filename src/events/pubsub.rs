use std::sync::Arc;
use anyhow::{bail, Context};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::auth::{authorize, TokenProvider};
use crate::events::EventPublisher;
use crate::utils::url::with_segments;

#[derive(Serialize)]
struct PublishRequest {
    messages: Vec<PubsubMessage>,
}

#[derive(Serialize)]
struct PubsubMessage {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Pub/Sub REST publisher for topics in a single project.
pub struct PubSubPublisher {
    client: Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl PubSubPublisher {
    pub fn new(
        client: Client,
        base_url: &str,
        project_id: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            project_id: project_id.to_string(),
            tokens,
        }
    }

    fn publish_url(&self, topic: &str) -> anyhow::Result<Url> {
        with_segments(
            &self.base_url,
            [
                "v1",
                "projects",
                self.project_id.as_str(),
                "topics",
                format!("{}:publish", topic).as_str(),
            ],
        )
    }

    fn request_body(data: &[u8]) -> PublishRequest {
        PublishRequest {
            messages: vec![PubsubMessage {
                data: base64::engine::general_purpose::STANDARD.encode(data),
            }],
        }
    }
}

#[async_trait]
impl EventPublisher for PubSubPublisher {
    async fn publish(&self, topic: &str, data: &[u8]) -> anyhow::Result<Option<String>> {
        let request = self
            .client
            .post(self.publish_url(topic)?)
            .json(&Self::request_body(data));

        let response = authorize(request, self.tokens.as_ref())
            .await?
            .send()
            .await
            .context("publish request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("publish to {} returned {}: {}", topic, status, body);
        }

        let published: PublishResponse = response.json().await?;
        Ok(published.message_ids.into_iter().next())
    }

    fn name(&self) -> &'static str {
        "pubsub"
    }
}
