use std::sync::Arc;
use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{authorize, TokenProvider};
use crate::inference::{EndpointRef, InferenceService, Instance};
use crate::utils::url::with_segments;

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: &'a [Instance],
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Value>,
}

/// Online prediction client for a hosted model endpoint.
pub struct VertexPredictor {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl VertexPredictor {
    pub fn new(client: Client, base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            tokens,
        }
    }

    fn predict_url(&self, endpoint: &EndpointRef) -> anyhow::Result<Url> {
        with_segments(
            &self.base_url,
            [
                "v1",
                "projects",
                endpoint.project_id.as_str(),
                "locations",
                endpoint.region.as_str(),
                "endpoints",
                format!("{}:predict", endpoint.endpoint_id).as_str(),
            ],
        )
    }
}

#[async_trait]
impl InferenceService for VertexPredictor {
    async fn predict(
        &self,
        endpoint: &EndpointRef,
        instances: Vec<Instance>,
    ) -> anyhow::Result<Vec<Value>> {
        let request = self
            .client
            .post(self.predict_url(endpoint)?)
            .json(&PredictRequest { instances: &instances });

        let response = authorize(request, self.tokens.as_ref())
            .await?
            .send()
            .await
            .with_context(|| format!("predict request to {} failed", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("predict on {} returned {}: {}", endpoint, status, body);
        }

        let response: PredictResponse = response.json().await?;
        Ok(response.predictions)
    }

    fn name(&self) -> &'static str {
        "vertex"
    }
}
