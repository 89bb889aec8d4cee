pub mod vertex;

use std::fmt;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::InferenceSection;

/// Deployed model address: `projects/<p>/locations/<r>/endpoints/<e>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRef {
    pub project_id: String,
    pub region: String,
    pub endpoint_id: String,
}

impl EndpointRef {
    pub fn from_config(inference: &InferenceSection) -> Self {
        Self {
            project_id: inference.project_id.clone(),
            region: inference.region.clone(),
            endpoint_id: inference.endpoint_id.clone(),
        }
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/endpoints/{}",
            self.project_id, self.region, self.endpoint_id
        )
    }
}

/// One unit of input; `content` is the storage URI of the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub content: String,
}

#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Returns the prediction records exactly as the service produced them.
    async fn predict(
        &self,
        endpoint: &EndpointRef,
        instances: Vec<Instance>,
    ) -> anyhow::Result<Vec<Value>>;

    fn name(&self) -> &'static str;
}
