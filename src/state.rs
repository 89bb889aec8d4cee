use std::sync::Arc;
use anyhow::Result;
use reqwest::Client;

use crate::auth;
use crate::config::{EventsBackend, GatewayConfig, StorageBackend};
use crate::events::{log::LogPublisher, pubsub::PubSubPublisher, EventPublisher};
use crate::inference::{vertex::VertexPredictor, EndpointRef, InferenceService};
use crate::metrics::MetricsCollector;
use crate::storage::{gcs::GcsStore, local::LocalStore, ObjectStore};

/// Process-scoped clients and settings shared by every request.
pub struct AppState {
    pub config: GatewayConfig,
    pub endpoint: EndpointRef,
    pub store: Arc<dyn ObjectStore>,
    pub publisher: Arc<dyn EventPublisher>,
    pub inference: Arc<dyn InferenceService>,
    pub metrics: MetricsCollector,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn ObjectStore>,
        publisher: Arc<dyn EventPublisher>,
        inference: Arc<dyn InferenceService>,
    ) -> Self {
        let endpoint = EndpointRef::from_config(&config.inference);
        Self {
            config,
            endpoint,
            store,
            publisher,
            inference,
            metrics: MetricsCollector::new(),
        }
    }

    /// Builds the configured backends; called once at startup.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tenun-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let tokens = auth::from_config(&config.auth, client.clone());

        let store: Arc<dyn ObjectStore> = match config.storage.backend {
            StorageBackend::Gcs => Arc::new(GcsStore::new(
                client.clone(),
                &config.storage.base_url,
                Arc::clone(&tokens),
            )),
            StorageBackend::Local => Arc::new(LocalStore::new(config.storage.local_root.clone())),
        };

        let publisher: Arc<dyn EventPublisher> = match config.events.backend {
            EventsBackend::Pubsub => Arc::new(PubSubPublisher::new(
                client.clone(),
                &config.events.base_url,
                &config.inference.project_id,
                Arc::clone(&tokens),
            )),
            EventsBackend::Log => Arc::new(LogPublisher),
        };

        let inference: Arc<dyn InferenceService> = Arc::new(VertexPredictor::new(
            client,
            &config.inference.resolved_base_url(),
            tokens,
        ));

        Ok(Self::new(config, store, publisher, inference))
    }
}
