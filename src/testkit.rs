//! In-memory doubles for the three backends, recording into one ordered log.

use std::sync::{Arc, Mutex};
use anyhow::anyhow;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::events::EventPublisher;
use crate::inference::{EndpointRef, InferenceService, Instance};
use crate::state::AppState;
use crate::storage::ObjectStore;

pub const BOUNDARY: &str = "tenun-test-boundary";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Write {
        bucket: String,
        key: String,
        data: Vec<u8>,
        content_type: String,
    },
    Publish {
        topic: String,
        payload: Value,
    },
    Predict {
        endpoint: String,
        instances: Vec<Instance>,
    },
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct FakeStore {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn write(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("stream closed mid-write"));
        }
        self.log.lock().unwrap().push(Call::Write {
            bucket: bucket.to_string(),
            key: key.to_string(),
            data: data.to_vec(),
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct FakePublisher {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl EventPublisher for FakePublisher {
    async fn publish(&self, topic: &str, data: &[u8]) -> anyhow::Result<Option<String>> {
        self.log.lock().unwrap().push(Call::Publish {
            topic: topic.to_string(),
            payload: serde_json::from_slice(data)?,
        });
        if self.fail {
            return Err(anyhow!("topic not found"));
        }
        Ok(Some("msg-1".to_string()))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct StubInference {
    log: CallLog,
    predictions: Option<Vec<Value>>,
}

#[async_trait]
impl InferenceService for StubInference {
    async fn predict(
        &self,
        endpoint: &EndpointRef,
        instances: Vec<Instance>,
    ) -> anyhow::Result<Vec<Value>> {
        self.log.lock().unwrap().push(Call::Predict {
            endpoint: endpoint.to_string(),
            instances,
        });
        self.predictions
            .clone()
            .ok_or_else(|| anyhow!("permission denied on endpoint"))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Builder for an `AppState` wired to the doubles above.
pub struct Harness {
    pub log: CallLog,
    store_fails: bool,
    publish_fails: bool,
    predictions: Option<Vec<Value>>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            store_fails: false,
            publish_fails: false,
            predictions: Some(Vec::new()),
        }
    }

    pub fn store_fails(mut self) -> Self {
        self.store_fails = true;
        self
    }

    pub fn publish_fails(mut self) -> Self {
        self.publish_fails = true;
        self
    }

    pub fn predictions(mut self, predictions: Vec<Value>) -> Self {
        self.predictions = Some(predictions);
        self
    }

    pub fn inference_fails(mut self) -> Self {
        self.predictions = None;
        self
    }

    pub fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.inference.endpoint_id = "test-endpoint".to_string();
        config
    }

    pub fn state(&self, config: GatewayConfig) -> Arc<AppState> {
        Arc::new(AppState::new(
            config,
            Arc::new(FakeStore {
                log: Arc::clone(&self.log),
                fail: self.store_fails,
            }),
            Arc::new(FakePublisher {
                log: Arc::clone(&self.log),
                fail: self.publish_fails,
            }),
            Arc::new(StubInference {
                log: Arc::clone(&self.log),
                predictions: self.predictions.clone(),
            }),
        ))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }
}

pub fn multipart_upload(field: &str, file_name: Option<&str>, content_type: &str, data: &[u8]) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
        None => format!("form-data; name=\"{}\"", field),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
