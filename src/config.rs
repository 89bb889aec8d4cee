use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::{bail, Result};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONFIG_FILE: &str = "gateway.toml";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub events: EventsSection,
    pub inference: InferenceSection,
    pub auth: AuthSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Gcs,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: StorageBackend,
    pub bucket: String,
    pub base_url: String,
    pub local_root: PathBuf,
    /// Scheme of the object URI handed to the inference service.
    pub uri_scheme: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Gcs,
            bucket: "tenun-image".to_string(),
            base_url: "https://storage.googleapis.com/".to_string(),
            local_root: PathBuf::from("./data"),
            uri_scheme: "gs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventsBackend {
    Pubsub,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSection {
    pub backend: EventsBackend,
    pub topic: String,
    pub base_url: String,
}

impl Default for EventsSection {
    fn default() -> Self {
        Self {
            backend: EventsBackend::Pubsub,
            topic: "image-processing-topic".to_string(),
            base_url: "https://pubsub.googleapis.com/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSection {
    pub project_id: String,
    pub region: String,
    pub endpoint_id: String,
    pub base_url: Option<String>,
}

impl Default for InferenceSection {
    fn default() -> Self {
        Self {
            project_id: "tenunsense".to_string(),
            region: "asia-southeast2".to_string(),
            endpoint_id: String::new(),
            base_url: None,
        }
    }
}

impl InferenceSection {
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}-aiplatform.googleapis.com/", self.region),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Metadata,
    Env,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub mode: AuthMode,
    pub token_env: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            mode: AuthMode::Metadata,
            token_env: "GOOGLE_OAUTH_ACCESS_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Reads the config file when it exists, otherwise falls back to defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config_file = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

        if Path::new(config_file).exists() {
            let content = std::fs::read_to_string(config_file)?;
            let config: GatewayConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, config_path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Applies the recognized environment variables on top of the file values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT {:?}: {}", port, e))?;
        }
        if let Some(bucket) = lookup("STORAGE_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Some(topic) = lookup("EVENT_TOPIC") {
            self.events.topic = topic;
        }
        if let Some(project) = lookup("GOOGLE_CLOUD_PROJECT") {
            self.inference.project_id = project;
        }
        if let Some(region) = lookup("INFERENCE_REGION") {
            self.inference.region = region;
        }
        if let Some(endpoint) = lookup("INFERENCE_ENDPOINT_ID") {
            self.inference.endpoint_id = endpoint;
        }
        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        if self.server.max_upload_bytes == 0 {
            bail!("server.max_upload_bytes must be non-zero");
        }

        let identifiers = [
            ("storage.bucket", &self.storage.bucket),
            ("events.topic", &self.events.topic),
            ("inference.project_id", &self.inference.project_id),
            ("inference.region", &self.inference.region),
            ("inference.endpoint_id", &self.inference.endpoint_id),
        ];
        for (field, value) in identifiers {
            if value.trim().is_empty() {
                bail!("{} must be set", field);
            }
            if value.contains('/') {
                bail!("{} must not contain '/': {:?}", field, value);
            }
        }

        if self.storage.uri_scheme.is_empty()
            || !self.storage.uri_scheme.chars().all(|c| c.is_ascii_alphanumeric())
        {
            bail!("storage.uri_scheme must be alphanumeric: {:?}", self.storage.uri_scheme);
        }

        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::Local && !self.storage.local_root.exists() {
            std::fs::create_dir_all(&self.storage.local_root)?;
            tracing::info!("Created local storage root: {:?}", self.storage.local_root);
        }
        Ok(())
    }
}
