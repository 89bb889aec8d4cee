use tracing::info;
use anyhow::{Context, Result};

use crate::config::GatewayConfig;
use crate::inference::EndpointRef;

pub struct StartupValidator<'a> {
    config: &'a GatewayConfig,
}

impl<'a> StartupValidator<'a> {
    pub fn new(config: &'a GatewayConfig) -> Self {
        Self { config }
    }

    pub fn validate_and_start(&self) -> Result<()> {
        info!("🔍 Starting validation");

        info!("Step 1: Checking configuration...");
        self.config.validate().context("invalid configuration")?;
        info!("✅ Configuration checked");

        info!("Step 2: Preparing storage...");
        self.config.ensure_directories()?;
        info!("✅ Storage prepared");

        self.log_summary();
        info!("🎉 Validation complete");
        Ok(())
    }

    fn log_summary(&self) {
        let config = self.config;
        info!("  Listen address: {}", config.listen_address());
        info!("  Storage:        {:?} bucket {}", config.storage.backend, config.storage.bucket);
        info!("  Events:         {:?} topic {}", config.events.backend, config.events.topic);
        info!("  Endpoint:       {}", EndpointRef::from_config(&config.inference));
        info!("  Auth:           {:?}", config.auth.mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    #[test]
    fn rejects_missing_endpoint() {
        let config = GatewayConfig::default();
        let err = StartupValidator::new(&config).validate_and_start().unwrap_err();
        assert!(format!("{:#}", err).contains("inference.endpoint_id"));
    }

    #[test]
    fn creates_local_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GatewayConfig::default();
        config.inference.endpoint_id = "1".to_string();
        config.storage.backend = StorageBackend::Local;
        config.storage.local_root = dir.path().join("objects");

        StartupValidator::new(&config).validate_and_start().unwrap();
        assert!(config.storage.local_root.is_dir());
    }
}
