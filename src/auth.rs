use std::sync::Arc;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use anyhow::Context;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::{AuthMode, AuthSection};

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh a cached token this long before the platform says it expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on how long a cached token is trusted, whatever `expires_in` says.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Supplies OAuth bearer tokens; credential management itself stays with the platform.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> anyhow::Result<Option<String>>;
}

pub async fn authorize(
    request: RequestBuilder,
    tokens: &dyn TokenProvider,
) -> anyhow::Result<RequestBuilder> {
    Ok(match tokens.token().await? {
        Some(token) => request.bearer_auth(token),
        None => request,
    })
}

pub fn from_config(auth: &AuthSection, client: Client) -> Arc<dyn TokenProvider> {
    match auth.mode {
        AuthMode::Metadata => Arc::new(MetadataToken::new(client, METADATA_TOKEN_URL)),
        AuthMode::Env => Arc::new(EnvToken::new(&auth.token_env)),
        AuthMode::None => Arc::new(NoToken),
    }
}

pub struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn token(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: &str) -> Self {
        Self { var: var.to_string() }
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn token(&self) -> anyhow::Result<Option<String>> {
        let token = std::env::var(&self.var)
            .with_context(|| format!("access token variable {} is not set", self.var))?;
        Ok(Some(token))
    }
}

#[derive(Deserialize)]
struct MetadataResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Token from the instance metadata server of the hosting platform.
pub struct MetadataToken {
    client: Client,
    url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataToken {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            cached: Mutex::new(None),
        }
    }
}

fn token_lifetime(expires_in: u64) -> Duration {
    Duration::from_secs(expires_in)
        .min(MAX_TOKEN_LIFETIME)
        .saturating_sub(EXPIRY_MARGIN)
}

#[async_trait]
impl TokenProvider for MetadataToken {
    async fn token(&self) -> anyhow::Result<Option<String>> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(Some(token.value.clone()));
            }
        }

        let response: MetadataResponse = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .context("metadata server unreachable")?
            .error_for_status()?
            .json()
            .await?;

        let lifetime = token_lifetime(response.expires_in);
        tracing::debug!("refreshed access token, valid for {:?}", lifetime);

        let value = response.access_token.clone();
        *cached = Some(CachedToken {
            value: response.access_token,
            refresh_at: Instant::now() + lifetime,
        });
        Ok(Some(value))
    }
}
