use std::sync::Arc;
use anyhow::{bail, Context};
use reqwest::{Client, Url};

use crate::auth::{authorize, TokenProvider};
use crate::storage::ObjectStore;
use crate::utils::url::with_segments;

/// Cloud Storage JSON API backend using single-request media uploads.
pub struct GcsStore {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GcsStore {
    pub fn new(client: Client, base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            tokens,
        }
    }

    fn upload_url(&self, bucket: &str, key: &str) -> anyhow::Result<Url> {
        let mut url = with_segments(
            &self.base_url,
            ["upload", "storage", "v1", "b", bucket, "o"],
        )?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ObjectStore for GcsStore {
    async fn write(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> anyhow::Result<()> {
        let request = self
            .client
            .post(self.upload_url(bucket, key)?)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data.to_vec());

        let response = authorize(request, self.tokens.as_ref())
            .await?
            .send()
            .await
            .context("storage request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("storage write of {}/{} returned {}: {}", bucket, key, status, body);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gcs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoToken;

    fn store(base: &str) -> GcsStore {
        GcsStore::new(Client::new(), base, Arc::new(NoToken))
    }

    #[test]
    fn upload_url_targets_media_endpoint() {
        let url = store("https://storage.googleapis.com/")
            .upload_url("tenun-image", "photo.png")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/upload/storage/v1/b/tenun-image/o?uploadType=media&name=photo.png"
        );
    }

    #[test]
    fn object_name_is_query_encoded() {
        let url = store("http://localhost:4443/")
            .upload_url("b", "my photo&1.jpg")
            .unwrap();
        let name = url
            .query_pairs()
            .find(|(k, _)| k == "name")
            .map(|(_, v)| v.into_owned());
        assert_eq!(name.as_deref(), Some("my photo&1.jpg"));
    }
}
