use async_trait::async_trait;

/// Durable key/blob storage addressed by bucket and key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `data` under `key`, replacing any object of the same name.
    async fn write(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}
