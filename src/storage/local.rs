use tokio::fs;
use std::path::{Component, Path, PathBuf};
use anyhow::bail;
use crate::storage::ObjectStore;

/// Filesystem-backed store used for local runs; one directory per bucket.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn object_path(&self, bucket: &str, key: &str) -> anyhow::Result<PathBuf> {
        for part in [bucket, key] {
            let mut components = Path::new(part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => {}
                _ => bail!("refusing to store object at {:?}/{:?}", bucket, key),
            }
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalStore {
    async fn write(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> anyhow::Result<()> {
        let path = self.object_path(bucket, key)?;
        fs::create_dir_all(self.root.join(bucket)).await?;
        fs::write(&path, data).await?;
        tracing::debug!("wrote {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
