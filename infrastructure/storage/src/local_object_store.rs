use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use business::domain::product::errors::ProductError;
use business::domain::product::ingestion::ObjectRef;
use business::domain::product::source::PayloadSource;

/// Object storage laid out on disk as `<root>/<bucket>/<key>`.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves an object to a path under the root; keys escaping the bucket are refused.
    pub fn resolve(&self, object: &ObjectRef) -> Option<PathBuf> {
        let relative = Path::new(&object.bucket).join(&object.key);
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !contained || object.bucket.is_empty() || object.key.is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl PayloadSource for LocalObjectStore {
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, ProductError> {
        let Some(path) = self.resolve(object) else {
            tracing::warn!("Refusing object reference {}/{}", object.bucket, object.key);
            return Err(ProductError::SourceUnavailable);
        };

        tokio::fs::read(&path).await.map_err(|err| {
            tracing::error!("Failed to read object {}: {}", path.display(), err);
            ProductError::SourceUnavailable
        })
    }
}
