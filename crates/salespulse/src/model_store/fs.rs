//! Filesystem model store: one JSON file per category.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use salespulse_core::model_store::{model_file_name, ModelStore, Result};

/// Stores models as `forecast_sales_{category key}.json` under a
/// directory. Each write goes to its own temporary file that is renamed
/// into place, so readers never observe a half-written model and
/// concurrent writers never share a temporary path.
#[derive(Debug, Clone)]
pub struct FsModelStore {
    root: PathBuf,
}

impl FsModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, category: &str) -> PathBuf {
        self.root.join(model_file_name(category))
    }
}

#[async_trait]
impl ModelStore for FsModelStore {
    async fn save(&self, category: &str, blob: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = model_file_name(category);
        let path = self.root.join(&file_name);
        let tmp = self
            .root
            .join(format!("{file_name}.{}.tmp", Uuid::new_v4().simple()));

        let written = match tokio::fs::write(&tmp, blob).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                tracing::trace!(path = %tmp.display(), error = %cleanup, "Temporary model file not removed");
            }
            return Err(err.into());
        }

        tracing::debug!(%category, path = %path.display(), bytes = blob.len(), "Model saved");
        Ok(())
    }

    async fn load(&self, category: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(category)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn location(&self, category: &str) -> String {
        self.path_for(category).display().to_string()
    }
}
