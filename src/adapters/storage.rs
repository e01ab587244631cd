use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// 以本機目錄為根的檔案存取，絕對路徑不受根目錄影響
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }

    async fn ensure_parent(full_path: &Path) -> Result<()> {
        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        Self::ensure_parent(&full_path).await?;
        fs::write(full_path, data).await?;
        Ok(())
    }

    async fn append_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        Self::ensure_parent(&full_path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(full_path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}
