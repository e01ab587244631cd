use crate::domain::model::Dataset;
use crate::domain::ports::Storage;
use crate::utils::error::{DashboardError, Result};
use std::path::Path;

pub struct DatasetLoader<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> DatasetLoader<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// 檔案不存在時直接失敗，沒有備援資料集
    pub async fn load(&self, path: &Path) -> Result<Dataset> {
        if !self.storage.exists(path).await {
            return Err(DashboardError::DatasetNotFoundError {
                path: path.display().to_string(),
            });
        }

        let bytes = self.storage.read_file(path).await?;
        let dataset = Dataset::from_reader(path.display().to_string(), bytes.as_slice())?;

        tracing::info!(
            "📂 Loaded {} rows ({} columns) from {}",
            dataset.len(),
            dataset.headers().len(),
            path.display()
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_dataset_fails_closed() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let err = DatasetLoader::new(&storage)
            .load(Path::new("data/absent.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::DatasetNotFoundError { .. }));
    }

    #[tokio::test]
    async fn test_load_reads_headers_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        storage
            .write_file(Path::new("data/x.csv"), b"country,churn\nFrance,1\n")
            .await
            .unwrap();

        let dataset = DatasetLoader::new(&storage)
            .load(Path::new("data/x.csv"))
            .await
            .unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.headers(), &["country".to_string(), "churn".to_string()]);
    }
}
