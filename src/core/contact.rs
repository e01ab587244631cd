use crate::domain::model::ContactEntry;
use crate::domain::ports::Storage;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{validate_email, validate_required_field};
use std::path::PathBuf;

/// 驗證聯絡資料並附加到 `Name,Email` 紀錄檔
pub struct ContactRecorder<S: Storage> {
    storage: S,
    log_path: PathBuf,
}

impl<S: Storage> ContactRecorder<S> {
    pub fn new(storage: S, log_path: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            log_path: log_path.into(),
        }
    }

    pub fn validate(name: &str, email: &str) -> Result<ContactEntry> {
        validate_required_field("name", name)?;
        validate_required_field("email", email)?;
        validate_email("email", email)?;

        Ok(ContactEntry {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        })
    }

    /// 驗證失敗時不會寫入任何東西
    pub async fn record(&self, name: &str, email: &str) -> Result<ContactEntry> {
        let entry = Self::validate(name, email)?;

        let is_new = !self.storage.exists(&self.log_path).await;
        let row = encode_row(&entry, is_new)?;
        self.storage.append_file(&self.log_path, &row).await?;

        tracing::info!(
            "📝 Recorded contact for {} in {}",
            entry.name,
            self.log_path.display()
        );
        Ok(entry)
    }
}

fn encode_row(entry: &ContactEntry, with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer.serialize(entry)?;
    writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use tempfile::TempDir;

    fn recorder(temp_dir: &TempDir) -> ContactRecorder<LocalStorage> {
        ContactRecorder::new(LocalStorage::new(temp_dir.path()), "data/user_info.csv")
    }

    async fn log_contents(temp_dir: &TempDir) -> String {
        tokio::fs::read_to_string(temp_dir.path().join("data/user_info.csv"))
            .await
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_first_record_writes_header() {
        let temp_dir = TempDir::new().unwrap();
        let recorder = recorder(&temp_dir);

        recorder.record("Ada Lovelace", "ada@example.com").await.unwrap();
        recorder.record("Alan Turing", "alan@example.org").await.unwrap();

        assert_eq!(
            log_contents(&temp_dir).await,
            "Name,Email\nAda Lovelace,ada@example.com\nAlan Turing,alan@example.org\n"
        );
    }

    #[tokio::test]
    async fn test_names_with_commas_are_quoted() {
        let temp_dir = TempDir::new().unwrap();
        recorder(&temp_dir)
            .record("Doe, Jane", "jane@doe.net")
            .await
            .unwrap();

        assert!(log_contents(&temp_dir).await.contains("\"Doe, Jane\",jane@doe.net"));
    }

    #[tokio::test]
    async fn test_invalid_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let recorder = recorder(&temp_dir);

        assert!(recorder.record("", "ada@example.com").await.is_err());
        assert!(recorder.record("Ada", "").await.is_err());
        assert!(recorder.record("Ada", "ada.example.com").await.is_err());
        assert!(recorder.record("Ada", "ada@example").await.is_err());

        assert!(!temp_dir.path().join("data/user_info.csv").exists());
    }

    #[test]
    fn test_validate_trims_input() {
        let entry =
            ContactRecorder::<LocalStorage>::validate("  Ada ", " ada@example.com ").unwrap();
        assert_eq!(entry.name, "Ada");
        assert_eq!(entry.email, "ada@example.com");
    }
}
