use crate::domain::model::{ChurnInsights, Dataset, DashboardReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// 覆寫整個檔案，必要時建立上層目錄
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 附加到檔案尾端，必要時建立上層目錄
    fn append_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrativeMode {
    /// 由本次計算結果產生文字
    #[default]
    Live,
    /// 原始儀表板寫死的文字
    Canned,
}

impl NarrativeMode {
    pub const NAMES: [&'static str; 2] = ["live", "canned"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(NarrativeMode::Live),
            "canned" => Some(NarrativeMode::Canned),
            _ => None,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn dataset_path(&self) -> &Path;
    fn contact_log_path(&self) -> &Path;
    fn output_dir(&self) -> &Path;
    fn narrative_mode(&self) -> NarrativeMode;
}

#[async_trait]
pub trait ReportPipeline: Send + Sync {
    async fn load(&self) -> Result<Dataset>;
    async fn aggregate(&self, dataset: &Dataset) -> Result<ChurnInsights>;
    async fn render(&self, dataset: &Dataset, insights: ChurnInsights) -> Result<DashboardReport>;
}
