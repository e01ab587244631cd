use crate::core::aggregate::compute_insights;
use crate::core::describe::{describe, zero_share};
use crate::core::loader::DatasetLoader;
use crate::core::narrative::{describe_chart, key_insights};
use crate::core::render::ChartRenderer;
use crate::domain::model::{ChurnInsights, DashboardReport, Dataset, InsightCard};
use crate::domain::ports::{ConfigProvider, ReportPipeline, Storage};
use crate::utils::error::Result;

/// 報表中不列為「分析欄位」的識別欄
const IDENTIFIER_COLUMNS: [&str; 1] = ["customer_id"];
const BALANCE_COLUMN: &str = "balance";

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> ReportPipeline for DashboardPipeline<S, C> {
    async fn load(&self) -> Result<Dataset> {
        tracing::debug!("Reading dataset from {}", self.config.dataset_path().display());
        DatasetLoader::new(&self.storage)
            .load(self.config.dataset_path())
            .await
    }

    async fn aggregate(&self, dataset: &Dataset) -> Result<ChurnInsights> {
        let insights = compute_insights(dataset)?;
        tracing::debug!(
            "Churn split: retained {:.2}% / churned {:.2}%",
            insights.overall.retained_pct,
            insights.overall.churned_pct
        );
        Ok(insights)
    }

    async fn render(&self, dataset: &Dataset, insights: ChurnInsights) -> Result<DashboardReport> {
        let mode = self.config.narrative_mode();
        let renderer = ChartRenderer::new(&self.storage, self.config.output_dir());
        let artifacts = renderer.render_all(&insights).await?;

        let cards = artifacts
            .into_iter()
            .map(|artifact| {
                let narrative = describe_chart(mode, artifact.kind, &insights);
                InsightCard {
                    title: artifact.kind.card_title().to_string(),
                    artifact,
                    pattern: narrative.pattern,
                    interpretation: narrative.interpretation,
                }
            })
            .collect();

        let summary = describe(dataset)?;
        let key_insights = key_insights(
            mode,
            &insights,
            &summary,
            zero_share(dataset, BALANCE_COLUMN),
        );

        let features = dataset
            .headers()
            .iter()
            .filter(|h| !IDENTIFIER_COLUMNS.contains(&h.as_str()))
            .cloned()
            .collect();

        Ok(DashboardReport {
            dataset: dataset.source().to_string(),
            records: dataset.len(),
            features,
            insights,
            summary,
            cards,
            key_insights,
        })
    }
}
