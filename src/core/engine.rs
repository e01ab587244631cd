use crate::domain::model::DashboardReport;
use crate::domain::ports::ReportPipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 依序執行 load → aggregate → render，每個階段之間沒有共用的可變狀態
pub struct DashboardEngine<P: ReportPipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: ReportPipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&mut self) -> Result<DashboardReport> {
        tracing::info!("🚀 Building churn dashboard");

        tracing::info!("📂 Loading dataset...");
        let dataset = self.pipeline.load().await?;
        self.monitor.log_stats("Load");

        tracing::info!("🧮 Aggregating {} records...", dataset.len());
        let insights = self.pipeline.aggregate(&dataset).await?;
        self.monitor.log_stats("Aggregate");

        tracing::info!("🖼️ Rendering charts...");
        let report = self.pipeline.render(&dataset, insights).await?;
        self.monitor.log_stats("Render");

        self.monitor.log_final_stats();
        tracing::info!("✅ Dashboard built with {} insight cards", report.cards.len());
        Ok(report)
    }
}
