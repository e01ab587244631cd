pub mod aggregate;
pub mod contact;
pub mod describe;
pub mod engine;
pub mod loader;
pub mod narrative;
pub mod page;
pub mod pipeline;
pub mod render;
pub mod shell;
pub mod stats;

pub use crate::domain::model::{ChurnInsights, DashboardReport, Dataset};
pub use crate::domain::ports::{ConfigProvider, NarrativeMode, ReportPipeline, Storage};
pub use crate::utils::error::Result;
