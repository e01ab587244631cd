pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{Settings, SettingsOverrides};

pub use adapters::LocalStorage;
pub use core::{
    engine::DashboardEngine,
    pipeline::DashboardPipeline,
    shell::{ContactForm, DashboardView, PresentationShell, ShellState},
};
pub use utils::error::{DashboardError, Result};
