//! 呈現流程的狀態機：Gating → Loading → Displaying。
//!
//! 每次轉換只吃前一個狀態的產出；任何錯誤都會直接停止，不會重試也不會回到前一個狀態。

use crate::core::contact::ContactRecorder;
use crate::core::engine::DashboardEngine;
use crate::core::page::{render_html, render_terminal, PAGE_FILE_NAME};
use crate::core::pipeline::DashboardPipeline;
use crate::domain::model::{ContactEntry, DashboardReport};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{DashboardError, Result};
use std::path::PathBuf;

/// 入口表單；只要填了任一欄位就視為已送出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ContactForm {
    pub fn new(name: Option<String>, email: Option<String>) -> Self {
        Self { name, email }
    }

    pub fn is_submitted(&self) -> bool {
        self.name.is_some() || self.email.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub viewer: ContactEntry,
    pub report: DashboardReport,
    pub page_path: PathBuf,
}

impl DashboardView {
    pub fn terminal_summary(&self) -> String {
        render_terminal(&self.report, &self.viewer)
    }
}

#[derive(Debug)]
pub enum ShellState {
    Gating(ContactForm),
    Loading(ContactEntry),
    Displaying(DashboardView),
}

impl ShellState {
    pub fn name(&self) -> &'static str {
        match self {
            ShellState::Gating(_) => "gating",
            ShellState::Loading(_) => "loading",
            ShellState::Displaying(_) => "displaying",
        }
    }
}

pub struct PresentationShell<S: Storage + Clone, C: ConfigProvider> {
    recorder: ContactRecorder<S>,
    engine: DashboardEngine<DashboardPipeline<S, C>>,
    storage: S,
    output_dir: PathBuf,
}

impl<S: Storage + Clone, C: ConfigProvider> PresentationShell<S, C> {
    pub fn new(storage: S, config: C, monitor_enabled: bool) -> Self {
        let recorder = ContactRecorder::new(storage.clone(), config.contact_log_path());
        let output_dir = config.output_dir().to_path_buf();
        let pipeline = DashboardPipeline::new(storage.clone(), config);

        Self {
            recorder,
            engine: DashboardEngine::new_with_monitoring(pipeline, monitor_enabled),
            storage,
            output_dir,
        }
    }

    /// 執行單一轉換；Displaying 是終止狀態，再呼叫也不會有任何動作
    pub async fn step(&mut self, state: ShellState) -> Result<ShellState> {
        tracing::debug!("Shell state: {}", state.name());
        match state {
            ShellState::Gating(form) => {
                if !form.is_submitted() {
                    return Err(DashboardError::FormNotSubmitted);
                }
                let name = form.name.unwrap_or_default();
                let email = form.email.unwrap_or_default();
                let entry = self.recorder.record(&name, &email).await?;
                tracing::info!("✅ Details submitted successfully!");
                Ok(ShellState::Loading(entry))
            }
            ShellState::Loading(viewer) => {
                let report = self.engine.run().await?;
                let page_path = self.output_dir.join(PAGE_FILE_NAME);
                let html = render_html(&report, &viewer, chrono::Local::now());
                self.storage.write_file(&page_path, html.as_bytes()).await?;
                tracing::info!("📄 Dashboard page written to {}", page_path.display());

                Ok(ShellState::Displaying(DashboardView {
                    viewer,
                    report,
                    page_path,
                }))
            }
            displaying @ ShellState::Displaying(_) => Ok(displaying),
        }
    }

    /// 從 Gating 一路跑到 Displaying
    pub async fn run(&mut self, form: ContactForm) -> Result<DashboardView> {
        let mut state = ShellState::Gating(form);
        loop {
            state = match self.step(state).await? {
                ShellState::Displaying(view) => return Ok(view),
                next => next,
            };
        }
    }
}
