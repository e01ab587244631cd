use crate::config::SettingsOverrides;
use crate::core::shell::ContactForm;
use crate::utils::error::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, Clone, Parser)]
#[command(name = "churn-dashboard")]
#[command(about = "Bank customer churn dashboard: charts, insights and summary statistics")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Full name of the viewer
    #[arg(long)]
    pub name: Option<String>,

    /// Email address of the viewer
    #[arg(long)]
    pub email: Option<String>,

    /// Ask for name and email on the terminal
    #[arg(long)]
    pub prompt: bool,

    /// Dataset CSV path
    #[arg(long)]
    pub dataset: Option<String>,

    /// Contact log CSV path
    #[arg(long)]
    pub contact_log: Option<String>,

    /// Directory for chart files and dashboard.html
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Narrative text: "live" (from the data) or "canned"
    #[arg(long)]
    pub narrative: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            dataset: self.dataset.clone(),
            contact_log: self.contact_log.clone(),
            output_dir: self.output_dir.clone(),
            narrative: self.narrative.clone(),
            monitor: self.monitor,
        }
    }

    /// 命令列上的表單；`--prompt` 時缺少的欄位改由終端機輸入
    pub async fn contact_form(&self) -> Result<ContactForm> {
        let mut form = ContactForm::new(self.name.clone(), self.email.clone());
        if !self.prompt {
            return Ok(form);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        if form.name.is_none() {
            stdout.write_all(b"Full Name: ").await?;
            stdout.flush().await?;
            form.name = lines.next_line().await?;
        }
        if form.email.is_none() {
            stdout.write_all(b"Email Address: ").await?;
            stdout.flush().await?;
            form.email = lines.next_line().await?;
        }

        Ok(form)
    }
}
