use churn_dashboard::config::toml_config::DashboardToml;
use churn_dashboard::utils::error::{DashboardError, ErrorSeverity};
use churn_dashboard::utils::logger;
use churn_dashboard::{CliConfig, LocalStorage, PresentationShell, Settings};
use clap::Parser;

fn report_failure(e: &DashboardError) -> ! {
    tracing::error!(
        "❌ Dashboard halted: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    if e.severity() == ErrorSeverity::Low {
        eprintln!("{}", e.user_friendly_message());
    } else {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    }

    std::process::exit(e.severity().exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting churn-dashboard");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並合併設定
    let file_config = match cli.config.as_deref().map(DashboardToml::from_file).transpose() {
        Ok(config) => config,
        Err(e) => report_failure(&e),
    };
    let settings = match Settings::resolve(&cli.overrides(), file_config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => report_failure(&e),
    };
    tracing::debug!("Resolved settings: {:?}", settings);

    let form = match cli.contact_form().await {
        Ok(form) => form,
        Err(e) => report_failure(&e),
    };

    let monitor_enabled = settings.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mut shell = PresentationShell::new(LocalStorage::current_dir(), settings, monitor_enabled);
    match shell.run(form).await {
        Ok(view) => {
            if let Ok(json) = serde_json::to_string(&view.report.insights.overall) {
                tracing::debug!("Overall churn: {}", json);
            }
            println!("{}", view.terminal_summary());
            println!("✅ Dashboard Loaded Successfully!");
            println!("📁 Open {} to explore the charts.", view.page_path.display());
        }
        Err(e) => report_failure(&e),
    }
}
