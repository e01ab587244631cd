use anyhow::Result;
use churn_dashboard::core::narrative::describe_chart;
use churn_dashboard::core::NarrativeMode;
use churn_dashboard::domain::model::{ChartKind, CustomerRecord, Dataset};
use churn_dashboard::{
    ContactForm, DashboardError, LocalStorage, PresentationShell, Settings, ShellState,
};
use tempfile::TempDir;

const DATASET: &str = "data/bank.csv";

fn customer(id: u64, country: &str, age: f64, active: u8, salary: f64, churn: u8) -> CustomerRecord {
    CustomerRecord {
        customer_id: id,
        credit_score: 600 + id as u32,
        country: country.to_string(),
        gender: if id % 2 == 0 { "Female" } else { "Male" }.to_string(),
        age,
        tenure: (id % 10) as u32,
        balance: if id % 3 == 0 { 0.0 } else { 1000.0 * id as f64 },
        products_number: 1 + (id % 3) as u32,
        credit_card: 1,
        active_member: active,
        estimated_salary: salary,
        churn,
    }
}

/// 10 筆資料，其中 2 筆流失
fn ten_customers() -> Vec<CustomerRecord> {
    vec![
        customer(1, "France", 25.0, 1, 21_000.0, 0),
        customer(2, "Spain", 33.0, 1, 48_500.0, 0),
        customer(3, "Germany", 47.0, 0, 101_000.0, 1),
        customer(4, "France", 52.0, 0, 63_250.0, 1),
        customer(5, "Spain", 29.0, 1, 12_000.0, 0),
        customer(6, "Germany", 38.0, 1, 150_000.0, 0),
        customer(7, "France", 41.0, 0, 87_700.0, 0),
        customer(8, "France", 60.0, 1, 99_999.0, 0),
        customer(9, "Spain", 35.0, 0, 75_000.0, 0),
        customer(10, "Germany", 30.0, 1, 5_500.0, 0),
    ]
}

async fn write_dataset(temp_dir: &TempDir, records: &[CustomerRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let path = temp_dir.path().join(DATASET);
    tokio::fs::create_dir_all(path.parent().unwrap()).await?;
    tokio::fs::write(path, writer.into_inner().map_err(|e| e.into_error())?).await?;
    Ok(())
}

fn shell(temp_dir: &TempDir, settings: Settings) -> PresentationShell<LocalStorage, Settings> {
    PresentationShell::new(LocalStorage::new(temp_dir.path()), settings, false)
}

fn settings() -> Settings {
    Settings::default().with_dataset_path(DATASET)
}

fn form(name: &str, email: &str) -> ContactForm {
    ContactForm::new(Some(name.to_string()), Some(email.to_string()))
}

#[tokio::test]
async fn test_end_to_end_ten_rows_two_churned() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(&temp_dir, &ten_customers()).await?;

    let view = shell(&temp_dir, settings())
        .run(form("Ada Lovelace", "ada@example.com"))
        .await?;

    let overall = view.report.insights.overall;
    assert_eq!(overall.retained_pct, 80.0);
    assert_eq!(overall.churned_pct, 20.0);
    assert_eq!(view.report.records, 10);
    assert_eq!(view.report.cards.len(), 5);

    for kind in ChartKind::ALL {
        let chart = temp_dir.path().join("plots").join(kind.file_name());
        assert!(chart.exists(), "missing {}", chart.display());
    }

    let page = tokio::fs::read_to_string(temp_dir.path().join(&view.page_path)).await?;
    assert!(page.contains("📈 Churn Analysis"));
    assert!(page.contains("📊 Summary Statistics"));
    assert!(page.contains("Ada Lovelace"));
    for kind in ChartKind::ALL {
        assert!(page.contains(kind.file_name()));
    }
    assert!(page.contains("Approximately 20.00% of customers churned"));
    assert!(page.contains("<strong>Dataset</strong>: bank<br>"));
    assert!(page.contains("This is an evolving project"));
    assert!(page.contains("📧 Contact: support@bankchurn.com"));

    let log = tokio::fs::read_to_string(temp_dir.path().join("data/user_info.csv")).await?;
    assert_eq!(log, "Name,Email\nAda Lovelace,ada@example.com\n");

    let summary = view.terminal_summary();
    assert!(summary.contains("Retained: 80.00%  Churned: 20.00%"));
    Ok(())
}

#[tokio::test]
async fn test_each_run_appends_one_contact_row() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(&temp_dir, &ten_customers()).await?;

    shell(&temp_dir, settings())
        .run(form("Ada", "ada@example.com"))
        .await?;
    shell(&temp_dir, settings())
        .run(form("Alan", "alan@example.org"))
        .await?;

    let log = tokio::fs::read_to_string(temp_dir.path().join("data/user_info.csv")).await?;
    assert_eq!(log.lines().count(), 3);
    assert_eq!(log.lines().filter(|l| *l == "Name,Email").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unsubmitted_form_halts_at_gating() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(&temp_dir, &ten_customers()).await?;

    let result = shell(&temp_dir, settings())
        .run(ContactForm::default())
        .await;

    assert!(matches!(result, Err(DashboardError::FormNotSubmitted)));
    assert!(!temp_dir.path().join("data/user_info.csv").exists());
    assert!(!temp_dir.path().join("plots").exists());
    Ok(())
}

#[tokio::test]
async fn test_invalid_email_halts_without_side_effects() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(&temp_dir, &ten_customers()).await?;

    for email in ["ada.example.com", "ada@example", "ada@example.c", "ada@example.toolong"] {
        let result = shell(&temp_dir, settings()).run(form("Ada", email)).await;
        assert!(
            matches!(result, Err(DashboardError::ValidationError { .. })),
            "{email}"
        );
    }

    let result = shell(&temp_dir, settings()).run(form("", "ada@example.com")).await;
    assert!(matches!(result, Err(DashboardError::ValidationError { .. })));

    assert!(!temp_dir.path().join("data/user_info.csv").exists());
    assert!(!temp_dir.path().join("plots").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_dataset_halts_before_charts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let stale = temp_dir.path().join("plots/churn_distribution.svg");
    tokio::fs::create_dir_all(stale.parent().unwrap()).await?;
    tokio::fs::write(&stale, "stale").await?;

    let result = shell(&temp_dir, settings())
        .run(form("Ada", "ada@example.com"))
        .await;

    assert!(matches!(
        result,
        Err(DashboardError::DatasetNotFoundError { ref path }) if path.ends_with("bank.csv")
    ));
    assert_eq!(tokio::fs::read_to_string(&stale).await?, "stale");
    assert!(!temp_dir.path().join("plots/churn_rate_by_country.svg").exists());
    assert!(!temp_dir.path().join("plots/dashboard.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_column_surfaces_at_aggregation() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join(DATASET);
    tokio::fs::create_dir_all(path.parent().unwrap()).await?;
    tokio::fs::write(&path, "country,age,active_member,estimated_salary\nFrance,30,1,100\n").await?;

    let result = shell(&temp_dir, settings())
        .run(form("Ada", "ada@example.com"))
        .await;

    assert!(matches!(
        result,
        Err(DashboardError::MissingFieldError { ref column }) if column == "churn"
    ));
    Ok(())
}

#[tokio::test]
async fn test_empty_dataset_raises_instead_of_zero_percent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join(DATASET);
    tokio::fs::create_dir_all(path.parent().unwrap()).await?;
    tokio::fs::write(&path, "country,age,active_member,estimated_salary,churn\n").await?;

    let result = shell(&temp_dir, settings())
        .run(form("Ada", "ada@example.com"))
        .await;

    assert!(matches!(result, Err(DashboardError::EmptyDatasetError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_custom_log_and_output_locations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(&temp_dir, &ten_customers()).await?;
    let settings = settings()
        .with_contact_log_path("logs/contacts.csv")
        .with_output_dir("public/report");

    let view = shell(&temp_dir, settings)
        .run(form("Ada", "ada@example.com"))
        .await?;

    assert_eq!(view.page_path, std::path::Path::new("public/report/dashboard.html"));
    assert!(temp_dir.path().join("public/report/dashboard.html").exists());
    for kind in ChartKind::ALL {
        assert!(temp_dir.path().join("public/report").join(kind.file_name()).exists());
    }
    assert!(!temp_dir.path().join("plots").exists());

    let log = tokio::fs::read_to_string(temp_dir.path().join("logs/contacts.csv")).await?;
    assert_eq!(log, "Name,Email\nAda,ada@example.com\n");
    assert!(!temp_dir.path().join("data/user_info.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_canned_narrative_keeps_original_prose() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(&temp_dir, &ten_customers()).await?;

    let view = shell(&temp_dir, settings().with_narrative(NarrativeMode::Canned))
        .run(form("Ada", "ada@example.com"))
        .await?;

    assert!(view.report.cards[0].pattern.contains("20.37%"));
    let page = tokio::fs::read_to_string(temp_dir.path().join(&view.page_path)).await?;
    assert!(page.contains("~38.9 years"));
    Ok(())
}

#[tokio::test]
async fn test_shell_steps_through_each_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(&temp_dir, &ten_customers()).await?;
    let mut shell = shell(&temp_dir, settings());

    let state = shell
        .step(ShellState::Gating(form("Ada", "ada@example.com")))
        .await?;
    assert_eq!(state.name(), "loading");

    let state = shell.step(state).await?;
    assert_eq!(state.name(), "displaying");

    // Displaying 是終止狀態
    let state = shell.step(state).await?;
    assert_eq!(state.name(), "displaying");
    Ok(())
}

#[test]
fn test_live_narrative_matches_recomputed_numbers() -> Result<()> {
    let dataset = Dataset::from_records("fixture", &ten_customers())?;
    let insights = churn_dashboard::core::aggregate::compute_insights(&dataset)?;
    let text = describe_chart(NarrativeMode::Live, ChartKind::ChurnByActiveMember, &insights);

    let inactive = insights.by_activity.get("Inactive").unwrap().rate_pct;
    assert!(text.pattern.contains(&format!("{:.2}%", inactive)));
    Ok(())
}
