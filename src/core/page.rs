//! 儀表板的兩種呈現：輸出目錄中的 `dashboard.html`，以及終端機摘要。

use crate::domain::model::{ContactEntry, DashboardReport, SummaryStatistics};
use chrono::{DateTime, Local};
use std::path::Path;

pub const PAGE_FILE_NAME: &str = "dashboard.html";

const STYLE: &str = r#"
body { font-family: sans-serif; background-color: #f9f9f9; margin: 0; padding: 10px 30px; color: #222; }
h1 { margin-bottom: 0.2em; }
.about { background: #f0f2f6; border-radius: 10px; padding: 10px 20px; }
.card { display: flex; gap: 24px; border-bottom: 1px solid #ddd; padding: 16px 0; }
.card img { width: 40%; min-width: 320px; background: white; }
.card .text { flex: 1; }
table { border-collapse: collapse; background: white; }
th, td { border: 1px solid #ddd; padding: 4px 10px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
footer { text-align: center; color: gray; margin-top: 32px; }
"#;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn summary_rows(summary: &SummaryStatistics) -> Vec<(&'static str, Vec<String>)> {
    let cols = &summary.columns;
    vec![
        ("count", cols.iter().map(|c| c.count.to_string()).collect()),
        ("mean", cols.iter().map(|c| fmt_stat(c.mean)).collect()),
        ("std", cols.iter().map(|c| fmt_stat(c.std)).collect()),
        ("min", cols.iter().map(|c| fmt_stat(c.min)).collect()),
        ("25%", cols.iter().map(|c| fmt_stat(c.q25)).collect()),
        ("50%", cols.iter().map(|c| fmt_stat(c.median)).collect()),
        ("75%", cols.iter().map(|c| fmt_stat(c.q75)).collect()),
        ("max", cols.iter().map(|c| fmt_stat(c.max)).collect()),
    ]
}

/// "data/Bank Customer Churn Prediction.csv" → "Bank Customer Churn Prediction"
fn dataset_name(source: &str) -> &str {
    Path::new(source)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(source)
}

/// 產生 HTML 頁面；圖檔以檔名引用，頁面與圖檔放在同一目錄
pub fn render_html(
    report: &DashboardReport,
    viewer: &ContactEntry,
    generated_at: DateTime<Local>,
) -> String {
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>📊 Bank Customer Churn Dashboard</title>\n<style>{}</style>\n</head>\n<body>\n",
        STYLE
    );

    html.push_str("<h1>📊 Bank Customer Churn Dashboard</h1>\n");
    html.push_str(&format!(
        "<p><strong>👋 Welcome, <code>{}</code>!</strong></p>\n<p>Explore key insights into bank customer churn. Analyze churn patterns by demographics, engagement, and financial metrics to inform retention strategies.</p>\n",
        escape(&viewer.name)
    ));

    html.push_str(&format!(
        "<div class=\"about\">\n<h3>📘 About This Dashboard</h3>\n<p><strong>Dataset</strong>: {}<br><strong>Records</strong>: {} customers<br><strong>Features Analyzed</strong>: {}<br><strong>Objective</strong>: Identify factors driving customer churn and visualize patterns for strategic insights</p>\n<hr>\n<p>This dashboard provides a data-driven view of churn behavior using visualizations like churn rate, demographic breakdowns, and salary distributions.<br>📊 Use it to uncover high-risk customer segments and guide retention efforts.</p>\n<hr>\n<p>⚠️ <strong>Note</strong>: This is an evolving project. Features and accuracy are continuously being improved.</p>\n</div>\n",
        escape(dataset_name(&report.dataset)),
        report.records,
        escape(&report.features.join(", "))
    ));

    html.push_str("<section id=\"churn-analysis\">\n<h2>📈 Churn Analysis</h2>\n");
    for card in &report.cards {
        html.push_str(&format!(
            "<div class=\"card\">\n<img src=\"{}\" alt=\"{}\">\n<div class=\"text\">\n<h3>{}</h3>\n<p><strong>🔍 Pattern Observed:</strong> {}</p>\n<p><strong>💡 Interpretation:</strong> {}</p>\n</div>\n</div>\n",
            card.artifact.kind.file_name(),
            escape(card.artifact.kind.chart_title()),
            escape(&card.title),
            escape(&card.pattern),
            escape(&card.interpretation)
        ));
    }
    html.push_str("</section>\n");

    html.push_str("<section id=\"summary-statistics\">\n<h2>📊 Summary Statistics</h2>\n<h3>Dataset Overview</h3>\n<table>\n<tr><th></th>");
    for column in &report.summary.columns {
        html.push_str(&format!("<th>{}</th>", escape(&column.column)));
    }
    html.push_str("</tr>\n");
    for (stat, values) in summary_rows(&report.summary) {
        html.push_str(&format!("<tr><td>{}</td>", stat));
        for value in values {
            html.push_str(&format!("<td>{}</td>", value));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    let overall = &report.insights.overall;
    html.push_str(&format!(
        "<h3>Churn Rate</h3>\n<table>\n<tr><th>churn</th><th>%</th></tr>\n<tr><td>Retained</td><td>{:.2}</td></tr>\n<tr><td>Churned</td><td>{:.2}</td></tr>\n</table>\n",
        overall.retained_pct, overall.churned_pct
    ));

    html.push_str("<h3>Key Insights</h3>\n<ul>\n");
    for insight in &report.key_insights {
        html.push_str(&format!(
            "<li><strong>{}</strong>: {}</li>\n",
            escape(&insight.topic),
            escape(&insight.text)
        ));
    }
    html.push_str("</ul>\n</section>\n");

    html.push_str(&format!(
        "<footer>📧 Contact: support@bankchurn.com | © {} Bank Churn Analysis Dashboard | 👤 Developed by Abhishek Singh Dikhit<br>Generated {}</footer>\n</body>\n</html>\n",
        generated_at.format("%Y"),
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    html
}

/// 終端機上的精簡摘要
pub fn render_terminal(report: &DashboardReport, viewer: &ContactEntry) -> String {
    let overall = &report.insights.overall;
    let mut lines = vec![
        "📊 Bank Customer Churn Dashboard".to_string(),
        format!("👋 Welcome, {}!", viewer.name),
        format!(
            "Dataset: {} ({} customers)",
            dataset_name(&report.dataset),
            report.records
        ),
        String::new(),
        "📈 Churn Analysis".to_string(),
    ];

    for card in &report.cards {
        lines.push(format!("  {} [{}]", card.title, card.artifact.path.display()));
        lines.push(format!("    🔍 {}", card.pattern));
        lines.push(format!("    💡 {}", card.interpretation));
    }

    lines.push(String::new());
    lines.push("📊 Summary Statistics".to_string());
    lines.push(format!(
        "  Retained: {:.2}%  Churned: {:.2}%",
        overall.retained_pct, overall.churned_pct
    ));
    for insight in &report.key_insights {
        lines.push(format!("  - {}: {}", insight.topic, insight.text));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_dataset_name_strips_directory_and_extension() {
        assert_eq!(
            dataset_name("data/Bank Customer Churn Prediction.csv"),
            "Bank Customer Churn Prediction"
        );
        assert_eq!(dataset_name("inline"), "inline");
    }

    #[test]
    fn test_fmt_stat_handles_nan() {
        assert_eq!(fmt_stat(f64::NAN), "NaN");
        assert_eq!(fmt_stat(38.92), "38.92");
    }
}
