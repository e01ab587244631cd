use crate::utils::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;

/// 資料集中的一列客戶資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: u64,
    pub credit_score: u32,
    pub country: String,
    pub gender: String,
    pub age: f64,
    pub tenure: u32,
    pub balance: f64,
    pub products_number: u32,
    pub credit_card: u8,
    pub active_member: u8,
    pub estimated_salary: f64,
    pub churn: u8,
}

/// 聯絡表單送出的內容，只會附加到紀錄檔，不會再讀回
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
}

/// 記憶體中的資料表：標頭加上原始字串列。
///
/// 欄位在使用時才解析，缺欄位會在聚合階段以 `MissingFieldError` 浮現。
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl Dataset {
    pub fn from_reader<R: Read>(source: impl Into<String>, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();
        let rows = csv_reader
            .records()
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        Ok(Self {
            source: source.into(),
            headers,
            rows,
        })
    }

    pub fn from_records(source: impl Into<String>, records: &[CustomerRecord]) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if records.is_empty() {
            writer.write_record(CUSTOMER_COLUMNS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| DashboardError::IoError(e.into_error()))?;
        Self::from_reader(source, bytes.as_slice())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DashboardError::MissingFieldError {
                column: column.to_string(),
            })
    }

    pub fn str_column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).unwrap_or_default())
            .collect())
    }

    pub fn f64_column(&self, column: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let raw = record.get(idx).unwrap_or_default();
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid_value(column, row, raw))
            })
            .collect()
    }

    /// 0/1 或 true/false 的布林欄位
    pub fn flag_column(&self, column: &str) -> Result<Vec<bool>> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let raw = record.get(idx).unwrap_or_default();
                parse_flag(raw).ok_or_else(|| invalid_value(column, row, raw))
            })
            .collect()
    }

    /// 可以完整解析為數值的欄位，依標頭順序
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| self.f64_column(h).is_ok())
            .map(|h| h.as_str())
            .collect()
    }
}

pub const CUSTOMER_COLUMNS: [&str; 12] = [
    "customer_id",
    "credit_score",
    "country",
    "gender",
    "age",
    "tenure",
    "balance",
    "products_number",
    "credit_card",
    "active_member",
    "estimated_salary",
    "churn",
];

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}

fn invalid_value(column: &str, row: usize, raw: &str) -> DashboardError {
    DashboardError::InvalidValueError {
        column: column.to_string(),
        row: row + 1,
        value: raw.to_string(),
    }
}

/// 整體流失比例，兩者相加為 100
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChurnSplit {
    pub retained_pct: f64,
    pub churned_pct: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub label: String,
    pub rate_pct: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRates {
    pub dimension: String,
    pub groups: Vec<GroupRate>,
}

impl GroupRates {
    pub fn get(&self, label: &str) -> Option<&GroupRate> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn highest(&self) -> Option<&GroupRate> {
        self.groups
            .iter()
            .max_by(|a, b| a.rate_pct.total_cmp(&b.rate_pct))
    }

    pub fn lowest(&self) -> Option<&GroupRate> {
        self.groups
            .iter()
            .min_by(|a, b| a.rate_pct.total_cmp(&b.rate_pct))
    }
}

/// 右閉區間的年齡分組：(0,30], (30,40], (40,50], (50,100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgeBucket {
    UpTo30,
    From30To40,
    From40To50,
    Over50,
}

impl AgeBucket {
    /// (0,100] 以外的年齡不屬於任何分組
    pub fn for_age(age: f64) -> Option<Self> {
        match age {
            a if a > 0.0 && a <= 30.0 => Some(AgeBucket::UpTo30),
            a if a > 30.0 && a <= 40.0 => Some(AgeBucket::From30To40),
            a if a > 40.0 && a <= 50.0 => Some(AgeBucket::From40To50),
            a if a > 50.0 && a <= 100.0 => Some(AgeBucket::Over50),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::UpTo30 => "≤30",
            AgeBucket::From30To40 => "30–40",
            AgeBucket::From40To50 => "40–50",
            AgeBucket::Over50 => "50+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryDistribution {
    pub values: Vec<f64>,
    pub bins: Vec<HistogramBin>,
    /// (x, 以筆數為尺度的密度)
    pub density: Vec<(f64, f64)>,
}

/// 一次執行所計算的五項聚合結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnInsights {
    pub overall: ChurnSplit,
    pub by_country: GroupRates,
    pub by_age: GroupRates,
    pub by_activity: GroupRates,
    pub salary: SalaryDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStatistics {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartKind {
    ChurnDistribution,
    ChurnByCountry,
    ChurnByAge,
    ChurnByActiveMember,
    SalaryDistribution,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::ChurnDistribution,
        ChartKind::ChurnByCountry,
        ChartKind::ChurnByAge,
        ChartKind::ChurnByActiveMember,
        ChartKind::SalaryDistribution,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::ChurnDistribution => "churn_distribution.svg",
            ChartKind::ChurnByCountry => "churn_rate_by_country.svg",
            ChartKind::ChurnByAge => "churn_by_age.svg",
            ChartKind::ChurnByActiveMember => "churn_by_active_member.svg",
            ChartKind::SalaryDistribution => "estimated_salary.svg",
        }
    }

    pub fn chart_title(&self) -> &'static str {
        match self {
            ChartKind::ChurnDistribution => "Churn Rate",
            ChartKind::ChurnByCountry => "Churn Rate by Country",
            ChartKind::ChurnByAge => "Churn Rate by Age Group",
            ChartKind::ChurnByActiveMember => "Churn Rate by Active Member Status",
            ChartKind::SalaryDistribution => "Estimated Salary Distribution",
        }
    }

    pub fn card_title(&self) -> &'static str {
        match self {
            ChartKind::ChurnDistribution => "1️⃣ Overall Churn Rate",
            ChartKind::ChurnByCountry => "2️⃣ Churn by Country",
            ChartKind::ChurnByAge => "3️⃣ Churn by Age Group",
            ChartKind::ChurnByActiveMember => "4️⃣ Churn by Active Member Status",
            ChartKind::SalaryDistribution => "5️⃣ Estimated Salary Distribution",
        }
    }
}

/// 已寫入輸出目錄的圖檔
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightCard {
    pub title: String,
    pub artifact: ChartArtifact,
    pub pattern: String,
    pub interpretation: String,
}

/// 摘要頁的一條重點，`topic` 以粗體顯示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInsight {
    pub topic: String,
    pub text: String,
}

impl KeyInsight {
    pub fn new(topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            text: text.into(),
        }
    }
}

/// 一次完整執行的報表內容
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub dataset: String,
    pub records: usize,
    pub features: Vec<String>,
    pub insights: ChurnInsights,
    pub summary: SummaryStatistics,
    pub cards: Vec<InsightCard>,
    pub key_insights: Vec<KeyInsight>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_bucket_boundaries_are_right_closed() {
        assert_eq!(AgeBucket::for_age(30.0), Some(AgeBucket::UpTo30));
        assert_eq!(AgeBucket::for_age(31.0), Some(AgeBucket::From30To40));
        assert_eq!(AgeBucket::for_age(40.0), Some(AgeBucket::From30To40));
        assert_eq!(AgeBucket::for_age(50.5), Some(AgeBucket::Over50));
        assert_eq!(AgeBucket::for_age(100.0), Some(AgeBucket::Over50));
        assert_eq!(AgeBucket::for_age(0.0), None);
        assert_eq!(AgeBucket::for_age(150.0), None);
    }

    #[test]
    fn test_dataset_columns_parse_lazily() {
        let csv = "country,age,churn\nFrance,42,1\nSpain,30,0\n";
        let dataset = Dataset::from_reader("inline", csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.str_column("country").unwrap(), vec!["France", "Spain"]);
        assert_eq!(dataset.f64_column("age").unwrap(), vec![42.0, 30.0]);
        assert_eq!(dataset.flag_column("churn").unwrap(), vec![true, false]);

        let err = dataset.flag_column("active_member").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::MissingFieldError { ref column } if column == "active_member"
        ));
    }

    #[test]
    fn test_invalid_flag_reports_row() {
        let csv = "churn\n1\nmaybe\n";
        let dataset = Dataset::from_reader("inline", csv.as_bytes()).unwrap();
        match dataset.flag_column("churn") {
            Err(DashboardError::InvalidValueError { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_numeric_columns_skip_text() {
        let csv = "country,age,churn\nFrance,42,1\n";
        let dataset = Dataset::from_reader("inline", csv.as_bytes()).unwrap();
        assert_eq!(dataset.numeric_columns(), vec!["age", "churn"]);
    }
}
