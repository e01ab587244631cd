use crate::core::stats::{mean, quantile_sorted, sorted, std_dev};
use crate::domain::model::{ColumnSummary, Dataset, SummaryStatistics};
use crate::utils::error::{DashboardError, Result};

/// 每個數值欄位的 count / mean / std / min / 四分位數 / max
pub fn describe(dataset: &Dataset) -> Result<SummaryStatistics> {
    if dataset.is_empty() {
        return Err(DashboardError::empty_dataset("summary statistics"));
    }

    let mut columns = Vec::new();
    for name in dataset.numeric_columns() {
        let values = dataset.f64_column(name)?;
        columns.push(summarize(name, &values));
    }

    Ok(SummaryStatistics {
        rows: dataset.len(),
        columns,
    })
}

fn summarize(column: &str, values: &[f64]) -> ColumnSummary {
    let ordered = sorted(values);
    ColumnSummary {
        column: column.to_string(),
        count: values.len(),
        mean: mean(values),
        std: std_dev(values),
        min: quantile_sorted(&ordered, 0.0),
        q25: quantile_sorted(&ordered, 0.25),
        median: quantile_sorted(&ordered, 0.5),
        q75: quantile_sorted(&ordered, 0.75),
        max: quantile_sorted(&ordered, 1.0),
    }
}

/// 餘額為零的比例 (%)，欄位不存在時回傳 None
pub fn zero_share(dataset: &Dataset, column: &str) -> Option<f64> {
    let values = dataset.f64_column(column).ok()?;
    if values.is_empty() {
        return None;
    }
    let zeros = values.iter().filter(|v| **v == 0.0).count();
    Some(zeros as f64 / values.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_numeric_columns_only() {
        let csv = "country,age,balance\nFrance,20,0\nSpain,40,100\nFrance,60,0\n";
        let ds = Dataset::from_reader("inline", csv.as_bytes()).unwrap();
        let stats = describe(&ds).unwrap();

        assert_eq!(stats.rows, 3);
        assert!(stats.column("country").is_none());

        let age = stats.column("age").unwrap();
        assert_eq!(age.count, 3);
        assert_eq!(age.mean, 40.0);
        assert_eq!(age.std, 20.0);
        assert_eq!(age.min, 20.0);
        assert_eq!(age.q25, 30.0);
        assert_eq!(age.median, 40.0);
        assert_eq!(age.max, 60.0);

        let share = zero_share(&ds, "balance").unwrap();
        assert!((share - 66.666_666).abs() < 1e-3);
        assert!(zero_share(&ds, "missing").is_none());
    }

    #[test]
    fn test_describe_empty_dataset_raises() {
        let ds = Dataset::from_reader("inline", "age\n".as_bytes()).unwrap();
        assert!(describe(&ds).is_err());
    }
}
