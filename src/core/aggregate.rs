//! 五項流失分析聚合。
//!
//! 每個函式只讀取資料表，沒有共享的可變狀態，執行順序不影響結果。
//! 空資料表一律回傳 `EmptyDatasetError`，不會把除以零當成 0%。

use crate::core::stats::{quantile_sorted, round2, sorted, std_dev};
use crate::domain::model::{
    AgeBucket, ChurnInsights, ChurnSplit, Dataset, GroupRate, GroupRates, HistogramBin,
    SalaryDistribution,
};
use crate::utils::error::{DashboardError, Result};
use std::collections::HashMap;
use std::hash::Hash;

pub const CHURN_COLUMN: &str = "churn";
pub const COUNTRY_COLUMN: &str = "country";
pub const AGE_COLUMN: &str = "age";
pub const ACTIVE_MEMBER_COLUMN: &str = "active_member";
pub const SALARY_COLUMN: &str = "estimated_salary";

const KDE_GRID_POINTS: usize = 200;
/// 超過此數量時改用 Sturges 寬度
const MAX_HISTOGRAM_BINS: usize = 1_000;

fn require_rows(dataset: &Dataset, aggregation: &str) -> Result<()> {
    if dataset.is_empty() {
        return Err(DashboardError::empty_dataset(aggregation));
    }
    Ok(())
}

pub fn overall_churn(dataset: &Dataset) -> Result<ChurnSplit> {
    require_rows(dataset, "overall churn rate")?;
    let churn = dataset.flag_column(CHURN_COLUMN)?;

    let churned = churn.iter().filter(|c| **c).count();
    let churned_pct = round2(churned as f64 / churn.len() as f64 * 100.0);

    Ok(ChurnSplit {
        retained_pct: round2(100.0 - churned_pct),
        churned_pct,
        rows: churn.len(),
    })
}

pub fn churn_by_country(dataset: &Dataset) -> Result<GroupRates> {
    require_rows(dataset, "churn rate by country")?;
    let churn = dataset.flag_column(CHURN_COLUMN)?;
    let countries = dataset.str_column(COUNTRY_COLUMN)?;

    let groups = group_rates(countries.into_iter().map(Some), &churn)
        .into_iter()
        .map(|(country, churned, rows)| rate(country.to_string(), churned, rows))
        .collect();

    Ok(GroupRates {
        dimension: COUNTRY_COLUMN.to_string(),
        groups,
    })
}

/// (0,100] 以外的年齡不進入任何分組，只是被排除，不算錯誤
pub fn churn_by_age(dataset: &Dataset) -> Result<GroupRates> {
    require_rows(dataset, "churn rate by age group")?;
    let churn = dataset.flag_column(CHURN_COLUMN)?;
    let ages = dataset.f64_column(AGE_COLUMN)?;

    let dropped = ages.iter().filter(|a| AgeBucket::for_age(**a).is_none()).count();
    if dropped > 0 {
        tracing::debug!("Excluded {} rows with age outside (0, 100]", dropped);
    }

    let mut buckets = group_rates(ages.iter().map(|a| AgeBucket::for_age(*a)), &churn);
    buckets.sort_by_key(|(bucket, _, _)| *bucket);

    Ok(GroupRates {
        dimension: "age_group".to_string(),
        groups: buckets
            .into_iter()
            .map(|(bucket, churned, rows)| rate(bucket.label().to_string(), churned, rows))
            .collect(),
    })
}

pub fn churn_by_activity(dataset: &Dataset) -> Result<GroupRates> {
    require_rows(dataset, "churn rate by active member status")?;
    let churn = dataset.flag_column(CHURN_COLUMN)?;
    let active = dataset.flag_column(ACTIVE_MEMBER_COLUMN)?;

    let mut groups = group_rates(active.into_iter().map(Some), &churn);
    groups.sort_by_key(|(flag, _, _)| *flag);

    Ok(GroupRates {
        dimension: ACTIVE_MEMBER_COLUMN.to_string(),
        groups: groups
            .into_iter()
            .map(|(flag, churned, rows)| rate(activity_label(flag).to_string(), churned, rows))
            .collect(),
    })
}

pub fn activity_label(active: bool) -> &'static str {
    if active {
        "Active"
    } else {
        "Inactive"
    }
}

pub fn salary_distribution(dataset: &Dataset) -> Result<SalaryDistribution> {
    require_rows(dataset, "estimated salary distribution")?;
    let values = dataset.f64_column(SALARY_COLUMN)?;

    let ordered = sorted(&values);
    let bins = histogram(&ordered);
    let bin_width = bins.first().map(|b| b.upper - b.lower).unwrap_or(0.0);
    let density = kde_counts(&values, &ordered, bin_width);

    Ok(SalaryDistribution {
        values,
        bins,
        density,
    })
}

/// 一次計算全部五項
pub fn compute_insights(dataset: &Dataset) -> Result<ChurnInsights> {
    Ok(ChurnInsights {
        overall: overall_churn(dataset)?,
        by_country: churn_by_country(dataset)?,
        by_age: churn_by_age(dataset)?,
        by_activity: churn_by_activity(dataset)?,
        salary: salary_distribution(dataset)?,
    })
}

fn rate(label: String, churned: usize, rows: usize) -> GroupRate {
    GroupRate {
        label,
        rate_pct: churned as f64 / rows as f64 * 100.0,
        rows,
    }
}

/// 依第一次出現的順序分組，回傳 (key, 流失筆數, 總筆數)。`None` 的列被略過。
fn group_rates<K, I>(keys: I, churn: &[bool]) -> Vec<(K, usize, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = Option<K>>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, usize, usize)> = Vec::new();

    for (key, churned) in keys.into_iter().zip(churn) {
        let Some(key) = key else { continue };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, 0, 0));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.2 += 1;
        if *churned {
            group.1 += 1;
        }
    }

    groups
}

/// numpy "auto" 規則：Sturges 與 Freedman–Diaconis 取較窄的寬度。
/// 資料集中在一小段又有離群值時 FD 寬度會趨近於零，此時退回 Sturges。
fn histogram(ordered: &[f64]) -> Vec<HistogramBin> {
    let (Some(&lo), Some(&hi)) = (ordered.first(), ordered.last()) else {
        return Vec::new();
    };
    let n = ordered.len() as f64;
    let range = hi - lo;

    if range <= 0.0 {
        return vec![HistogramBin {
            lower: lo - 0.5,
            upper: hi + 0.5,
            count: ordered.len(),
        }];
    }

    let sturges_width = range / (n.log2() + 1.0);
    let iqr = quantile_sorted(ordered, 0.75) - quantile_sorted(ordered, 0.25);
    let fd_width = 2.0 * iqr * n.powf(-1.0 / 3.0);
    let width = if fd_width > 0.0 && range / fd_width <= MAX_HISTOGRAM_BINS as f64 {
        fd_width.min(sturges_width)
    } else {
        sturges_width
    };

    let bin_count = ((range / width).ceil() as usize).max(1);
    let width = range / bin_count as f64;

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in ordered {
        let slot = (((value - lo) / width) as usize).min(bin_count - 1);
        bins[slot].count += 1;
    }

    bins
}

/// 高斯核密度估計 (Scott 頻寬)，在 [min, max] 上取點並換算成筆數尺度
fn kde_counts(values: &[f64], ordered: &[f64], bin_width: f64) -> Vec<(f64, f64)> {
    let n = values.len() as f64;
    let sd = std_dev(values);
    let bandwidth = sd * n.powf(-0.2);
    if !bandwidth.is_finite() || bandwidth <= 0.0 {
        return Vec::new();
    }

    let (lo, hi) = (ordered[0], ordered[ordered.len() - 1]);
    let step = (hi - lo) / (KDE_GRID_POINTS - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n * bin_width;

    (0..KDE_GRID_POINTS)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect()
}
