//! 每張圖的「觀察到的模式」與「解讀」文字，以及摘要頁的重點條列。
//!
//! `Live` 模式由本次的計算結果產生文字，數字與圖表一致。
//! `Canned` 模式保留原本儀表板寫死的敘述，其中的百分比不會隨資料更新。

use crate::core::aggregate::activity_label;
use crate::domain::model::{
    ChartKind, ChurnInsights, GroupRates, KeyInsight, SalaryDistribution, SummaryStatistics,
};
use crate::domain::ports::NarrativeMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    pub pattern: String,
    pub interpretation: String,
}

impl Narrative {
    fn new(pattern: impl Into<String>, interpretation: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            interpretation: interpretation.into(),
        }
    }
}

/// 均勻分布的判定門檻 (各 bin 筆數的變異係數)
const UNIFORM_CV_THRESHOLD: f64 = 0.25;

pub fn describe_chart(mode: NarrativeMode, kind: ChartKind, insights: &ChurnInsights) -> Narrative {
    match mode {
        NarrativeMode::Canned => canned_chart(kind),
        NarrativeMode::Live => live_chart(kind, insights),
    }
}

pub fn key_insights(
    mode: NarrativeMode,
    insights: &ChurnInsights,
    summary: &SummaryStatistics,
    zero_balance_pct: Option<f64>,
) -> Vec<KeyInsight> {
    match mode {
        NarrativeMode::Canned => canned_key_insights(),
        NarrativeMode::Live => live_key_insights(insights, summary, zero_balance_pct),
    }
}

fn canned_chart(kind: ChartKind) -> Narrative {
    match kind {
        ChartKind::ChurnDistribution => Narrative::new(
            "Approximately 20.37% of customers churned, while 79.63% remained.",
            "The churn rate indicates a significant portion of customers are leaving, warranting targeted retention strategies. Focus on understanding the characteristics of the 20.37% who churned.",
        ),
        ChartKind::ChurnByCountry => Narrative::new(
            "Churn rates vary across countries, with potential differences in France, Spain, and Germany.",
            "Higher churn in specific countries (e.g., Germany) may reflect regional service issues or market competition. Investigate country-specific factors to reduce churn.",
        ),
        ChartKind::ChurnByAge => Narrative::new(
            "Older age groups (e.g., 50+) may exhibit higher churn rates compared to younger groups.",
            "Older customers are at higher risk of churning, possibly due to life stage changes or dissatisfaction. Tailor engagement strategies for older segments.",
        ),
        ChartKind::ChurnByActiveMember => Narrative::new(
            "Inactive members have a significantly higher churn rate than active members.",
            "Engagement is a key predictor of retention. Inactive customers should be targeted with re-engagement campaigns to reduce churn.",
        ),
        ChartKind::SalaryDistribution => Narrative::new(
            "Salaries are roughly uniformly distributed, with no distinct clusters.",
            "Salary alone may not drive churn, but combining it with other features (e.g., balance or products) could reveal high-risk segments.",
        ),
    }
}

fn canned_key_insights() -> Vec<KeyInsight> {
    vec![
        KeyInsight::new(
            "Churn Rate",
            "~20.37% of customers churned, indicating a need for retention strategies.",
        ),
        KeyInsight::new(
            "Age",
            "Average age is ~38.9 years, with a wide range (18–92), suggesting age-related churn patterns.",
        ),
        KeyInsight::new(
            "Balance",
            "Many customers have zero balance, potentially indicating inactivity.",
        ),
        KeyInsight::new(
            "Active Members",
            "Likely lower churn among active members, highlighting the importance of engagement.",
        ),
    ]
}

fn live_chart(kind: ChartKind, insights: &ChurnInsights) -> Narrative {
    match kind {
        ChartKind::ChurnDistribution => {
            let split = &insights.overall;
            let weight = if split.churned_pct >= 15.0 {
                "a significant"
            } else {
                "a modest"
            };
            Narrative::new(
                format!(
                    "Approximately {:.2}% of customers churned, while {:.2}% remained.",
                    split.churned_pct, split.retained_pct
                ),
                format!(
                    "The churn rate indicates {} portion of customers are leaving, warranting targeted retention strategies. Focus on understanding the characteristics of the {:.2}% who churned.",
                    weight, split.churned_pct
                ),
            )
        }
        ChartKind::ChurnByCountry => live_country(&insights.by_country),
        ChartKind::ChurnByAge => live_age(&insights.by_age),
        ChartKind::ChurnByActiveMember => live_activity(&insights.by_activity),
        ChartKind::SalaryDistribution => live_salary(&insights.salary),
    }
}

fn live_country(rates: &GroupRates) -> Narrative {
    match (rates.highest(), rates.lowest()) {
        (Some(high), Some(low)) if rates.groups.len() > 1 => Narrative::new(
            format!(
                "Churn rates vary across {} countries, from {:.2}% in {} to {:.2}% in {}.",
                rates.groups.len(),
                low.rate_pct,
                low.label,
                high.rate_pct,
                high.label
            ),
            format!(
                "Higher churn in {} may reflect regional service issues or market competition. Investigate country-specific factors to reduce churn.",
                high.label
            ),
        ),
        (Some(only), _) => Narrative::new(
            format!(
                "All customers are located in {}, with a churn rate of {:.2}%.",
                only.label, only.rate_pct
            ),
            "A single market leaves no room for regional comparison; look at other features to explain churn.",
        ),
        _ => Narrative::new("No country information available.", ""),
    }
}

fn live_age(rates: &GroupRates) -> Narrative {
    let (Some(high), Some(low)) = (rates.highest(), rates.lowest()) else {
        return Narrative::new(
            "No customers fall inside the supported age range (0, 100].",
            "",
        );
    };

    let older_at_risk = matches!(high.label.as_str(), "40–50" | "50+");
    let interpretation = if older_at_risk {
        "Older customers are at higher risk of churning, possibly due to life stage changes or dissatisfaction. Tailor engagement strategies for older segments."
    } else {
        "Younger customers are at higher risk of churning, possibly due to lower switching costs. Tailor onboarding and loyalty offers for younger segments."
    };

    Narrative::new(
        format!(
            "The {} age group shows the highest churn rate ({:.2}%), while {} shows the lowest ({:.2}%).",
            high.label, high.rate_pct, low.label, low.rate_pct
        ),
        interpretation,
    )
}

fn live_activity(rates: &GroupRates) -> Narrative {
    let inactive = rates.get(activity_label(false));
    let active = rates.get(activity_label(true));

    match (inactive, active) {
        (Some(inactive), Some(active)) => {
            let pattern = format!(
                "Inactive members churn at {:.2}%, compared with {:.2}% for active members.",
                inactive.rate_pct, active.rate_pct
            );
            let interpretation = if inactive.rate_pct > active.rate_pct {
                "Engagement is a key predictor of retention. Inactive customers should be targeted with re-engagement campaigns to reduce churn."
            } else {
                "Activity status does not lower churn here; retention efforts should look beyond engagement alone."
            };
            Narrative::new(pattern, interpretation)
        }
        _ => {
            let only = rates.groups.first();
            Narrative::new(
                match only {
                    Some(g) => format!(
                        "All customers are {} members, with a churn rate of {:.2}%.",
                        g.label.to_lowercase(),
                        g.rate_pct
                    ),
                    None => "No activity information available.".to_string(),
                },
                "Both active and inactive members are needed to compare engagement effects.",
            )
        }
    }
}

fn live_salary(salary: &SalaryDistribution) -> Narrative {
    let counts: Vec<f64> = salary.bins.iter().map(|b| b.count as f64).collect();
    let mean = counts.iter().sum::<f64>() / counts.len().max(1) as f64;
    let var = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len().max(1) as f64;
    let cv = if mean > 0.0 { var.sqrt() / mean } else { 0.0 };

    let pattern = if cv <= UNIFORM_CV_THRESHOLD {
        "Salaries are roughly uniformly distributed, with no distinct clusters.".to_string()
    } else {
        match salary.bins.iter().max_by_key(|b| b.count) {
            Some(peak) => format!(
                "Salaries are unevenly distributed, peaking between {:.0} and {:.0}.",
                peak.lower, peak.upper
            ),
            None => "No salary information available.".to_string(),
        }
    };

    Narrative::new(
        pattern,
        "Salary alone may not drive churn, but combining it with other features (e.g., balance or products) could reveal high-risk segments.",
    )
}

fn live_key_insights(
    insights: &ChurnInsights,
    summary: &SummaryStatistics,
    zero_balance_pct: Option<f64>,
) -> Vec<KeyInsight> {
    let mut bullets = vec![KeyInsight::new(
        "Churn Rate",
        format!(
            "~{:.2}% of customers churned, indicating a need for retention strategies.",
            insights.overall.churned_pct
        ),
    )];

    if let Some(age) = summary.column("age") {
        bullets.push(KeyInsight::new(
            "Age",
            format!(
                "Average age is ~{:.1} years, with a range of {:.0}–{:.0}, suggesting age-related churn patterns.",
                age.mean, age.min, age.max
            ),
        ));
    }

    if let Some(zero) = zero_balance_pct {
        bullets.push(KeyInsight::new(
            "Balance",
            format!(
                "{:.1}% of customers have zero balance, potentially indicating inactivity.",
                zero
            ),
        ));
    }

    let by_activity = &insights.by_activity;
    if let (Some(inactive), Some(active)) = (
        by_activity.get(activity_label(false)),
        by_activity.get(activity_label(true)),
    ) {
        bullets.push(KeyInsight::new(
            "Active Members",
            format!(
                "Churn is {:.2}% among active members versus {:.2}% among inactive members.",
                active.rate_pct, inactive.rate_pct
            ),
        ));
    }

    bullets
}
