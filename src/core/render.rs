//! 以 plotters 把聚合結果畫成 SVG 圖檔。
//!
//! 圖先畫到記憶體中的字串，再透過 `Storage` 覆寫到輸出目錄；寫完即丟棄，不保留圖表物件。

use crate::domain::model::{
    ChartArtifact, ChartKind, ChurnInsights, ChurnSplit, GroupRates, SalaryDistribution,
};
use crate::domain::ports::Storage;
use crate::utils::error::{DashboardError, Result};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::PathBuf;

const CHART_SIZE: (u32, u32) = (720, 480);
const FONT: &str = "sans-serif";

const RETAINED_COLOR: RGBColor = RGBColor(0x66, 0xb3, 0xff);
const CHURNED_COLOR: RGBColor = RGBColor(0xff, 0x99, 0x99);
const COUNTRY_COLOR: RGBColor = RGBColor(0x4c, 0x72, 0xb0);
const AGE_COLOR: RGBColor = RGBColor(0xdd, 0x84, 0x52);
const ACTIVITY_COLOR: RGBColor = RGBColor(0x55, 0xa8, 0x68);
const SALARY_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const KDE_COLOR: RGBColor = RGBColor(0x0b, 0x3c, 0x5d);

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

pub struct ChartRenderer<'a, S: Storage> {
    storage: &'a S,
    output_dir: PathBuf,
}

impl<'a, S: Storage> ChartRenderer<'a, S> {
    pub fn new(storage: &'a S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            output_dir: output_dir.into(),
        }
    }

    pub fn artifact_path(&self, kind: ChartKind) -> PathBuf {
        self.output_dir.join(kind.file_name())
    }

    /// 畫出並寫入單張圖，覆寫同名舊檔
    pub async fn render(&self, kind: ChartKind, insights: &ChurnInsights) -> Result<ChartArtifact> {
        let svg = chart_svg(kind, insights)?;
        let path = self.artifact_path(kind);
        self.storage.write_file(&path, svg.as_bytes()).await?;

        tracing::debug!("🖼️ Wrote {} ({} bytes)", path.display(), svg.len());
        Ok(ChartArtifact { kind, path })
    }

    pub async fn render_all(&self, insights: &ChurnInsights) -> Result<Vec<ChartArtifact>> {
        let mut artifacts = Vec::with_capacity(ChartKind::ALL.len());
        for kind in ChartKind::ALL {
            artifacts.push(self.render(kind, insights).await?);
        }
        tracing::info!(
            "🖼️ Rendered {} charts into {}",
            artifacts.len(),
            self.output_dir.display()
        );
        Ok(artifacts)
    }
}

/// 單張圖的 SVG 內容
pub fn chart_svg(kind: ChartKind, insights: &ChurnInsights) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        let drawn = match kind {
            ChartKind::ChurnDistribution => draw_churn_pie(&root, &insights.overall),
            ChartKind::ChurnByCountry => {
                draw_rate_bars(&root, kind, "Country", &insights.by_country, COUNTRY_COLOR)
            }
            ChartKind::ChurnByAge => {
                draw_rate_bars(&root, kind, "Age Group", &insights.by_age, AGE_COLOR)
            }
            ChartKind::ChurnByActiveMember => draw_rate_bars(
                &root,
                kind,
                "Active Member",
                &insights.by_activity,
                ACTIVITY_COLOR,
            ),
            ChartKind::SalaryDistribution => draw_salary(&root, &insights.salary),
        };
        drawn
            .and_then(|_| root.present().map_err(anyhow::Error::from))
            .map_err(|e| DashboardError::render(kind.file_name(), e))?;
    }
    Ok(svg)
}

fn draw_churn_pie(root: &Area, split: &ChurnSplit) -> anyhow::Result<()> {
    root.fill(&WHITE)?;
    let area = root.titled(ChartKind::ChurnDistribution.chart_title(), (FONT, 24))?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.38;
    let sizes = [split.retained_pct, split.churned_pct];
    let colors = [RETAINED_COLOR, CHURNED_COLOR];
    let labels = ["Retained", "Churned"];

    let mut pie = Pie::new(&center, &radius, &sizes[..], &colors[..], &labels[..]);
    pie.start_angle(90.0);
    pie.label_style((FONT, 18).into_font().color(&BLACK));
    pie.percentages((FONT, 16).into_font().color(&BLACK));
    area.draw(&pie)?;
    Ok(())
}

fn draw_rate_bars(
    root: &Area,
    kind: ChartKind,
    x_desc: &str,
    rates: &GroupRates,
    color: RGBColor,
) -> anyhow::Result<()> {
    root.fill(&WHITE)?;

    if rates.groups.is_empty() {
        let area = root.titled(kind.chart_title(), (FONT, 24))?;
        let (width, height) = area.dim_in_pixel();
        area.draw(&Text::new(
            "No data",
            (width as i32 / 2, height as i32 / 2),
            TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        return Ok(());
    }

    let labels: Vec<&str> = rates.groups.iter().map(|g| g.label.as_str()).collect();
    let label_of = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(root)
        .caption(kind.chart_title(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..labels.len()).into_segmented(), 0f64..100f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&label_of)
        .x_desc(x_desc)
        .y_desc("Churn Rate (%)")
        .axis_desc_style((FONT, 15))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.filled())
            .margin(30)
            .data(rates.groups.iter().enumerate().map(|(i, g)| (i, g.rate_pct))),
    )?;

    let value_style =
        TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(rates.groups.iter().enumerate().map(|(i, g)| {
        Text::new(
            format!("{:.2}%", g.rate_pct),
            (SegmentValue::CenterOf(i), (g.rate_pct + 1.0).min(99.0)),
            value_style.clone(),
        )
    }))?;

    Ok(())
}

fn draw_salary(root: &Area, salary: &SalaryDistribution) -> anyhow::Result<()> {
    root.fill(&WHITE)?;
    let (Some(first), Some(last)) = (salary.bins.first(), salary.bins.last()) else {
        return Ok(());
    };

    let max_count = salary.bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let max_density = salary.density.iter().map(|(_, d)| *d).fold(0.0, f64::max);
    let y_max = (max_count.max(max_density) * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(ChartKind::SalaryDistribution.chart_title(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first.lower..last.upper, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Estimated Salary")
        .y_desc("Count")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .axis_desc_style((FONT, 15))
        .draw()?;

    chart.draw_series(salary.bins.iter().map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.count as f64)],
            SALARY_COLOR.mix(0.6).filled(),
        )
    }))?;
    chart.draw_series(salary.bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], WHITE.stroke_width(1))
    }))?;

    if !salary.density.is_empty() {
        chart.draw_series(LineSeries::new(
            salary.density.iter().copied(),
            KDE_COLOR.stroke_width(2),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use crate::core::aggregate::compute_insights;
    use crate::domain::model::Dataset;
    use tempfile::TempDir;

    fn insights() -> ChurnInsights {
        let csv = "\
country,age,active_member,estimated_salary,churn
France,25,1,50000,0
Germany,45,0,120000,1
Spain,35,1,80000,0
Germany,62,0,30000,1
France,38,1,99000,0
";
        let ds = Dataset::from_reader("inline", csv.as_bytes()).unwrap();
        compute_insights(&ds).unwrap()
    }

    #[test]
    fn test_each_chart_produces_svg_with_title() {
        let insights = insights();
        for kind in ChartKind::ALL {
            let svg = chart_svg(kind, &insights).unwrap();
            assert!(svg.contains("<svg"), "{:?}", kind);
            assert!(svg.contains(kind.chart_title()), "{:?}", kind);
        }
    }

    #[test]
    fn test_bar_chart_labels_groups() {
        let svg = chart_svg(ChartKind::ChurnByCountry, &insights()).unwrap();
        assert!(svg.contains("Germany"));
        assert!(svg.contains("100.00%"));
    }

    #[tokio::test]
    async fn test_render_all_overwrites_fixed_names() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let renderer = ChartRenderer::new(&storage, "plots");

        let stale = temp_dir.path().join("plots/churn_distribution.svg");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "stale").unwrap();

        let artifacts = renderer.render_all(&insights()).await.unwrap();
        assert_eq!(artifacts.len(), 5);
        for artifact in &artifacts {
            assert!(temp_dir.path().join(&artifact.path).exists());
        }
        assert_ne!(std::fs::read_to_string(&stale).unwrap(), "stale");
    }
}
