//! Fan history chart using plotters.
//!
//! One line per player over the table's date columns. Only the players with
//! the highest latest counts are drawn.

use super::gains::{player_points, ClubStats};
use crate::table::HistoricalTable;
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::path::Path;

const GRID_COLOR: RGBColor = RGBColor(220, 220, 220);
const BACKGROUND: RGBColor = RGBColor(250, 250, 250);

/// Data points of one chart line: (date column index, fans).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Builds the lines for the `top_n` players of `stats`, in ranking order.
pub fn chart_series(table: &HistoricalTable, stats: &ClubStats, top_n: usize) -> Vec<PlayerSeries> {
    stats
        .players
        .iter()
        .take(top_n)
        .map(|player| {
            let points = player_points(table, &player.name)
                .into_iter()
                .filter_map(|(date, fans)| {
                    let column = table.dates().iter().position(|d| d == date)?;
                    Some((column as f64, fans as f64))
                })
                .collect();
            PlayerSeries {
                name: player.name.clone(),
                points,
            }
        })
        .collect()
}

/// Vertical axis range with 5% headroom on both sides.
fn fans_range(series: &[PlayerSeries]) -> (f64, f64) {
    let mut values = series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
    let Some(first) = values.next() else {
        return (0.0, 1.0);
    };
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.05).max(1.0);
    ((min - pad).max(0.0), max + pad)
}

/// Renders the fan history chart to a PNG file.
pub fn generate_history_chart(
    table: &HistoricalTable,
    stats: &ClubStats,
    top_n: usize,
    output_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let series = chart_series(table, stats, top_n);
    if series.is_empty() || table.dates().is_empty() {
        return Err(anyhow!("No fan data to chart"));
    }

    let dates = table.dates();
    let (y_min, y_max) = fans_range(&series);
    // Keep a single date column visible
    let x_max = (dates.len() as f64 - 1.0).max(1.0);

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&BACKGROUND)
        .context("Failed to fill chart background")?;

    let title = match &stats.latest_date {
        Some(date) => format!("Club Fans (top {}, as of {})", series.len(), date),
        None => format!("Club Fans (top {})", series.len()),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28).into_font().style(FontStyle::Bold))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.2f64..x_max + 0.2, y_min..y_max)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Fans")
        .x_labels(dates.len().min(12))
        .x_label_formatter(&|x| {
            let index = x.round();
            if (x - index).abs() > 0.01 || index < 0.0 {
                return String::new();
            }
            dates.get(index as usize).cloned().unwrap_or_default()
        })
        .y_label_formatter(&|y| format!("{:.0}", y))
        .light_line_style(GRID_COLOR)
        .bold_line_style(GRID_COLOR.mix(0.8))
        .draw()
        .context("Failed to draw mesh")?;

    for (i, line) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();

        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(line.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart.draw_series(
            line.points
                .iter()
                .map(|&point| Circle::new(point, 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.3))
        .draw()
        .context("Failed to draw legend")?;

    root.present().context("Failed to save chart")?;
    Ok(())
}
