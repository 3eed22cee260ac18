//! Four-panel PNG sales report rendered with [`plotters`].
//!
//! Uses the bitmap backend so rendering works in headless environments.
//! Panel layout is fixed: top products (bar), daily revenue (line),
//! category share (pie), customer segments (bar).

use crate::analyzer::{SalesAnalyzer, DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS};
use crate::error::{AnalyticsError, Result};
use crate::model::Segment;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;

const REPORT_SIZE: (u32, u32) = (1500, 1000);

const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const REVENUE_GREEN: RGBColor = RGBColor(46, 139, 87);

/// Bar colors matching the segment labels: bronze, silver, gold.
const SEGMENT_COLORS: [RGBColor; 3] = [
    RGBColor(205, 127, 50),
    RGBColor(192, 192, 192),
    RGBColor(255, 215, 0),
];

/// Slice palette for the category pie.
const PIE_COLORS: [RGBColor; 8] = [
    RGBColor(70, 130, 180),
    RGBColor(255, 159, 64),
    RGBColor(75, 192, 112),
    RGBColor(220, 95, 95),
    RGBColor(153, 102, 255),
    RGBColor(255, 205, 86),
    RGBColor(54, 162, 235),
    RGBColor(201, 121, 167),
];

/// Renders the full report image to `output_path`. Consumes the analyzer's
/// aggregate queries with their default parameters; any renderer failure
/// surfaces as an output error for the given path.
pub fn render_report(analyzer: &SalesAnalyzer, output_path: &Path) -> Result<()> {
    let top_products = analyzer.top_products(DEFAULT_TOP_N)?;
    let daily_revenue = analyzer.daily_revenue(DEFAULT_WINDOW_DAYS)?;
    let category_revenue = analyzer.category_revenue();
    let segment_counts = analyzer.segment_counts();

    draw_panels(
        &top_products,
        &daily_revenue,
        &category_revenue,
        &segment_counts,
        output_path,
    )
    .map_err(|reason| AnalyticsError::output(output_path, reason))
}

fn draw_panels(
    top_products: &[(String, u64)],
    daily_revenue: &[(NaiveDate, f64)],
    category_revenue: &[(String, f64)],
    segment_counts: &[(Segment, usize)],
    output_path: &Path,
) -> std::result::Result<(), String> {
    let root = BitMapBackend::new(output_path, REPORT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let panels = root.split_evenly((2, 2));
    draw_top_products(&panels[0], top_products)?;
    draw_daily_revenue(&panels[1], daily_revenue)?;
    draw_category_pie(&panels[2], category_revenue)?;
    draw_segment_counts(&panels[3], segment_counts)?;

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

fn draw_top_products<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    top_products: &[(String, u64)],
) -> std::result::Result<(), String> {
    let names: Vec<String> = top_products.iter().map(|(p, _)| p.clone()).collect();
    let max_quantity = top_products.iter().map(|(_, q)| *q).max().unwrap_or(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Top Products by Quantity", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..top_products.len() as f64, 0f64..max_quantity * 1.1)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(top_products.len())
        .x_label_formatter(&|x| {
            // center-of-bar positions carry the product names
            names
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("Quantity Sold")
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(top_products.iter().enumerate().map(|(i, (_, quantity))| {
            Rectangle::new(
                [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, *quantity as f64)],
                STEEL_BLUE.filled(),
            )
        }))
        .map_err(|e| e.to_string())?;

    Ok(())
}

fn draw_daily_revenue<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    daily_revenue: &[(NaiveDate, f64)],
) -> std::result::Result<(), String> {
    let dates: Vec<NaiveDate> = daily_revenue.iter().map(|(d, _)| *d).collect();
    let max_revenue = daily_revenue
        .iter()
        .map(|(_, r)| *r)
        .fold(0.0f64, f64::max)
        .max(1.0);
    let x_max = (daily_revenue.len().saturating_sub(1)).max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Daily Revenue (Last {DEFAULT_WINDOW_DAYS} Days)"),
            ("sans-serif", 28),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..x_max, 0f64..max_revenue * 1.1)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_labels(daily_revenue.len().clamp(2, 10))
        .x_label_formatter(&|x| {
            dates
                .get(x.round() as usize)
                .map(|d| d.format("%m-%d").to_string())
                .unwrap_or_default()
        })
        .y_desc("Revenue")
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| e.to_string())?;

    if !daily_revenue.is_empty() {
        chart
            .draw_series(LineSeries::new(
                daily_revenue
                    .iter()
                    .enumerate()
                    .map(|(i, (_, revenue))| (i as f64, *revenue)),
                REVENUE_GREEN.stroke_width(2),
            ))
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

fn draw_category_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    category_revenue: &[(String, f64)],
) -> std::result::Result<(), String> {
    let area = area
        .titled("Sales by Category", ("sans-serif", 28))
        .map_err(|e| e.to_string())?;

    let sizes: Vec<f64> = category_revenue.iter().map(|(_, total)| *total).collect();
    let labels: Vec<String> = category_revenue.iter().map(|(c, _)| c.clone()).collect();
    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
        .collect();

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64) * 0.32;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.percentages(("sans-serif", 16).into_font());
    pie.label_style(("sans-serif", 18).into_font());
    area.draw(&pie).map_err(|e| e.to_string())?;

    Ok(())
}

fn draw_segment_counts<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    segment_counts: &[(Segment, usize)],
) -> std::result::Result<(), String> {
    let max_count = segment_counts
        .iter()
        .map(|(_, c)| *c)
        .max()
        .unwrap_or(1)
        .max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Customer Segments", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..segment_counts.len() as f64, 0f64..max_count * 1.1)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(segment_counts.len())
        .x_label_formatter(&|x| {
            segment_counts
                .get(x.floor() as usize)
                .map(|(segment, _)| segment.label().to_string())
                .unwrap_or_default()
        })
        .y_desc("Number of Customers")
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(
            segment_counts
                .iter()
                .enumerate()
                .map(|(i, (segment, count))| {
                    let color = SEGMENT_COLORS[*segment as usize];
                    Rectangle::new(
                        [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, *count as f64)],
                        color.filled(),
                    )
                }),
        )
        .map_err(|e| e.to_string())?;

    Ok(())
}
