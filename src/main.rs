use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use sales_analytics::{export_json, render_report, SalesAnalyzer};

const DEFAULT_DATA_PATH: &str = "sales_data.csv";
const DEFAULT_REPORT_PATH: &str = "sales_report.png";
const DEFAULT_EXPORT_PATH: &str = "analytics.json";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // Positional overrides: [data] [report] [export]
    let data_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_DATA_PATH);
    let report_path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(DEFAULT_REPORT_PATH);
    let export_path = args
        .get(3)
        .map(String::as_str)
        .unwrap_or(DEFAULT_EXPORT_PATH);

    // 1. Load data
    println!("📂 Loading sales data from {data_path}...");
    let analyzer = SalesAnalyzer::from_csv(Path::new(data_path))
        .context("Failed to load sales data")?;
    println!("✓ Loaded {} transactions", analyzer.transactions().len());

    // 2. Render report image
    render_report(&analyzer, Path::new(report_path))
        .context("Failed to render report")?;
    println!("✓ Report saved to {report_path}");

    // 3. Export structured summary
    export_json(&analyzer, Path::new(export_path)).context("Failed to export analytics")?;
    println!("✓ Analytics exported to {export_path}");

    // 4. Console summary
    let summary = analyzer.summary();
    println!("\n=== Sales Summary ===");
    println!("Total Revenue: {}", format_amount(summary.total_revenue));
    println!("Total Orders: {}", format_count(summary.total_orders));
    println!("Total Customers: {}", format_count(summary.total_customers));

    println!("\nTop 5 Products:");
    for (product, quantity) in analyzer.top_products(5)? {
        println!("  {product}: {quantity}");
    }

    Ok(())
}

/// Two decimals with thousands separators, e.g. 1234567.5 → "1,234,567.50".
fn format_amount(amount: f64) -> String {
    let total_cents = (amount * 100.0).round() as i64;
    let whole = total_cents / 100;
    let cents = (total_cents % 100).abs();
    format!("{}.{:02}", format_count(whole as usize), cents)
}

fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
