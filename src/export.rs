use crate::analyzer::{SalesAnalyzer, Summary, DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS};
use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Machine-readable analytics payload. Derives both directions so a
/// written export can be parsed back and checked against the table.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsExport {
    pub generated_at: DateTime<Utc>,
    pub top_products: BTreeMap<String, u64>,
    pub daily_revenue: BTreeMap<String, f64>,
    pub customer_segments: BTreeMap<String, usize>,
    pub summary: Summary,
}

impl AnalyticsExport {
    /// Assembles the payload from the analyzer's default-parameter queries.
    pub fn from_analyzer(analyzer: &SalesAnalyzer) -> Result<Self> {
        let top_products = analyzer.top_products(DEFAULT_TOP_N)?.into_iter().collect();
        let daily_revenue = analyzer
            .daily_revenue(DEFAULT_WINDOW_DAYS)?
            .into_iter()
            .map(|(date, revenue)| (date.format("%Y-%m-%d").to_string(), revenue))
            .collect();
        let customer_segments = analyzer
            .segment_counts()
            .into_iter()
            .map(|(segment, count)| (segment.label().to_string(), count))
            .collect();

        Ok(AnalyticsExport {
            generated_at: Utc::now(),
            top_products,
            daily_revenue,
            customer_segments,
            summary: analyzer.summary(),
        })
    }
}

/// Writes the analytics payload as pretty-printed UTF-8 JSON. serde_json
/// leaves non-ASCII identifiers unescaped, matching the source data.
pub fn export_json(analyzer: &SalesAnalyzer, output_path: &Path) -> Result<()> {
    let export = AnalyticsExport::from_analyzer(analyzer)?;
    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| AnalyticsError::output(output_path, e))?;
    fs::write(output_path, json).map_err(|e| AnalyticsError::output(output_path, e))?;
    Ok(())
}
