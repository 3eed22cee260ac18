use crate::error::{AnalyticsError, Result};
use crate::model::Transaction;
use std::path::Path;

/// Columns every source file must carry, in any order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "product",
    "category",
    "quantity",
    "total",
    "customer_id",
    "order_id",
];

/// Loads the sales table from a delimited file. The header row is checked
/// for all required columns before any row is deserialized, so a missing
/// column fails with its name rather than a row-level type error.
pub fn load_csv(csv_path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .map_err(|e| AnalyticsError::load(csv_path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| AnalyticsError::load(csv_path, e))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(AnalyticsError::MissingColumn(column.to_string()));
        }
    }

    let mut transactions = Vec::new();
    for result in rdr.deserialize() {
        let transaction: Transaction =
            result.map_err(|e| AnalyticsError::load(csv_path, e))?;
        transactions.push(transaction);
    }

    Ok(transactions)
}
