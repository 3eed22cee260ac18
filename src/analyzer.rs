use crate::error::{AnalyticsError, Result};
use crate::loader::load_csv;
use crate::model::{Segment, Transaction};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Default ranking depth for [`SalesAnalyzer::top_products`].
pub const DEFAULT_TOP_N: usize = 10;

/// Default lookback window for [`SalesAnalyzer::daily_revenue`], in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Per-customer purchase statistics with the assigned segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub total_spend: f64,
    pub order_count: usize,
    pub segment: Segment,
}

/// Table-wide summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub total_customers: usize,
    pub avg_order_value: f64,
}

/// Computes read-only aggregates over an in-memory sales table. The table
/// is immutable for the analyzer's lifetime; every query recomputes from
/// the full table, so results always reflect all loaded transactions.
#[derive(Debug)]
pub struct SalesAnalyzer {
    transactions: Vec<Transaction>,
}

impl SalesAnalyzer {
    /// Wraps an already-loaded table. An empty table is rejected up front
    /// rather than letting every query return a degenerate result.
    pub fn new(transactions: Vec<Transaction>) -> Result<Self> {
        if transactions.is_empty() {
            return Err(AnalyticsError::InvalidArgument(
                "transaction table is empty".to_string(),
            ));
        }
        Ok(SalesAnalyzer { transactions })
    }

    /// Loads the table from a delimited file and wraps it.
    pub fn from_csv(csv_path: &Path) -> Result<Self> {
        SalesAnalyzer::new(load_csv(csv_path)?)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Top `n` products by total quantity sold, descending. Ties are broken
    /// ascending by product name: accumulation in a name-ordered map plus a
    /// stable sort on quantity keeps the ranking deterministic.
    pub fn top_products(&self, n: usize) -> Result<Vec<(String, u64)>> {
        if n == 0 {
            return Err(AnalyticsError::InvalidArgument(
                "top_products: n must be positive".to_string(),
            ));
        }

        let mut by_product: BTreeMap<&str, u64> = BTreeMap::new();
        for tx in &self.transactions {
            *by_product.entry(&tx.product).or_insert(0) += tx.quantity;
        }

        let mut ranked: Vec<(String, u64)> = by_product
            .into_iter()
            .map(|(product, quantity)| (product.to_string(), quantity))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        Ok(ranked)
    }

    /// Revenue per calendar date (UTC) over the last `days` days, ascending
    /// by date. Dates with no transactions are absent. "Now" is wall-clock
    /// time at the call, so repeated calls across real time may differ.
    pub fn daily_revenue(&self, days: i64) -> Result<Vec<(NaiveDate, f64)>> {
        self.daily_revenue_at(days, Utc::now())
    }

    /// Clock-injected variant of [`SalesAnalyzer::daily_revenue`]. The
    /// cutoff is `now - days`; only transactions strictly after it count.
    pub fn daily_revenue_at(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        if days <= 0 {
            return Err(AnalyticsError::InvalidArgument(
                "daily_revenue: days must be positive".to_string(),
            ));
        }

        let cutoff = now - Duration::days(days);
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for tx in self.transactions.iter().filter(|tx| tx.date > cutoff) {
            *by_date.entry(tx.date.date_naive()).or_insert(0.0) += tx.total;
        }

        Ok(by_date.into_iter().collect())
    }

    /// Per-customer spend, distinct order count, and segment label.
    pub fn customer_segmentation(&self) -> BTreeMap<String, CustomerStats> {
        let mut spend: BTreeMap<&str, f64> = BTreeMap::new();
        let mut orders: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for tx in &self.transactions {
            *spend.entry(&tx.customer_id).or_insert(0.0) += tx.total;
            orders
                .entry(&tx.customer_id)
                .or_default()
                .insert(&tx.order_id);
        }

        spend
            .into_iter()
            .map(|(customer, total_spend)| {
                let order_count = orders[customer].len();
                let stats = CustomerStats {
                    total_spend,
                    order_count,
                    segment: Segment::from_spend(total_spend),
                };
                (customer.to_string(), stats)
            })
            .collect()
    }

    /// Revenue summed per category, ordered by category name. Feeds the
    /// report's pie panel.
    pub fn category_revenue(&self) -> Vec<(String, f64)> {
        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
        for tx in &self.transactions {
            *by_category.entry(&tx.category).or_insert(0.0) += tx.total;
        }
        by_category
            .into_iter()
            .map(|(category, total)| (category.to_string(), total))
            .collect()
    }

    /// Customers per segment. All three labels are always present so chart
    /// and export shapes stay stable when a segment is empty.
    pub fn segment_counts(&self) -> Vec<(Segment, usize)> {
        let segmentation = self.customer_segmentation();
        Segment::ALL
            .iter()
            .map(|&segment| {
                let count = segmentation
                    .values()
                    .filter(|stats| stats.segment == segment)
                    .count();
                (segment, count)
            })
            .collect()
    }

    /// Table-wide totals. `avg_order_value` is the mean of per-order summed
    /// totals, not the mean of raw transaction totals.
    pub fn summary(&self) -> Summary {
        let mut per_order: BTreeMap<&str, f64> = BTreeMap::new();
        let mut customers: HashSet<&str> = HashSet::new();
        let mut total_revenue = 0.0;
        for tx in &self.transactions {
            *per_order.entry(&tx.order_id).or_insert(0.0) += tx.total;
            customers.insert(&tx.customer_id);
            total_revenue += tx.total;
        }

        let total_orders = per_order.len();
        let avg_order_value = per_order.values().sum::<f64>() / total_orders as f64;

        Summary {
            total_revenue,
            total_orders,
            total_customers: customers.len(),
            avg_order_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(
        date: &str,
        product: &str,
        category: &str,
        quantity: u64,
        total: f64,
        customer_id: &str,
        order_id: &str,
    ) -> Transaction {
        Transaction {
            date: crate::model::parse_date(date).unwrap(),
            product: product.to_string(),
            category: category.to_string(),
            quantity,
            total,
            customer_id: customer_id.to_string(),
            order_id: order_id.to_string(),
        }
    }

    /// The worked example: two customers, two orders, three line items.
    fn example_table() -> SalesAnalyzer {
        SalesAnalyzer::new(vec![
            tx("2025-03-01", "P1", "Tools", 5, 100.0, "A", "O1"),
            tx("2025-03-01", "P2", "Tools", 3, 50.0, "A", "O1"),
            tx("2025-03-02", "P1", "Parts", 2, 40.0, "B", "O2"),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = SalesAnalyzer::new(Vec::new()).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidArgument(_)));
    }

    #[test]
    fn test_top_products_example() {
        let analyzer = example_table();
        let top = analyzer.top_products(2).unwrap();
        assert_eq!(top, vec![("P1".to_string(), 7), ("P2".to_string(), 3)]);
    }

    #[test]
    fn test_top_products_caps_at_distinct_count() {
        let analyzer = example_table();
        let top = analyzer.top_products(10).unwrap();
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_top_products_quantities_bounded_by_table_total() {
        let analyzer = example_table();
        let table_total: u64 = analyzer.transactions().iter().map(|t| t.quantity).sum();
        let ranked_total: u64 = analyzer
            .top_products(1)
            .unwrap()
            .iter()
            .map(|(_, q)| q)
            .sum();
        assert!(ranked_total <= table_total);
    }

    #[test]
    fn test_top_products_tie_break_is_lexicographic() {
        let analyzer = SalesAnalyzer::new(vec![
            tx("2025-03-01", "Zeta", "C", 4, 1.0, "A", "O1"),
            tx("2025-03-01", "Alpha", "C", 4, 1.0, "A", "O1"),
            tx("2025-03-01", "Mid", "C", 9, 1.0, "A", "O1"),
        ])
        .unwrap();

        let top = analyzer.top_products(3).unwrap();
        assert_eq!(top[0].0, "Mid");
        assert_eq!(top[1].0, "Alpha");
        assert_eq!(top[2].0, "Zeta");
    }

    #[test]
    fn test_top_products_rejects_zero() {
        let analyzer = example_table();
        assert!(matches!(
            analyzer.top_products(0).unwrap_err(),
            AnalyticsError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_daily_revenue_window_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let analyzer = SalesAnalyzer::new(vec![
            // Exactly at the cutoff: excluded (strictly-greater filter)
            tx("2025-03-03 12:00:00", "P1", "C", 1, 10.0, "A", "O1"),
            // One second inside the window: included
            tx("2025-03-03 12:00:01", "P2", "C", 1, 20.0, "A", "O2"),
            tx("2025-03-05", "P3", "C", 1, 30.0, "B", "O3"),
        ])
        .unwrap();

        let series = analyzer.daily_revenue_at(7, now).unwrap();
        assert_eq!(
            series,
            vec![
                (NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), 20.0),
                (NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(), 30.0),
            ]
        );
    }

    #[test]
    fn test_daily_revenue_groups_and_sorts_by_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let analyzer = SalesAnalyzer::new(vec![
            tx("2025-03-05 18:00:00", "P1", "C", 1, 5.0, "A", "O1"),
            tx("2025-03-04", "P1", "C", 1, 7.0, "A", "O2"),
            tx("2025-03-05 09:00:00", "P2", "C", 1, 3.0, "B", "O3"),
        ])
        .unwrap();

        let series = analyzer.daily_revenue_at(30, now).unwrap();
        assert_eq!(
            series,
            vec![
                (NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), 7.0),
                (NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(), 8.0),
            ]
        );
    }

    #[test]
    fn test_daily_revenue_narrow_window_is_subset_of_wide() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let analyzer = SalesAnalyzer::new(vec![
            tx("2025-02-01", "P1", "C", 1, 5.0, "A", "O1"),
            tx("2025-03-06", "P1", "C", 1, 7.0, "A", "O2"),
            tx("2025-03-09", "P2", "C", 1, 3.0, "B", "O3"),
        ])
        .unwrap();

        let narrow: Vec<NaiveDate> = analyzer
            .daily_revenue_at(5, now)
            .unwrap()
            .into_iter()
            .map(|(d, _)| d)
            .collect();
        let wide: Vec<NaiveDate> = analyzer
            .daily_revenue_at(60, now)
            .unwrap()
            .into_iter()
            .map(|(d, _)| d)
            .collect();

        assert!(narrow.iter().all(|d| wide.contains(d)));
        assert!(wide.len() > narrow.len());
    }

    #[test]
    fn test_daily_revenue_rejects_non_positive_days() {
        let analyzer = example_table();
        assert!(matches!(
            analyzer.daily_revenue(0).unwrap_err(),
            AnalyticsError::InvalidArgument(_)
        ));
        assert!(matches!(
            analyzer.daily_revenue(-3).unwrap_err(),
            AnalyticsError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_customer_segmentation_example() {
        let analyzer = example_table();
        let segments = analyzer.customer_segmentation();

        let a = &segments["A"];
        assert_eq!(a.total_spend, 150.0);
        assert_eq!(a.order_count, 1);
        assert_eq!(a.segment, Segment::Bronze);

        let b = &segments["B"];
        assert_eq!(b.total_spend, 40.0);
        assert_eq!(b.order_count, 1);
        assert_eq!(b.segment, Segment::Bronze);
    }

    #[test]
    fn test_customer_segmentation_counts_distinct_orders() {
        let analyzer = SalesAnalyzer::new(vec![
            tx("2025-03-01", "P1", "C", 1, 600.0, "A", "O1"),
            tx("2025-03-01", "P2", "C", 1, 300.0, "A", "O1"),
            tx("2025-03-02", "P1", "C", 1, 200.0, "A", "O2"),
        ])
        .unwrap();

        let stats = &analyzer.customer_segmentation()["A"];
        assert_eq!(stats.order_count, 2); // O1 has two line items
        assert_eq!(stats.total_spend, 1100.0);
        assert_eq!(stats.segment, Segment::Silver);
    }

    #[test]
    fn test_segmentation_boundary_spends() {
        let analyzer = SalesAnalyzer::new(vec![
            tx("2025-03-01", "P", "C", 1, 0.0, "zero", "O1"),
            tx("2025-03-01", "P", "C", 1, 1000.0, "silver-edge", "O2"),
            tx("2025-03-01", "P", "C", 1, 5000.0, "gold-edge", "O3"),
        ])
        .unwrap();

        let segments = analyzer.customer_segmentation();
        assert_eq!(segments["zero"].segment, Segment::Bronze);
        assert_eq!(segments["silver-edge"].segment, Segment::Silver);
        assert_eq!(segments["gold-edge"].segment, Segment::Gold);
    }

    #[test]
    fn test_segment_counts_cover_all_customers() {
        let analyzer = SalesAnalyzer::new(vec![
            tx("2025-03-01", "P", "C", 1, 100.0, "A", "O1"),
            tx("2025-03-01", "P", "C", 1, 2000.0, "B", "O2"),
            tx("2025-03-01", "P", "C", 1, 7000.0, "C", "O3"),
            tx("2025-03-01", "P", "C", 1, 50.0, "D", "O4"),
        ])
        .unwrap();

        let counts = analyzer.segment_counts();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0], (Segment::Bronze, 2));
        assert_eq!(counts[1], (Segment::Silver, 1));
        assert_eq!(counts[2], (Segment::Gold, 1));

        let total: usize = counts.iter().map(|(_, c)| c).sum();
        assert_eq!(total, analyzer.customer_segmentation().len());
    }

    #[test]
    fn test_segment_counts_include_empty_segments() {
        let analyzer = example_table(); // everyone is Bronze
        let counts = analyzer.segment_counts();
        assert_eq!(counts[0], (Segment::Bronze, 2));
        assert_eq!(counts[1], (Segment::Silver, 0));
        assert_eq!(counts[2], (Segment::Gold, 0));
    }

    #[test]
    fn test_category_revenue() {
        let analyzer = example_table();
        let revenue = analyzer.category_revenue();
        assert_eq!(
            revenue,
            vec![("Parts".to_string(), 40.0), ("Tools".to_string(), 150.0)]
        );
    }

    #[test]
    fn test_summary_example() {
        let analyzer = example_table();
        let summary = analyzer.summary();

        assert_eq!(summary.total_revenue, 190.0);
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_customers, 2);
        // mean of per-order sums: (150 + 40) / 2, not mean of raw totals
        assert_eq!(summary.avg_order_value, 95.0);
    }

    #[test]
    fn test_avg_order_value_reconstructs_from_per_order_sums() {
        let analyzer = SalesAnalyzer::new(vec![
            tx("2025-03-01", "P1", "C", 1, 10.0, "A", "O1"),
            tx("2025-03-01", "P2", "C", 1, 20.0, "A", "O1"),
            tx("2025-03-02", "P1", "C", 1, 60.0, "B", "O2"),
            tx("2025-03-03", "P3", "C", 1, 30.0, "C", "O3"),
        ])
        .unwrap();

        let summary = analyzer.summary();
        // per-order sums are 30, 60, 30
        assert!((summary.avg_order_value - 40.0).abs() < 1e-9);
        // the per-order mean times the order count recovers total revenue
        assert!((summary.avg_order_value * summary.total_orders as f64
            - summary.total_revenue)
            .abs()
            < 1e-9);
    }
}
