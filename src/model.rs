use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One row of the sales table. Core fields are immutable after load; no
/// operation in this crate mutates a transaction.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Transaction {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: DateTime<Utc>,
    pub product: String,
    pub category: String,
    pub quantity: u64,
    pub total: f64,
    pub customer_id: String,
    pub order_id: String,
}

/// Accepts RFC 3339, "YYYY-MM-DD HH:MM:SS", or a bare "YYYY-MM-DD"
/// (interpreted as midnight UTC).
fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
    }
    Err(format!("unrecognized date '{raw}'"))
}

/// Customer segment label, assigned from total historical spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    Bronze,
    Silver,
    Gold,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Bronze, Segment::Silver, Segment::Gold];

    /// Half-open bins, left-inclusive: [0, 1000) Bronze, [1000, 5000)
    /// Silver, [5000, ∞) Gold.
    pub fn from_spend(total_spend: f64) -> Self {
        if total_spend >= 5000.0 {
            Segment::Gold
        } else if total_spend >= 1000.0 {
            Segment::Silver
        } else {
            Segment::Bronze
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Bronze => "Bronze",
            Segment::Silver => "Silver",
            Segment::Gold => "Gold",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
