//! Aggregate history snapshots for charting.

use crate::domain::{Money, TimeMs};
use serde::{Deserialize, Serialize};

/// One point in the bounded aggregate time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub at: TimeMs,
    /// Monotonic tick label, e.g. "T42".
    pub label: String,
    pub total_members: u64,
    pub deposited_members: u64,
    pub verified_members: u64,
    pub total_revenue: Money,
    pub system_balance: Money,
    pub successor_count: u64,
    pub pending_members: u64,
}
