//! Simulation and ledger engine: referral forest, payout split, successor
//! lottery, position index, tick stepper, and history aggregation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::LedgerEvent;

pub mod aggregator;
pub mod forest;
pub mod index;
pub mod lottery;
pub mod payout;
pub mod stepper;

pub use aggregator::{Aggregator, Totals};
pub use forest::{ReferralForest, TreeNode};
pub use index::{PaymentRecord, PositionCounts, PositionIndex};
pub use lottery::{Nomination, NominationBook, NominationState, Proposal};
pub use payout::{compute_listline, split_deposit, DepositSplit};
pub use stepper::{Engine, EngineSnapshot, TickAction};

/// Bounded, most-recent-first event log.
///
/// Appends always succeed; the oldest entries are dropped afterwards to hold
/// the configured capacity (a queue, not a hard cap enforced before insert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    cap: usize,
    entries: VecDeque<LedgerEvent>,
}

impl EventLog {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            entries: VecDeque::with_capacity(cap),
        }
    }

    /// Append an event as the newest entry, then truncate to capacity.
    pub fn push(&mut self, event: LedgerEvent) {
        self.entries.push_front(event);
        self.entries.truncate(self.cap);
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Aggregate referral-link analytics across the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateLinkStats {
    pub total_views: u64,
    pub unique_views: u64,
    pub registrations: u64,
    pub total_deposits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventBody, TimeMs};

    #[test]
    fn test_event_log_truncates_oldest() {
        let mut log = EventLog::new(3);
        for count in 1..=5u32 {
            log.push(LedgerEvent::new(
                TimeMs::new(count as i64),
                EventBody::View { count },
            ));
        }
        assert_eq!(log.len(), 3);
        // Newest first; counts 5, 4, 3 survive.
        let counts: Vec<_> = log
            .iter()
            .map(|e| match e.body {
                EventBody::View { count } => count,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(counts, vec![5, 4, 3]);
    }
}
