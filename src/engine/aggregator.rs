//! Cadence snapshots of running totals into a bounded history series.

use std::collections::VecDeque;

use crate::domain::{HistoryPoint, Money, TimeMs};

/// Counter inputs for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_members: u64,
    pub deposited_members: u64,
    pub verified_members: u64,
    pub total_revenue: Money,
    pub system_balance: Money,
    pub successor_count: u64,
    pub pending_members: u64,
}

/// Bounded aggregate time series, snapshotted every `every` ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregator {
    every: u64,
    cap: usize,
    seq: u64,
    series: VecDeque<HistoryPoint>,
}

impl Aggregator {
    pub fn new(every: u64, cap: usize) -> Self {
        Self {
            every,
            cap,
            seq: 0,
            series: VecDeque::with_capacity(cap),
        }
    }

    /// Snapshot on cadence. Appends nothing on off-cadence ticks; drops the
    /// oldest point once the cap is reached.
    pub fn observe(&mut self, tick: u64, at: TimeMs, totals: &Totals) {
        if tick % self.every != 0 {
            return;
        }
        self.seq += 1;
        self.series.push_back(HistoryPoint {
            at,
            label: format!("T{}", self.seq),
            total_members: totals.total_members,
            deposited_members: totals.deposited_members,
            verified_members: totals.verified_members,
            total_revenue: totals.total_revenue,
            system_balance: totals.system_balance,
            successor_count: totals.successor_count,
            pending_members: totals.pending_members,
        });
        while self.series.len() > self.cap {
            self.series.pop_front();
        }
    }

    /// The bounded series, oldest first.
    pub fn series(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
