//! Derived position index: O(1) dashboard reads over the listline log.
//!
//! Never authoritative. The index is updated incrementally on each new member,
//! listline, and re-parent, and can always be rebuilt wholesale from the
//! forest plus the listline log; the two must agree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Listline, Member, MemberId, Money, TimeMs};
use crate::engine::forest::ReferralForest;

/// A payment received as position 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub listline_id: Uuid,
    pub from_name: String,
    pub gross: Money,
    pub net: Money,
    pub at: TimeMs,
}

/// Per-member listline position occurrence counts and received payments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionCounts {
    pub position1: u64,
    pub position2: u64,
    pub position3: u64,
    pub position4: u64,
    pub payments: Vec<PaymentRecord>,
}

/// Derived read-model over the listline log and forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    positions: HashMap<MemberId, PositionCounts>,
    recruits: HashMap<MemberId, Vec<MemberId>>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly inserted member under its referrer.
    pub fn record_member(&mut self, member: &Member) {
        if member.is_system {
            return;
        }
        if let Some(referrer) = &member.referrer_id {
            self.recruits
                .entry(referrer.clone())
                .or_default()
                .push(member.id.clone());
        }
    }

    /// Fold one listline record into the position counts.
    pub fn record_listline(&mut self, listline: &Listline) {
        let positions = &listline.positions;
        if !positions.position1.is_system() {
            let entry = self.positions.entry(positions.position1.clone()).or_default();
            entry.position1 += 1;
            entry.payments.push(PaymentRecord {
                listline_id: listline.id,
                from_name: listline.member_name.clone(),
                gross: listline.gross,
                net: listline.net,
                at: listline.created_at,
            });
        }
        if !positions.position2.is_system() {
            self.positions
                .entry(positions.position2.clone())
                .or_default()
                .position2 += 1;
        }
        if !positions.position3.is_system() {
            self.positions
                .entry(positions.position3.clone())
                .or_default()
                .position3 += 1;
        }
        if !positions.position4.is_system() {
            self.positions
                .entry(positions.position4.clone())
                .or_default()
                .position4 += 1;
        }
    }

    /// Track a confirmed successor move from one recruit list to another.
    pub fn record_reparent(
        &mut self,
        member_id: &MemberId,
        old_parent: &MemberId,
        new_parent: &MemberId,
    ) {
        if let Some(list) = self.recruits.get_mut(old_parent) {
            list.retain(|id| id != member_id);
        }
        self.recruits
            .entry(new_parent.clone())
            .or_default()
            .push(member_id.clone());
    }

    /// Position counts for a member (zeroes if it never appeared).
    pub fn positions(&self, member_id: &MemberId) -> PositionCounts {
        self.positions.get(member_id).cloned().unwrap_or_default()
    }

    /// Direct recruit ids of a member, oldest first.
    pub fn recruits(&self, member_id: &MemberId) -> &[MemberId] {
        self.recruits
            .get(member_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Reconstruct the whole index from the forest and listline log.
    ///
    /// The incremental index must compare equal to this (recruit lists up to
    /// ordering, which re-parenting permutes).
    pub fn rebuild(forest: &ReferralForest, listlines: &[Listline]) -> Self {
        let mut index = Self::new();
        for member in forest.real_members() {
            index.record_member(member);
        }
        for listline in listlines {
            index.record_listline(listline);
        }
        index
    }

    /// The position-count side of the index, for consistency checks.
    pub fn position_counts(&self) -> &HashMap<MemberId, PositionCounts> {
        &self.positions
    }

    /// Recruit lists with deterministic ordering, for consistency checks.
    pub fn recruits_sorted(&self) -> HashMap<MemberId, Vec<MemberId>> {
        self.recruits
            .iter()
            .map(|(k, v)| {
                let mut v = v.clone();
                v.sort();
                (k.clone(), v)
            })
            .filter(|(_, v)| !v.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListlinePositions;

    fn listline(member: &str, p1: &str, p2: &str, p3: &str) -> Listline {
        Listline {
            id: Uuid::new_v4(),
            member_id: MemberId::new(member),
            member_name: member.to_uppercase(),
            positions: ListlinePositions {
                position1: MemberId::new(p1),
                position2: MemberId::new(p2),
                position3: MemberId::new(p3),
                position4: MemberId::new(member),
            },
            recipient_name: p1.to_uppercase(),
            gross: Money::from_major(10),
            net: Money::from_str_canonical("9").unwrap(),
            created_at: TimeMs::new(1),
        }
    }

    #[test]
    fn test_system_positions_are_not_indexed() {
        let mut index = PositionIndex::new();
        index.record_listline(&listline("d", "system", "system", "c"));

        assert!(index.position_counts().get(&MemberId::system()).is_none());
        assert_eq!(index.positions(&MemberId::new("c")).position3, 1);
        assert_eq!(index.positions(&MemberId::new("d")).position4, 1);
    }

    #[test]
    fn test_position1_records_payment() {
        let mut index = PositionIndex::new();
        index.record_listline(&listline("d", "a", "b", "c"));

        let counts = index.positions(&MemberId::new("a"));
        assert_eq!(counts.position1, 1);
        assert_eq!(counts.payments.len(), 1);
        assert_eq!(counts.payments[0].from_name, "D");
        assert_eq!(counts.payments[0].net, Money::from_str_canonical("9").unwrap());
    }

    #[test]
    fn test_reparent_moves_recruit() {
        let mut index = PositionIndex::new();
        let member = Member::new(
            MemberId::new("c"),
            "C",
            MemberId::new("b"),
            true,
            TimeMs::new(0),
        );
        index.record_member(&member);
        assert_eq!(index.recruits(&MemberId::new("b")), &[MemberId::new("c")]);

        index.record_reparent(&MemberId::new("c"), &MemberId::new("b"), &MemberId::new("a"));
        assert!(index.recruits(&MemberId::new("b")).is_empty());
        assert_eq!(index.recruits(&MemberId::new("a")), &[MemberId::new("c")]);
    }
}
