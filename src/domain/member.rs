//! Member ledger entity.

use crate::domain::{Money, MemberId, TimeMs};
use serde::{Deserialize, Serialize};

/// Per-member referral link analytics, bumped by the view/registration/deposit
/// tick branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub views: u64,
    pub clicks: u64,
    pub registrations: u64,
    pub deposits: u64,
}

/// A member of the referral forest.
///
/// Exactly one member per engine run has `referrer_id == None`: the system
/// account. Every other member's referrer resolves to an existing member,
/// which makes the forest acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub referrer_id: Option<MemberId>,
    pub balance: Money,
    pub total_earnings: Money,
    pub direct_recruits: u32,
    pub depositing_recruits: u32,
    pub has_deposited: bool,
    pub is_verified: bool,
    pub successor_nominated: bool,
    pub successor_id: Option<MemberId>,
    pub is_system: bool,
    pub created_at: TimeMs,
    pub stats: LinkStats,
}

impl Member {
    /// Create a fresh non-system member under the given referrer.
    pub fn new(
        id: MemberId,
        name: impl Into<String>,
        referrer_id: MemberId,
        is_verified: bool,
        created_at: TimeMs,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            referrer_id: Some(referrer_id),
            balance: Money::zero(),
            total_earnings: Money::zero(),
            direct_recruits: 0,
            depositing_recruits: 0,
            has_deposited: false,
            is_verified,
            successor_nominated: false,
            successor_id: None,
            is_system: false,
            created_at,
            stats: LinkStats::default(),
        }
    }

    /// The singleton system account, the forest root.
    ///
    /// Created at time 0 so a reset engine compares equal to a fresh one.
    pub fn system() -> Self {
        Self {
            id: MemberId::system(),
            name: "SYSTEM".to_string(),
            referrer_id: None,
            balance: Money::zero(),
            total_earnings: Money::zero(),
            direct_recruits: 0,
            depositing_recruits: 0,
            has_deposited: true,
            is_verified: true,
            successor_nominated: false,
            successor_id: None,
            is_system: true,
            created_at: TimeMs::new(0),
            stats: LinkStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_member_is_root() {
        let system = Member::system();
        assert!(system.is_system);
        assert!(system.referrer_id.is_none());
        assert!(system.has_deposited);
        assert_eq!(system.created_at, TimeMs::new(0));
    }

    #[test]
    fn test_new_member_starts_clean() {
        let m = Member::new(
            MemberId::new("m1"),
            "Alice",
            MemberId::system(),
            true,
            TimeMs::new(5),
        );
        assert!(!m.has_deposited);
        assert!(!m.is_system);
        assert_eq!(m.referrer_id, Some(MemberId::system()));
        assert_eq!(m.balance, Money::zero());
        assert_eq!(m.stats, LinkStats::default());
    }
}
