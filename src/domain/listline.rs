//! Listline records: the four-position ancestor snapshot taken at deposit time.

use crate::domain::{Money, MemberId, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four resolved listline positions for one deposit.
///
/// position1 is the 3rd ancestor (the payee), position2 the 2nd, position3
/// the direct referrer, position4 the depositor itself. Ancestors past the
/// forest root resolve to the system account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListlinePositions {
    pub position1: MemberId,
    pub position2: MemberId,
    pub position3: MemberId,
    pub position4: MemberId,
}

/// An immutable, append-only listline record.
///
/// Carries both the gross deposit and the net payout so the split is
/// auditable without re-deriving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listline {
    pub id: Uuid,
    pub member_id: MemberId,
    pub member_name: String,
    #[serde(flatten)]
    pub positions: ListlinePositions,
    pub recipient_name: String,
    pub gross: Money,
    pub net: Money,
    pub created_at: TimeMs,
}

impl Listline {
    /// Returns true if the payee slot resolved to the system account.
    pub fn pays_system(&self) -> bool {
        self.positions.position1.is_system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> ListlinePositions {
        ListlinePositions {
            position1: MemberId::system(),
            position2: MemberId::system(),
            position3: MemberId::new("a"),
            position4: MemberId::new("b"),
        }
    }

    #[test]
    fn test_pays_system() {
        let ll = Listline {
            id: Uuid::new_v4(),
            member_id: MemberId::new("b"),
            member_name: "Bob".to_string(),
            positions: positions(),
            recipient_name: "SYSTEM".to_string(),
            gross: Money::from_major(10),
            net: Money::from_str_canonical("9").unwrap(),
            created_at: TimeMs::new(1),
        };
        assert!(ll.pays_system());
    }

    #[test]
    fn test_serializes_positions_flat() {
        let ll = Listline {
            id: Uuid::new_v4(),
            member_id: MemberId::new("b"),
            member_name: "Bob".to_string(),
            positions: positions(),
            recipient_name: "SYSTEM".to_string(),
            gross: Money::from_major(10),
            net: Money::from_str_canonical("9").unwrap(),
            created_at: TimeMs::new(1),
        };
        let json = serde_json::to_value(&ll).unwrap();
        assert_eq!(json["position1"], "system");
        assert_eq!(json["position4"], "b");
    }
}
