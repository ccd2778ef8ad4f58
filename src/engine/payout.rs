//! Pure listline resolution and deposit splitting.

use rust_decimal::Decimal;

use crate::domain::{ListlinePositions, MemberId, Money};
use crate::engine::forest::ReferralForest;
use crate::error::EngineError;

/// Resolve the four listline positions for a member.
///
/// Uses a three-ancestor walk: position3 is the direct referrer, position2
/// the 2nd ancestor, position1 the 3rd (the payee). Missing ancestors resolve
/// to the system account; position4 is the member itself.
pub fn compute_listline(
    member_id: &MemberId,
    forest: &ReferralForest,
) -> Result<ListlinePositions, EngineError> {
    forest.require(member_id)?;
    let upline = forest.upline_chain(member_id, 3);
    let slot = |i: usize| upline.get(i).cloned().unwrap_or_else(MemberId::system);
    Ok(ListlinePositions {
        position1: slot(2),
        position2: slot(1),
        position3: slot(0),
        position4: member_id.clone(),
    })
}

/// The two halves of a split deposit. `net + fee == gross` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositSplit {
    /// Paid to position1 (retained by the system when position1 is system).
    pub net: Money,
    /// Retained by the system account unconditionally.
    pub fee: Money,
}

/// Split a gross deposit by the maintenance fee rate.
///
/// The net side is rounded to 2 decimal places exactly once; the fee is the
/// remainder, so the split reassembles to the gross amount without drift.
pub fn split_deposit(gross: Money, maintenance_fee_rate: Decimal) -> DepositSplit {
    let net = Money::new(gross.inner() * (Decimal::ONE - maintenance_fee_rate)).round_2();
    let fee = gross - net;
    DepositSplit { net, fee }
}
