//! Sequence-based successor lottery.
//!
//! Every qualifying deposit draws a uniform sequence number in
//! `[1, successor_sequence_max]`. When the referrer's Nth depositing recruit
//! draws sequence N, that recruit is proposed as the referrer's successor, to
//! be re-attached under the referrer's position-1 ancestor once an external
//! actor confirms. Each member is granted at most one nomination per run, and
//! the lottery never fires for the system account.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{Member, MemberId, NominationId, TimeMs};
use crate::error::EngineError;

/// Lifecycle of a nomination after it is proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NominationState {
    Proposed,
    Confirmed,
    Declined,
}

/// A successor nomination produced by the lottery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomination {
    pub id: NominationId,
    /// The member whose depositing-recruit count triggered the draw.
    pub nominator: MemberId,
    /// The most recently depositing recruit, proposed for promotion.
    pub successor: MemberId,
    /// The nominator's position-1 ancestor; the successor's parent on confirm.
    pub new_parent: MemberId,
    /// The drawn sequence number.
    pub sequence: u32,
    /// The depositing-recruit count it matched.
    pub position: u32,
    pub state: NominationState,
    pub proposed_at: TimeMs,
    pub resolved_at: Option<TimeMs>,
}

/// Outcome of a lottery draw that qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub nomination_id: NominationId,
    pub sequence: u32,
    pub position: u32,
}

/// Book of nominations for one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NominationBook {
    nominations: HashMap<NominationId, Nomination>,
    order: Vec<NominationId>,
    confirmed_count: u64,
}

impl NominationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the lottery for one deposit.
    ///
    /// `referrer` is the depositor's direct referrer after its
    /// depositing-recruit count was bumped; `position1` the deposit's payee
    /// slot. Returns a proposal only when the sequence draw matches and the
    /// referrer is a real, never-nominated member with a real position-1
    /// ancestor to move the successor under.
    pub fn evaluate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        referrer: &Member,
        successor: &MemberId,
        position1: &MemberId,
        sequence_max: u32,
        at: TimeMs,
    ) -> Option<Proposal> {
        if referrer.is_system || referrer.successor_nominated || position1.is_system() {
            return None;
        }
        let position = referrer.depositing_recruits;
        if position < 1 || position > sequence_max {
            return None;
        }
        let sequence = rng.gen_range(1..=sequence_max);
        if sequence != position {
            return None;
        }

        let id = NominationId::random();
        self.nominations.insert(
            id.clone(),
            Nomination {
                id: id.clone(),
                nominator: referrer.id.clone(),
                successor: successor.clone(),
                new_parent: position1.clone(),
                sequence,
                position,
                state: NominationState::Proposed,
                proposed_at: at,
                resolved_at: None,
            },
        );
        self.order.push(id.clone());
        Some(Proposal {
            nomination_id: id,
            sequence,
            position,
        })
    }

    /// Mark a proposed nomination confirmed. State is unchanged on failure.
    pub fn confirm(&mut self, id: &NominationId, at: TimeMs) -> Result<Nomination, EngineError> {
        let nomination = self.require_proposed(id)?;
        nomination.state = NominationState::Confirmed;
        nomination.resolved_at = Some(at);
        let confirmed = nomination.clone();
        self.confirmed_count += 1;
        Ok(confirmed)
    }

    /// Mark a proposed nomination declined. No automatic retry follows.
    pub fn decline(&mut self, id: &NominationId, at: TimeMs) -> Result<Nomination, EngineError> {
        let nomination = self.require_proposed(id)?;
        nomination.state = NominationState::Declined;
        nomination.resolved_at = Some(at);
        Ok(nomination.clone())
    }

    fn require_proposed(&mut self, id: &NominationId) -> Result<&mut Nomination, EngineError> {
        let nomination = self
            .nominations
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownNomination(id.clone()))?;
        if nomination.state != NominationState::Proposed {
            return Err(EngineError::NominationConflict(id.clone()));
        }
        Ok(nomination)
    }

    /// Look up a nomination.
    pub fn get(&self, id: &NominationId) -> Option<&Nomination> {
        self.nominations.get(id)
    }

    /// All nominations in proposal order.
    pub fn all(&self) -> impl Iterator<Item = &Nomination> {
        self.order.iter().filter_map(|id| self.nominations.get(id))
    }

    /// Number of confirmed nominations this run.
    pub fn confirmed_count(&self) -> u64 {
        self.confirmed_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn referrer(depositing_recruits: u32, nominated: bool) -> Member {
        let mut m = Member::new(
            MemberId::new("ref"),
            "Ref",
            MemberId::system(),
            true,
            TimeMs::new(0),
        );
        m.depositing_recruits = depositing_recruits;
        m.successor_nominated = nominated;
        m
    }

    #[test]
    fn test_never_fires_for_system() {
        let mut book = NominationBook::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let system = Member::system();
        for _ in 0..100 {
            let proposal = book.evaluate(
                &mut rng,
                &system,
                &MemberId::new("s"),
                &MemberId::new("p"),
                4,
                TimeMs::new(0),
            );
            assert!(proposal.is_none());
        }
    }

    #[test]
    fn test_never_fires_without_real_position1() {
        let mut book = NominationBook::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let proposal = book.evaluate(
                &mut rng,
                &referrer(1, false),
                &MemberId::new("s"),
                &MemberId::system(),
                4,
                TimeMs::new(0),
            );
            assert!(proposal.is_none());
        }
    }

    #[test]
    fn test_never_fires_past_sequence_max() {
        let mut book = NominationBook::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let proposal = book.evaluate(
                &mut rng,
                &referrer(5, false),
                &MemberId::new("s"),
                &MemberId::new("p"),
                4,
                TimeMs::new(0),
            );
            assert!(proposal.is_none());
        }
    }

    #[test]
    fn test_nominated_referrer_is_skipped() {
        let mut book = NominationBook::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let proposal = book.evaluate(
                &mut rng,
                &referrer(1, true),
                &MemberId::new("s"),
                &MemberId::new("p"),
                4,
                TimeMs::new(0),
            );
            assert!(proposal.is_none());
        }
    }

    #[test]
    fn test_sequence_match_proposes() {
        let mut book = NominationBook::new();
        // StepRng yields a constant stream; gen_range(1..=1) is always 1.
        let mut rng = StepRng::new(0, 0);
        let proposal = book
            .evaluate(
                &mut rng,
                &referrer(1, false),
                &MemberId::new("s"),
                &MemberId::new("p"),
                1,
                TimeMs::new(7),
            )
            .expect("must propose with k == 1 and N == 1");
        assert_eq!(proposal.position, 1);
        assert_eq!(proposal.sequence, 1);

        let nomination = book.get(&proposal.nomination_id).unwrap();
        assert_eq!(nomination.state, NominationState::Proposed);
        assert_eq!(nomination.new_parent, MemberId::new("p"));
    }

    #[test]
    fn test_confirm_then_confirm_conflicts() {
        let mut book = NominationBook::new();
        let mut rng = StepRng::new(0, 0);
        let proposal = book
            .evaluate(
                &mut rng,
                &referrer(1, false),
                &MemberId::new("s"),
                &MemberId::new("p"),
                1,
                TimeMs::new(7),
            )
            .unwrap();

        let confirmed = book.confirm(&proposal.nomination_id, TimeMs::new(8)).unwrap();
        assert_eq!(confirmed.state, NominationState::Confirmed);
        assert_eq!(book.confirmed_count(), 1);

        let err = book
            .confirm(&proposal.nomination_id, TimeMs::new(9))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::NominationConflict(proposal.nomination_id.clone())
        );
    }

    #[test]
    fn test_decline_keeps_confirmed_count() {
        let mut book = NominationBook::new();
        let mut rng = StepRng::new(0, 0);
        let proposal = book
            .evaluate(
                &mut rng,
                &referrer(1, false),
                &MemberId::new("s"),
                &MemberId::new("p"),
                1,
                TimeMs::new(7),
            )
            .unwrap();

        let declined = book.decline(&proposal.nomination_id, TimeMs::new(8)).unwrap();
        assert_eq!(declined.state, NominationState::Declined);
        assert_eq!(book.confirmed_count(), 0);
    }

    #[test]
    fn test_unknown_nomination() {
        let mut book = NominationBook::new();
        let id = NominationId::new("ghost");
        assert_eq!(
            book.confirm(&id, TimeMs::new(0)).unwrap_err(),
            EngineError::UnknownNomination(id)
        );
    }
}
