//! The tick-driven simulation engine.
//!
//! One engine instance owns the whole ledger: forest, listline log, position
//! index, nomination book, event log, and history series. Exactly one weighted
//! random action happens per tick; readers only ever see state between ticks.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{ConfigError, SimConfig};
use crate::domain::{
    EventBody, HistoryPoint, LedgerEvent, Listline, Member, MemberId, Money, NominationId,
    Severity, TimeMs,
};
use crate::engine::aggregator::{Aggregator, Totals};
use crate::engine::forest::{ReferralForest, TreeNode};
use crate::engine::index::{PositionCounts, PositionIndex};
use crate::engine::lottery::{Nomination, NominationBook, NominationState};
use crate::engine::payout::{compute_listline, split_deposit};
use crate::engine::{AggregateLinkStats, EventLog};
use crate::error::EngineError;

/// Bounded pool of member display names. Once exhausted, names repeat with a
/// numeric suffix.
const NAME_POOL: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack", "Kate",
    "Leo", "Mia", "Nick", "Olivia", "Pete", "Quinn", "Rose", "Sam", "Tina", "Uma", "Victor",
    "Wendy", "Xavier", "Yuki", "Zara",
];

fn generate_name(index: usize) -> String {
    let name = NAME_POOL[index % NAME_POOL.len()];
    let round = index / NAME_POOL.len();
    if round == 0 {
        name.to_string()
    } else {
        format!("{}{}", name, round + 1)
    }
}

/// Which branch a tick took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TickAction {
    View,
    Registration,
    Deposit,
    /// The deposit branch was drawn but no undeposited member existed.
    Idle,
}

/// The simulation and ledger engine.
pub struct Engine {
    config: SimConfig,
    forest: ReferralForest,
    index: PositionIndex,
    listlines: Vec<Listline>,
    events: EventLog,
    aggregator: Aggregator,
    nominations: NominationBook,
    link_stats: AggregateLinkStats,
    system_balance: Money,
    total_revenue: Money,
    tick: u64,
    name_index: usize,
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tick", &self.tick)
            .field("members", &self.forest.real_member_count())
            .field("listlines", &self.listlines.len())
            .finish()
    }
}

impl Engine {
    /// Build an engine from validated configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = Self::make_rng(config.seed);
        Ok(Self {
            forest: ReferralForest::new(),
            index: PositionIndex::new(),
            listlines: Vec::new(),
            events: EventLog::new(config.event_log_cap),
            aggregator: Aggregator::new(config.snapshot_every, config.history_cap),
            nominations: NominationBook::new(),
            link_stats: AggregateLinkStats::default(),
            system_balance: Money::zero(),
            total_revenue: Money::zero(),
            tick: 0,
            name_index: 0,
            rng,
            config,
        })
    }

    fn make_rng(seed: Option<u64>) -> Box<dyn RngCore + Send> {
        match seed {
            Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        }
    }

    /// Discard all state and reinitialize with only the system account.
    ///
    /// A reset engine compares equal (snapshot-wise) to a freshly constructed
    /// one with the same configuration.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        self.forest = ReferralForest::new();
        self.index = PositionIndex::new();
        self.listlines.clear();
        self.events = EventLog::new(config.event_log_cap);
        self.aggregator = Aggregator::new(config.snapshot_every, config.history_cap);
        self.nominations = NominationBook::new();
        self.link_stats = AggregateLinkStats::default();
        self.system_balance = Money::zero();
        self.total_revenue = Money::zero();
        self.tick = 0;
        self.name_index = 0;
        self.rng = Self::make_rng(config.seed);
    }

    /// Advance one tick: draw a weighted action, apply it, snapshot on
    /// cadence. Never fails; ticks with no eligible target degrade to no-ops.
    pub fn step(&mut self) -> TickAction {
        self.tick += 1;
        let draw: f64 = self.rng.gen();
        let action = if draw < self.config.view_weight {
            self.tick_view()
        } else if draw < self.config.view_weight + self.config.conversion_rate {
            self.tick_registration()
        } else {
            self.tick_deposit()
        };

        let totals = self.totals();
        self.aggregator.observe(self.tick, TimeMs::now(), &totals);
        action
    }

    fn tick_view(&mut self) -> TickAction {
        let count = self.rng.gen_range(1..=3u32);
        self.link_stats.total_views += count as u64;
        self.link_stats.unique_views += (count as f64 * 0.7).ceil() as u64;

        // Bump a random node no deeper than the listline reach.
        let candidates: Vec<MemberId> = self
            .forest
            .real_members()
            .map(|m| m.id.clone())
            .filter(|id| self.forest.depth(id) <= 3)
            .collect();
        if !candidates.is_empty() {
            let target = candidates[self.rng.gen_range(0..candidates.len())].clone();
            let views = self.rng.gen_range(1..=5u64);
            let click_rate: f64 = self.rng.gen_range(0.1..0.5);
            let clicks = (views as f64 * click_rate).floor() as u64;
            if let Some(member) = self.forest.get_mut(&target) {
                member.stats.views += views;
                member.stats.clicks += clicks;
            }
        }

        self.push_event(EventBody::View { count });
        TickAction::View
    }

    fn tick_registration(&mut self) -> TickAction {
        let parents: Vec<MemberId> = self
            .forest
            .real_members()
            .map(|m| m.id.clone())
            .filter(|id| self.forest.depth(id) <= 2)
            .collect();
        let referrer_id = if parents.is_empty() {
            MemberId::system()
        } else {
            parents[self.rng.gen_range(0..parents.len())].clone()
        };

        let verified = self.rng.gen_bool(self.config.verification_rate);
        let suspicious = self.rng.gen_bool(self.config.fraud_alert_rate);
        let member_id = self
            .insert_member_quiet(referrer_id.clone(), verified)
            .expect("registration referrer chosen from the forest");
        let member_name = self.forest.name_of(&member_id);

        let referrer_name = if referrer_id.is_system() {
            self.link_stats.registrations += 1;
            None
        } else {
            if let Some(referrer) = self.forest.get_mut(&referrer_id) {
                referrer.stats.registrations += 1;
            }
            Some(self.forest.name_of(&referrer_id))
        };

        self.push_event(EventBody::Registration {
            member_name: member_name.clone(),
            referrer_name,
        });
        if suspicious {
            self.push_event(EventBody::FraudAlert {
                member_name,
                severity: Severity::Medium,
            });
        }
        TickAction::Registration
    }

    fn tick_deposit(&mut self) -> TickAction {
        let pending: Vec<MemberId> = self
            .forest
            .real_members()
            .filter(|m| !m.has_deposited)
            .map(|m| m.id.clone())
            .collect();
        if pending.is_empty() {
            return TickAction::Idle;
        }
        let target = pending[self.rng.gen_range(0..pending.len())].clone();
        self.apply_deposit(&target)
            .expect("deposit target chosen from the forest");
        TickAction::Deposit
    }

    /// Insert a new member under the given referrer, with an auto-generated
    /// name from the bounded pool. Logs a member-created event; the simulated
    /// registration branch logs its own richer event instead.
    pub fn insert_member(
        &mut self,
        referrer_id: MemberId,
        is_verified: bool,
    ) -> Result<MemberId, EngineError> {
        let id = self.insert_member_quiet(referrer_id.clone(), is_verified)?;
        self.push_event(EventBody::MemberCreated {
            member_id: id.clone(),
            member_name: self.forest.name_of(&id),
            referrer_name: self.forest.name_of(&referrer_id),
        });
        Ok(id)
    }

    fn insert_member_quiet(
        &mut self,
        referrer_id: MemberId,
        is_verified: bool,
    ) -> Result<MemberId, EngineError> {
        let name = generate_name(self.name_index);
        let id = MemberId::random();
        let member = self
            .forest
            .insert_member(id.clone(), name, referrer_id, is_verified, TimeMs::now())?
            .clone();
        self.name_index += 1;
        self.index.record_member(&member);
        Ok(id)
    }

    /// Apply a fixed deposit for a member.
    ///
    /// Returns Ok(false) without touching state when the member has already
    /// deposited or is the system account; fails only for unknown ids.
    pub fn apply_deposit(&mut self, member_id: &MemberId) -> Result<bool, EngineError> {
        let member = self.forest.require(member_id)?.clone();
        if member.is_system || member.has_deposited {
            return Ok(false);
        }

        let positions = compute_listline(member_id, &self.forest)?;
        let gross = self.config.deposit_amount;
        let split = split_deposit(gross, self.config.maintenance_fee_rate);
        let now = TimeMs::now();

        if let Some(m) = self.forest.get_mut(member_id) {
            m.has_deposited = true;
        }

        // Net to position1, fee to the system; the system keeps the net too
        // when it occupies position1 itself.
        let recipient_name = if positions.position1.is_system() {
            self.system_balance += gross;
            "SYSTEM".to_string()
        } else {
            self.system_balance += split.fee;
            let recipient = self
                .forest
                .get_mut(&positions.position1)
                .expect("listline position resolved from the forest");
            recipient.balance += split.net;
            recipient.total_earnings += split.net;
            recipient.name.clone()
        };
        self.total_revenue += gross;

        let referrer_id = member.referrer_id.clone();
        if let Some(referrer_id) = &referrer_id {
            if referrer_id.is_system() {
                self.link_stats.total_deposits += 1;
            } else if let Some(referrer) = self.forest.get_mut(referrer_id) {
                referrer.depositing_recruits += 1;
                referrer.stats.deposits += 1;
            }
        }

        let listline = Listline {
            id: Uuid::new_v4(),
            member_id: member_id.clone(),
            member_name: member.name.clone(),
            positions: positions.clone(),
            recipient_name: recipient_name.clone(),
            gross,
            net: split.net,
            created_at: now,
        };
        self.index.record_listline(&listline);
        self.listlines.push(listline);

        self.push_event(EventBody::Deposit {
            member_id: member_id.clone(),
            member_name: member.name.clone(),
            recipient_name: recipient_name.clone(),
            gross,
        });
        if !positions.position1.is_system() {
            self.push_event(EventBody::Payment {
                recipient_id: positions.position1.clone(),
                recipient_name,
                from_name: member.name.clone(),
                net: split.net,
            });
        }

        if let Some(referrer_id) = referrer_id.filter(|id| !id.is_system()) {
            let referrer = self
                .forest
                .get(&referrer_id)
                .expect("depositor's referrer exists")
                .clone();
            let proposal = self.nominations.evaluate(
                &mut *self.rng,
                &referrer,
                member_id,
                &positions.position1,
                self.config.successor_sequence_max,
                now,
            );
            if let Some(proposal) = proposal {
                if let Some(r) = self.forest.get_mut(&referrer_id) {
                    r.successor_nominated = true;
                }
                self.push_event(EventBody::Successor {
                    nominator_name: referrer.name.clone(),
                    successor_name: member.name.clone(),
                    new_parent_name: self.forest.name_of(&positions.position1),
                    sequence: proposal.sequence,
                    position: proposal.position,
                });
                tracing::debug!(
                    nomination = %proposal.nomination_id,
                    nominator = %referrer.id,
                    "successor proposed"
                );
            }
        }

        Ok(true)
    }

    /// Confirm a proposed nomination: re-parent the successor (when enabled)
    /// and mark the nominator permanently. State is unchanged on failure.
    pub fn confirm_successor(&mut self, id: &NominationId) -> Result<Nomination, EngineError> {
        let nomination = self
            .nominations
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownNomination(id.clone()))?;
        if nomination.state != NominationState::Proposed {
            return Err(EngineError::NominationConflict(id.clone()));
        }

        if self.config.reparent_on_confirm {
            let old_parent = self
                .forest
                .require(&nomination.successor)?
                .referrer_id
                .clone()
                .ok_or_else(|| EngineError::UnknownMember(nomination.successor.clone()))?;
            self.forest
                .reparent(&nomination.successor, &nomination.new_parent)?;
            self.index
                .record_reparent(&nomination.successor, &old_parent, &nomination.new_parent);
        }

        let confirmed = self
            .nominations
            .confirm(id, TimeMs::now())
            .expect("nomination state checked above");
        if let Some(nominator) = self.forest.get_mut(&confirmed.nominator) {
            nominator.successor_id = Some(confirmed.successor.clone());
        }

        self.push_event(EventBody::Info {
            message: format!(
                "Successor confirmed: {} moved to {}'s network",
                self.forest.name_of(&confirmed.successor),
                self.forest.name_of(&confirmed.new_parent)
            ),
        });
        Ok(confirmed)
    }

    /// Decline a proposed nomination. The nominator's one grant stays spent;
    /// no automatic retry follows.
    pub fn decline_successor(&mut self, id: &NominationId) -> Result<Nomination, EngineError> {
        let declined = self.nominations.decline(id, TimeMs::now())?;
        self.push_event(EventBody::Info {
            message: format!(
                "Successor declined: {} stays in {}'s network",
                self.forest.name_of(&declined.successor),
                self.forest.name_of(&declined.nominator)
            ),
        });
        Ok(declined)
    }

    fn push_event(&mut self, body: EventBody) {
        self.events.push(LedgerEvent::new(TimeMs::now(), body));
    }

    fn totals(&self) -> Totals {
        let mut total = 0u64;
        let mut deposited = 0u64;
        let mut verified = 0u64;
        for member in self.forest.real_members() {
            total += 1;
            if member.has_deposited {
                deposited += 1;
            }
            if member.is_verified {
                verified += 1;
            }
        }
        Totals {
            total_members: total,
            deposited_members: deposited,
            verified_members: verified,
            total_revenue: self.total_revenue,
            system_balance: self.system_balance,
            successor_count: self.nominations.confirmed_count(),
            pending_members: total - deposited,
        }
    }

    // ------------------------------------------------------------------
    // Read accessors. External collaborators only ever get views or owned
    // snapshots, never a mutable handle.
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn forest(&self) -> &ReferralForest {
        &self.forest
    }

    pub fn position_index(&self) -> &PositionIndex {
        &self.index
    }

    pub fn listlines(&self) -> &[Listline] {
        &self.listlines
    }

    /// Events, most recent first, already bounded.
    pub fn events(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.events.iter()
    }

    /// History series, oldest first, already bounded.
    pub fn history(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.aggregator.series()
    }

    pub fn nominations(&self) -> impl Iterator<Item = &Nomination> {
        self.nominations.all()
    }

    pub fn link_stats(&self) -> AggregateLinkStats {
        self.link_stats
    }

    pub fn system_balance(&self) -> Money {
        self.system_balance
    }

    pub fn total_revenue(&self) -> Money {
        self.total_revenue
    }

    pub fn successor_count(&self) -> u64 {
        self.nominations.confirmed_count()
    }

    /// Position counts for one member.
    pub fn member_positions(&self, member_id: &MemberId) -> Result<PositionCounts, EngineError> {
        self.forest.require(member_id)?;
        Ok(self.index.positions(member_id))
    }

    /// The forest as a serializable tree.
    pub fn tree(&self) -> Vec<TreeNode> {
        self.forest.to_tree()
    }

    /// Full owned snapshot of the ledger, for API responses and equality
    /// checks in tests.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            tick: self.tick,
            members: self.forest.members().cloned().collect(),
            listlines: self.listlines.clone(),
            events: self.events.iter().cloned().collect(),
            history: self.aggregator.series().cloned().collect(),
            nominations: self.nominations.all().cloned().collect(),
            link_stats: self.link_stats,
            system_balance: self.system_balance,
            total_revenue: self.total_revenue,
            successor_count: self.nominations.confirmed_count(),
        }
    }
}

/// Owned, serializable view of the whole ledger between ticks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub tick: u64,
    pub members: Vec<Member>,
    pub listlines: Vec<Listline>,
    pub events: Vec<LedgerEvent>,
    pub history: Vec<HistoryPoint>,
    pub nominations: Vec<Nomination>,
    pub link_stats: AggregateLinkStats,
    pub system_balance: Money,
    pub total_revenue: Money,
    pub successor_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> Engine {
        Engine::new(SimConfig {
            seed: Some(seed),
            ..SimConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_generate_name_wraps_with_suffix() {
        assert_eq!(generate_name(0), "Alice");
        assert_eq!(generate_name(1), "Bob");
        assert_eq!(generate_name(NAME_POOL.len()), "Alice2");
        assert_eq!(generate_name(2 * NAME_POOL.len() + 1), "Bob3");
    }

    #[test]
    fn test_fresh_engine_has_only_system() {
        let engine = seeded(1);
        assert_eq!(engine.forest().real_member_count(), 0);
        assert!(engine.forest().get(&MemberId::system()).is_some());
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn test_step_is_deterministic_under_seed() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        let actions_a: Vec<_> = (0..200).map(|_| a.step()).collect();
        let actions_b: Vec<_> = (0..200).map(|_| b.step()).collect();
        assert_eq!(actions_a, actions_b);
        assert_eq!(
            a.forest().real_member_count(),
            b.forest().real_member_count()
        );
        assert_eq!(a.total_revenue(), b.total_revenue());
    }

    #[test]
    fn test_deposit_is_idempotent() {
        let mut engine = seeded(1);
        let id = engine.insert_member(MemberId::system(), true).unwrap();
        assert!(engine.apply_deposit(&id).unwrap());
        let revenue = engine.total_revenue();
        assert!(!engine.apply_deposit(&id).unwrap());
        assert_eq!(engine.total_revenue(), revenue);
    }

    #[test]
    fn test_deposit_unknown_member() {
        let mut engine = seeded(1);
        let err = engine.apply_deposit(&MemberId::new("ghost")).unwrap_err();
        assert_eq!(err, EngineError::UnknownMember(MemberId::new("ghost")));
    }

    #[test]
    fn test_system_deposit_is_noop() {
        let mut engine = seeded(1);
        assert!(!engine.apply_deposit(&MemberId::system()).unwrap());
        assert_eq!(engine.total_revenue(), Money::zero());
    }
}
