//! The referral forest: members linked by referrer relation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{LinkStats, Member, MemberId, TimeMs};
use crate::error::EngineError;

/// Mutable tree of members rooted at the system account.
///
/// Referrers must exist before their recruits are inserted, so the structure
/// is acyclic by construction. Iteration order is insertion order, which keeps
/// random selections reproducible under a seeded RNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralForest {
    members: HashMap<MemberId, Member>,
    order: Vec<MemberId>,
}

impl ReferralForest {
    /// A forest containing only the system account.
    pub fn new() -> Self {
        let system = Member::system();
        let mut members = HashMap::new();
        let order = vec![system.id.clone()];
        members.insert(system.id.clone(), system);
        Self { members, order }
    }

    /// Insert a new member under an existing referrer.
    ///
    /// Bumps the referrer's direct-recruit count. Fails with
    /// [`EngineError::UnknownReferrer`] before any state changes.
    pub fn insert_member(
        &mut self,
        id: MemberId,
        name: impl Into<String>,
        referrer_id: MemberId,
        is_verified: bool,
        created_at: TimeMs,
    ) -> Result<&Member, EngineError> {
        if !self.members.contains_key(&referrer_id) {
            return Err(EngineError::UnknownReferrer(referrer_id));
        }

        let member = Member::new(id.clone(), name, referrer_id.clone(), is_verified, created_at);
        if let Some(referrer) = self.members.get_mut(&referrer_id) {
            referrer.direct_recruits += 1;
        }
        self.members.insert(id.clone(), member);
        self.order.push(id.clone());
        Ok(&self.members[&id])
    }

    /// Look up a member.
    pub fn get(&self, id: &MemberId) -> Option<&Member> {
        self.members.get(id)
    }

    /// Look up a member mutably.
    pub fn get_mut(&mut self, id: &MemberId) -> Option<&mut Member> {
        self.members.get_mut(id)
    }

    /// Look up a member, failing with [`EngineError::UnknownMember`].
    pub fn require(&self, id: &MemberId) -> Result<&Member, EngineError> {
        self.members
            .get(id)
            .ok_or_else(|| EngineError::UnknownMember(id.clone()))
    }

    /// Display name for an id, falling back to the system label.
    pub fn name_of(&self, id: &MemberId) -> String {
        self.members
            .get(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "SYSTEM".to_string())
    }

    /// Walk up to `depth` ancestors of a member, nearest first.
    ///
    /// Stops at the forest root; a short list is valid and means the missing
    /// slots resolve to the system account. O(depth), not O(forest size).
    pub fn upline_chain(&self, member_id: &MemberId, depth: usize) -> Vec<MemberId> {
        let mut chain = Vec::with_capacity(depth);
        let mut current = member_id.clone();
        for _ in 0..depth {
            let Some(member) = self.members.get(&current) else {
                break;
            };
            let Some(referrer) = member.referrer_id.clone() else {
                break;
            };
            chain.push(referrer.clone());
            current = referrer;
        }
        chain
    }

    /// Distance from the forest root (the system account is depth 0).
    pub fn depth(&self, member_id: &MemberId) -> usize {
        let mut depth = 0;
        let mut current = member_id.clone();
        while let Some(member) = self.members.get(&current) {
            match &member.referrer_id {
                Some(referrer) => {
                    depth += 1;
                    current = referrer.clone();
                }
                None => break,
            }
        }
        depth
    }

    /// Move a member under a new parent, adjusting recruit counters.
    ///
    /// Rejects moves that would orphan the subtree (the new parent being a
    /// descendant of the member, or the member itself). State is unchanged on
    /// failure.
    pub fn reparent(
        &mut self,
        member_id: &MemberId,
        new_parent_id: &MemberId,
    ) -> Result<(), EngineError> {
        let member = self.require(member_id)?;
        let old_parent_id = member
            .referrer_id
            .clone()
            .ok_or_else(|| EngineError::UnknownReferrer(member_id.clone()))?;
        self.require(new_parent_id)?;

        if new_parent_id == member_id
            || self
                .ancestor_path(new_parent_id)
                .contains(member_id)
        {
            return Err(EngineError::UnknownReferrer(new_parent_id.clone()));
        }

        if old_parent_id == *new_parent_id {
            return Ok(());
        }

        if let Some(old_parent) = self.members.get_mut(&old_parent_id) {
            old_parent.direct_recruits = old_parent.direct_recruits.saturating_sub(1);
        }
        if let Some(new_parent) = self.members.get_mut(new_parent_id) {
            new_parent.direct_recruits += 1;
        }
        if let Some(member) = self.members.get_mut(member_id) {
            member.referrer_id = Some(new_parent_id.clone());
        }
        Ok(())
    }

    fn ancestor_path(&self, id: &MemberId) -> Vec<MemberId> {
        self.upline_chain(id, self.members.len())
    }

    /// All members in insertion order, system account first.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.order.iter().filter_map(|id| self.members.get(id))
    }

    /// All non-system members in insertion order.
    pub fn real_members(&self) -> impl Iterator<Item = &Member> {
        self.members().filter(|m| !m.is_system)
    }

    /// Number of non-system members.
    pub fn real_member_count(&self) -> usize {
        self.members.len() - 1
    }

    /// Serializable nested view of the forest, starting from the system
    /// account's direct recruits.
    pub fn to_tree(&self) -> Vec<TreeNode> {
        let mut children: HashMap<&MemberId, Vec<&Member>> = HashMap::new();
        for member in self.real_members() {
            if let Some(referrer) = &member.referrer_id {
                children.entry(referrer).or_default().push(member);
            }
        }

        fn build(
            member: &Member,
            level: u32,
            children: &HashMap<&MemberId, Vec<&Member>>,
        ) -> TreeNode {
            TreeNode {
                id: member.id.clone(),
                name: member.name.clone(),
                paid: member.has_deposited,
                verified: member.is_verified,
                level,
                stats: member.stats,
                children: children
                    .get(&member.id)
                    .map(|kids| kids.iter().map(|k| build(k, level + 1, children)).collect())
                    .unwrap_or_default(),
            }
        }

        children
            .get(&MemberId::system())
            .map(|roots| roots.iter().map(|r| build(r, 1, &children)).collect())
            .unwrap_or_default()
    }
}

impl Default for ReferralForest {
    fn default() -> Self {
        Self::new()
    }
}

/// One node of the serialized referral tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: MemberId,
    pub name: String,
    pub paid: bool,
    pub verified: bool,
    /// Depth below the system account (direct recruits are level 1).
    pub level: u32,
    pub stats: LinkStats,
    pub children: Vec<TreeNode>,
}
