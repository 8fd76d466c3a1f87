use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{Group, GroupMembership, GroupRole, MatchRecord, MatchStatus, Profile, User};
use crate::services::store::{RecordStore, StoreError, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    matches: Vec<MatchRecord>,
    groups: HashMap<Uuid, Group>,
    memberships: Vec<GroupMembership>,
}

/// In-process record store
///
/// A transaction owns the store lock for its whole lifetime and works on a
/// private copy of the tables, so transactions are fully serialized and a
/// dropped transaction leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, as the auth service would
    pub async fn add_user(&self, username: &str) -> Result<User, StoreError> {
        let user = User::new(username);
        let mut tx = self.begin().await?;
        tx.insert_user(&user).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Number of match records, for assertions on the pair invariant
    pub async fn match_count(&self) -> usize {
        self.tables.lock().await.matches.len()
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl RecordStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

impl StoreTx for MemoryTx {
    async fn get_user(&mut self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        let taken = self
            .working
            .users
            .values()
            .any(|u| u.id == user.id || u.username == user.username);
        if taken {
            return Err(StoreError::UniqueViolation(format!("user {}", user.username)));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_profile(&mut self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.working.profiles.get(&user_id).cloned())
    }

    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        if self.working.profiles.contains_key(&profile.user_id) {
            return Err(StoreError::UniqueViolation(format!("profile for {}", profile.user_id)));
        }
        self.working.profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn find_discoverable(
        &mut self,
        requester: Uuid,
    ) -> Result<Vec<(User, Profile)>, StoreError> {
        let mut found: Vec<(User, Profile)> = self
            .working
            .profiles
            .values()
            .filter(|p| p.user_id != requester && p.allow_matching && !p.is_private)
            .filter_map(|p| {
                self.working
                    .users
                    .get(&p.user_id)
                    .map(|u| (u.clone(), p.clone()))
            })
            .collect();

        found.sort_by(|a, b| a.0.created_at.cmp(&b.0.created_at).then(a.0.id.cmp(&b.0.id)));
        Ok(found)
    }

    async fn lock_pair(&mut self, _a: Uuid, _b: Uuid) -> Result<(), StoreError> {
        // The transaction already holds the whole store
        Ok(())
    }

    async fn find_match_between(
        &mut self,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self.working.matches.iter().find(|m| m.connects(a, b)).cloned())
    }

    async fn find_counterparties(&mut self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError> {
        Ok(self
            .working
            .matches
            .iter()
            .filter(|m| m.involves(user_id))
            .map(|m| m.counterparty(user_id))
            .collect())
    }

    async fn find_matches_for(
        &mut self,
        user_id: Uuid,
        status: MatchStatus,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        Ok(self
            .working
            .matches
            .iter()
            .filter(|m| m.involves(user_id) && m.status == status)
            .cloned()
            .collect())
    }

    async fn insert_match(&mut self, record: &MatchRecord) -> Result<(), StoreError> {
        if self
            .working
            .matches
            .iter()
            .any(|m| m.connects(record.initiator_id, record.target_id))
        {
            return Err(StoreError::UniqueViolation(format!(
                "match between {} and {}",
                record.initiator_id, record.target_id
            )));
        }
        self.working.matches.push(record.clone());
        Ok(())
    }

    async fn update_match(&mut self, record: &MatchRecord) -> Result<(), StoreError> {
        let existing = self
            .working
            .matches
            .iter_mut()
            .find(|m| m.id == record.id)
            .ok_or_else(|| StoreError::NotFound(format!("match {}", record.id)))?;
        *existing = record.clone();
        Ok(())
    }

    async fn lock_group(&mut self, id: Uuid) -> Result<Option<Group>, StoreError> {
        self.get_group(id).await
    }

    async fn get_group(&mut self, id: Uuid) -> Result<Option<Group>, StoreError> {
        Ok(self.working.groups.get(&id).cloned())
    }

    async fn find_groups(&mut self) -> Result<Vec<Group>, StoreError> {
        let mut groups: Vec<Group> = self.working.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn insert_group(&mut self, group: &Group) -> Result<(), StoreError> {
        if self.working.groups.contains_key(&group.id) {
            return Err(StoreError::UniqueViolation(format!("group {}", group.id)));
        }
        self.working.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn delete_group(&mut self, id: Uuid) -> Result<(), StoreError> {
        if self.working.groups.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("group {}", id)));
        }
        self.working.memberships.retain(|m| m.group_id != id);
        Ok(())
    }

    async fn get_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>, StoreError> {
        Ok(self
            .working
            .memberships
            .iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_members(&mut self, group_id: Uuid) -> Result<Vec<GroupMembership>, StoreError> {
        let mut members: Vec<GroupMembership> = self
            .working
            .memberships
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        // Stable: insertion order breaks timestamp ties
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(members)
    }

    async fn find_memberships_of(
        &mut self,
        user_id: Uuid,
    ) -> Result<Vec<GroupMembership>, StoreError> {
        let mut memberships: Vec<GroupMembership> = self
            .working
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(memberships)
    }

    async fn insert_membership(
        &mut self,
        membership: &GroupMembership,
    ) -> Result<(), StoreError> {
        if !self.working.groups.contains_key(&membership.group_id) {
            return Err(StoreError::NotFound(format!("group {}", membership.group_id)));
        }
        if self
            .working
            .memberships
            .iter()
            .any(|m| m.group_id == membership.group_id && m.user_id == membership.user_id)
        {
            return Err(StoreError::UniqueViolation(format!(
                "membership of {} in {}",
                membership.user_id, membership.group_id
            )));
        }
        self.working.memberships.push(membership.clone());
        Ok(())
    }

    async fn update_membership_role(
        &mut self,
        id: Uuid,
        role: GroupRole,
    ) -> Result<(), StoreError> {
        let membership = self
            .working
            .memberships
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("membership {}", id)))?;
        membership.role = role;
        Ok(())
    }

    async fn delete_membership(&mut self, id: Uuid) -> Result<(), StoreError> {
        let before = self.working.memberships.len();
        self.working.memberships.retain(|m| m.id != id);
        if self.working.memberships.len() == before {
            return Err(StoreError::NotFound(format!("membership {}", id)));
        }
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}
