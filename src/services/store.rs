//! Record store abstraction
//!
//! Every lifecycle operation runs inside one [`StoreTx`]. A transaction sees
//! its own writes, becomes visible to others only on [`StoreTx::commit`], and
//! is rolled back when dropped without committing.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Group, GroupMembership, GroupRole, MatchRecord, MatchStatus, Profile, User};

/// Errors that can occur when talking to the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// A store that can open atomic units of work
#[allow(async_fn_in_trait)]
pub trait RecordStore: Send + Sync + 'static {
    type Tx: StoreTx;

    /// Open a new transaction
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Cheap liveness probe
    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Operations available inside a transaction
#[allow(async_fn_in_trait)]
pub trait StoreTx {
    // Users

    async fn get_user(&mut self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError>;

    // Profiles

    async fn get_profile(&mut self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError>;

    /// Users other than `requester` whose profile allows matching and is public
    async fn find_discoverable(&mut self, requester: Uuid)
        -> Result<Vec<(User, Profile)>, StoreError>;

    // Match records

    /// Serialize concurrent writers on the unordered pair {a, b} until commit
    async fn lock_pair(&mut self, a: Uuid, b: Uuid) -> Result<(), StoreError>;

    /// The record between `a` and `b`, in either direction
    async fn find_match_between(
        &mut self,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<MatchRecord>, StoreError>;

    /// Every user sharing a record with `user_id`, any direction or status
    async fn find_counterparties(&mut self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError>;

    /// Records touching `user_id` with the given status
    async fn find_matches_for(
        &mut self,
        user_id: Uuid,
        status: MatchStatus,
    ) -> Result<Vec<MatchRecord>, StoreError>;

    async fn insert_match(&mut self, record: &MatchRecord) -> Result<(), StoreError>;

    async fn update_match(&mut self, record: &MatchRecord) -> Result<(), StoreError>;

    // Groups

    /// Fetch a group and hold it against concurrent membership changes
    async fn lock_group(&mut self, id: Uuid) -> Result<Option<Group>, StoreError>;

    async fn get_group(&mut self, id: Uuid) -> Result<Option<Group>, StoreError>;

    async fn find_groups(&mut self) -> Result<Vec<Group>, StoreError>;

    async fn insert_group(&mut self, group: &Group) -> Result<(), StoreError>;

    /// Delete a group together with its memberships
    async fn delete_group(&mut self, id: Uuid) -> Result<(), StoreError>;

    async fn get_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>, StoreError>;

    /// Memberships of a group, earliest joined first
    async fn find_members(&mut self, group_id: Uuid) -> Result<Vec<GroupMembership>, StoreError>;

    /// Memberships of a user, earliest joined first
    async fn find_memberships_of(
        &mut self,
        user_id: Uuid,
    ) -> Result<Vec<GroupMembership>, StoreError>;

    async fn insert_membership(&mut self, membership: &GroupMembership)
        -> Result<(), StoreError>;

    async fn update_membership_role(&mut self, id: Uuid, role: GroupRole)
        -> Result<(), StoreError>;

    async fn delete_membership(&mut self, id: Uuid) -> Result<(), StoreError>;

    /// Make every write of this transaction visible
    async fn commit(self) -> Result<(), StoreError>;
}

/// Stable advisory-lock key for an unordered pair of users
pub fn pair_lock_key(a: Uuid, b: Uuid) -> i64 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let (l1, l2) = low.as_u64_pair();
    let (h1, h2) = high.as_u64_pair();
    (l1 ^ l2.rotate_left(17) ^ h1.rotate_left(31) ^ h2.rotate_left(47)) as i64
}
