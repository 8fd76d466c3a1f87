use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::filters::matches_group_search;
use crate::error::{AppError, AppResult};
use crate::models::{
    Group, GroupDetail, GroupMemberView, GroupMembership, GroupRole, GroupSummary, MyGroup,
};
use crate::services::store::{RecordStore, StoreTx};

/// Group lifecycle: creation, membership and admin continuity
///
/// Every group with at least one member has at least one admin. When the
/// last admin leaves, the earliest-joined remaining member is promoted; when
/// the last member leaves, the group is deleted.
pub struct GroupService<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> GroupService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a group with `creator_id` as its first admin
    pub async fn create(
        &self,
        creator_id: Uuid,
        name: &str,
        description: Option<&str>,
        is_premium: bool,
    ) -> AppResult<GroupSummary> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Group name is required".to_string()));
        }

        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::trim).unwrap_or_default().to_string(),
            created_by: creator_id,
            is_premium_group: is_premium,
            created_at: Utc::now(),
        };

        let mut tx = self.store.begin().await?;

        if tx.get_user(creator_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tx.insert_group(&group).await?;
        tx.insert_membership(&GroupMembership::new(group.id, creator_id, GroupRole::Admin))
            .await?;
        tx.commit().await?;

        tracing::info!("User {} created group {} ({})", creator_id, group.id, group.name);

        Ok(GroupSummary::new(&group, 1))
    }

    pub async fn join(&self, user_id: Uuid, group_id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        if tx.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if tx.lock_group(group_id).await?.is_none() {
            return Err(AppError::NotFound("Group not found".to_string()));
        }

        if tx.get_membership(group_id, user_id).await?.is_some() {
            return Err(AppError::Conflict("Already a member of this group".to_string()));
        }

        tx.insert_membership(&GroupMembership::new(group_id, user_id, GroupRole::Member))
            .await?;
        tx.commit().await?;

        tracing::info!("User {} joined group {}", user_id, group_id);

        Ok(())
    }

    /// Leave a group, handing over admin rights or deleting it as needed
    pub async fn leave(&self, user_id: Uuid, group_id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        if tx.lock_group(group_id).await?.is_none() {
            return Err(AppError::NotFound("Group not found".to_string()));
        }

        let membership = tx
            .get_membership(group_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Not a member of this group".to_string()))?;

        let others: Vec<GroupMembership> = tx
            .find_members(group_id)
            .await?
            .into_iter()
            .filter(|m| m.user_id != user_id)
            .collect();

        if others.is_empty() {
            tx.delete_group(group_id).await?;
            tx.commit().await?;
            tracing::info!("Group {} deleted after its last member {} left", group_id, user_id);
            return Ok(());
        }

        let admins_left = others.iter().any(|m| m.role == GroupRole::Admin);
        if membership.role == GroupRole::Admin && !admins_left {
            let successor = &others[0];
            tx.update_membership_role(successor.id, GroupRole::Admin)
                .await?;
            tracing::info!(
                "Promoted {} to admin of group {} after {} left",
                successor.user_id,
                group_id,
                user_id
            );
        }

        tx.delete_membership(membership.id).await?;
        tx.commit().await?;

        tracing::info!("User {} left group {}", user_id, group_id);

        Ok(())
    }

    /// Groups the caller is not in, optionally filtered by a search term
    pub async fn discover_groups(
        &self,
        user_id: Uuid,
        search: Option<&str>,
    ) -> AppResult<Vec<GroupSummary>> {
        let mut tx = self.store.begin().await?;

        let mut summaries = Vec::new();
        for group in tx.find_groups().await? {
            if !matches_group_search(&group, search) {
                continue;
            }

            let members = tx.find_members(group.id).await?;
            if members.iter().any(|m| m.user_id == user_id) {
                continue;
            }

            summaries.push(GroupSummary::new(&group, members.len()));
        }

        tx.commit().await?;

        Ok(summaries)
    }

    /// Groups the caller belongs to, most recently joined first
    pub async fn my_groups(&self, user_id: Uuid) -> AppResult<Vec<MyGroup>> {
        let mut tx = self.store.begin().await?;

        let mut groups = Vec::new();
        for membership in tx.find_memberships_of(user_id).await?.into_iter().rev() {
            let Some(group) = tx.get_group(membership.group_id).await? else {
                continue;
            };
            let member_count = tx.find_members(group.id).await?.len();

            groups.push(MyGroup {
                group: GroupSummary::new(&group, member_count),
                role: membership.role,
                joined_at: membership.joined_at,
            });
        }

        tx.commit().await?;

        Ok(groups)
    }

    /// A group with its member list as seen by `viewer_id`
    pub async fn group_detail(&self, viewer_id: Uuid, group_id: Uuid) -> AppResult<GroupDetail> {
        let mut tx = self.store.begin().await?;

        let group = tx
            .get_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let memberships = tx.find_members(group_id).await?;
        let user_role = memberships
            .iter()
            .find(|m| m.user_id == viewer_id)
            .map(|m| m.role);

        let mut members = Vec::with_capacity(memberships.len());
        for membership in &memberships {
            let username = tx
                .get_user(membership.user_id)
                .await?
                .map(|u| u.username)
                .unwrap_or_default();

            members.push(GroupMemberView {
                id: membership.user_id,
                username,
                role: membership.role,
                joined_at: membership.joined_at,
            });
        }

        tx.commit().await?;

        Ok(GroupDetail {
            group: GroupSummary::new(&group, members.len()),
            is_member: user_role.is_some(),
            user_role,
            members,
        })
    }
}
