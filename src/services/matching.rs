use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::Matcher;
use crate::error::{AppError, AppResult};
use crate::models::{AcceptedMatch, MatchCounterparty, MatchRecord, MatchStatus, ScoredMatch};
use crate::services::store::{RecordStore, StoreError, StoreTx};

/// Outcome of a like
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikeOutcome {
    pub mutual: bool,
    pub score: f64,
}

/// Match lifecycle: discovery, likes, dislikes and confirmed matches
///
/// # State machine
/// ```text
/// like (no record)                 -> pending   (requester -> target)
/// like (target's pending record)   -> accepted  (promoted in place, mutual)
/// dislike (no record)              -> rejected  (terminal)
/// ```
/// Accepted and rejected records never change or disappear, so an evaluated
/// user never comes back through discovery.
pub struct MatchService<S: RecordStore> {
    store: Arc<S>,
    matcher: Matcher,
}

impl<S: RecordStore> MatchService<S> {
    pub fn new(store: Arc<S>, matcher: Matcher) -> Self {
        Self { store, matcher }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Ranked candidates for `requester_id`
    pub async fn discover(&self, requester_id: Uuid) -> AppResult<Vec<ScoredMatch>> {
        let mut tx = self.store.begin().await?;

        let profile = tx
            .get_profile(requester_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        if !profile.allow_matching {
            return Err(AppError::Forbidden("Matching is disabled for this user".to_string()));
        }

        let evaluated = tx.find_counterparties(requester_id).await?;
        let candidates = tx.find_discoverable(requester_id).await?;

        let mut result = self.matcher.rank(&profile, candidates, &evaluated);

        let own_matches = accepted_counterparties(&mut tx, requester_id).await?;
        for scored in &mut result.matches {
            let theirs = accepted_counterparties(&mut tx, scored.id).await?;
            scored.mutual_friends = own_matches.intersection(&theirs).count();
        }

        tx.commit().await?;

        tracing::info!(
            "Discovered {} matches for user {} (from {} candidates, {} already evaluated)",
            result.matches.len(),
            requester_id,
            result.total_candidates,
            evaluated.len()
        );

        Ok(result.matches)
    }

    /// Drop candidates the requester has evaluated since `ranked` was computed
    ///
    /// Cached discovery lists may predate a like or dislike committed through
    /// another instance, so they are checked against the store before use.
    pub async fn retain_unevaluated(
        &self,
        requester_id: Uuid,
        mut ranked: Vec<ScoredMatch>,
    ) -> AppResult<Vec<ScoredMatch>> {
        let mut tx = self.store.begin().await?;
        let evaluated = tx.find_counterparties(requester_id).await?;
        tx.commit().await?;

        let before = ranked.len();
        ranked.retain(|m| !evaluated.contains(&m.id));

        if ranked.len() < before {
            tracing::debug!(
                "Dropped {} stale discovery entries for user {}",
                before - ranked.len(),
                requester_id
            );
        }

        Ok(ranked)
    }

    /// Record a like from `requester_id` toward `target_id`
    ///
    /// A like answering the target's own pending like promotes that record
    /// to accepted and reports the match as mutual.
    pub async fn like(&self, requester_id: Uuid, target_id: Uuid) -> AppResult<LikeOutcome> {
        if requester_id == target_id {
            return Err(AppError::Conflict("Cannot like yourself".to_string()));
        }

        let mut tx = self.store.begin().await?;

        for id in [requester_id, target_id] {
            if tx.get_user(id).await?.is_none() {
                return Err(AppError::NotFound("User not found".to_string()));
            }
        }

        let (requester, target) = match (
            tx.get_profile(requester_id).await?,
            tx.get_profile(target_id).await?,
        ) {
            (Some(requester), Some(target)) => (requester, target),
            _ => return Err(AppError::NotFound("Profile not found".to_string())),
        };

        tx.lock_pair(requester_id, target_id).await?;

        let score = self.matcher.score(&requester, &target);

        let mutual = match tx.find_match_between(requester_id, target_id).await? {
            None => {
                tx.insert_match(&MatchRecord::pending(requester_id, target_id, score))
                    .await?;
                false
            }
            Some(mut existing)
                if existing.initiator_id == target_id
                    && existing.status == MatchStatus::Pending =>
            {
                existing
                    .accept()
                    .map_err(|status| AppError::Conflict(format!("Match already {}", status)))?;
                existing.match_score = score;
                tx.update_match(&existing).await?;
                true
            }
            Some(_) => return Err(AppError::Conflict("Match already exists".to_string())),
        };

        tx.commit().await?;

        if mutual {
            tracing::info!("Mutual match between {} and {} ({:.2})", requester_id, target_id, score);
        } else {
            tracing::info!("Recorded like {} -> {} ({:.2})", requester_id, target_id, score);
        }

        Ok(LikeOutcome { mutual, score })
    }

    /// Record a dislike; a no-op when the pair already has a record
    ///
    /// Returns whether a new rejected record was written.
    pub async fn dislike(&self, requester_id: Uuid, target_id: Uuid) -> AppResult<bool> {
        if requester_id == target_id {
            return Err(AppError::Conflict("Cannot dislike yourself".to_string()));
        }

        let mut tx = self.store.begin().await?;

        for id in [requester_id, target_id] {
            if tx.get_user(id).await?.is_none() {
                return Err(AppError::NotFound("User not found".to_string()));
            }
        }

        tx.lock_pair(requester_id, target_id).await?;

        if tx.find_match_between(requester_id, target_id).await?.is_some() {
            tracing::debug!("Dislike {} -> {} ignored, pair already evaluated", requester_id, target_id);
            return Ok(false);
        }

        tx.insert_match(&MatchRecord::rejected(requester_id, target_id))
            .await?;
        tx.commit().await?;

        tracing::info!("Recorded dislike {} -> {}", requester_id, target_id);

        Ok(true)
    }

    /// Confirmed matches of `user_id`, most recent first
    pub async fn list_matches(&self, user_id: Uuid) -> AppResult<Vec<AcceptedMatch>> {
        let mut tx = self.store.begin().await?;

        let mut records = tx.find_matches_for(user_id, MatchStatus::Accepted).await?;
        records.sort_by(|a, b| b.matched_at.cmp(&a.matched_at).then(a.id.cmp(&b.id)));

        let mut matches = Vec::with_capacity(records.len());
        for record in records {
            let other_id = record.counterparty(user_id);
            let (Some(user), Some(profile)) =
                (tx.get_user(other_id).await?, tx.get_profile(other_id).await?)
            else {
                tracing::warn!("Skipping match {}: counterparty {} has no profile", record.id, other_id);
                continue;
            };

            matches.push(AcceptedMatch {
                match_id: record.id,
                user: MatchCounterparty::new(&user, &profile),
                match_score: record.match_score,
                matched_at: record.matched_at,
            });
        }

        tx.commit().await?;

        Ok(matches)
    }
}

async fn accepted_counterparties<T: StoreTx>(
    tx: &mut T,
    user_id: Uuid,
) -> Result<HashSet<Uuid>, StoreError> {
    Ok(tx
        .find_matches_for(user_id, MatchStatus::Accepted)
        .await?
        .iter()
        .map(|m| m.counterparty(user_id))
        .collect())
}
