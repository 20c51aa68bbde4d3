//! Team-wide deactivation with reviewer rebalancing
//!
//! Open pull requests reviewed by the users being deactivated are rebalanced
//! first; the users are flipped to inactive only after every pull request
//! has been rewritten. Nothing is compensated on failure. Re-running the
//! whole operation converges: rebalanced pull requests no longer reference
//! the deactivated users and the activation writes are repeatable.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::Result;

use super::PullRequestService;

/// Rebuild a reviewer list, replacing deactivated reviewers in place
///
/// Kept reviewers (and the author) are never used as replacements.
/// Replacements are taken from `pool` in order; a slot with no remaining
/// candidate is dropped.
pub(crate) fn rebalance_reviewers(
    reviewers: &[String],
    author_id: &str,
    deactivated: &HashSet<&str>,
    pool: &[String],
) -> Vec<String> {
    let mut used: HashSet<&str> = reviewers
        .iter()
        .map(String::as_str)
        .filter(|r| !deactivated.contains(r))
        .collect();
    used.insert(author_id);

    let mut rebuilt = Vec::with_capacity(reviewers.len());
    for reviewer in reviewers {
        if !deactivated.contains(reviewer.as_str()) {
            rebuilt.push(reviewer.clone());
            continue;
        }

        if let Some(replacement) = pool.iter().find(|c| !used.contains(c.as_str())) {
            used.insert(replacement.as_str());
            rebuilt.push(replacement.clone());
        }
    }

    rebuilt
}

impl PullRequestService {
    /// Deactivate `user_ids` within `team_name`, reassigning their open reviews
    ///
    /// IDs that are not active members of the team are ignored. Returns the
    /// IDs that were actually deactivated, in request order.
    pub async fn deactivate_team_users_and_reassign(
        &self,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<Vec<String>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let members = self.users.list_by_team(team_name).await.inspect_err(|e| {
            error!(team_name, error = %e, "failed to list team members for deactivation");
        })?;

        let active_members: HashSet<&str> = members
            .iter()
            .filter(|u| u.is_active)
            .map(|u| u.user_id.as_str())
            .collect();

        let mut to_deactivate: Vec<String> = Vec::new();
        for id in user_ids {
            if active_members.contains(id.as_str()) && !to_deactivate.contains(id) {
                to_deactivate.push(id.clone());
            }
        }

        if to_deactivate.is_empty() {
            debug!(team_name, ?user_ids, "nothing to deactivate");
            return Ok(Vec::new());
        }

        let deactivated: HashSet<&str> = to_deactivate.iter().map(String::as_str).collect();
        let still_active: Vec<String> = members
            .iter()
            .filter(|u| u.is_active && !deactivated.contains(u.user_id.as_str()))
            .map(|u| u.user_id.clone())
            .collect();

        let affected = self
            .prs
            .list_open_by_reviewers(&to_deactivate)
            .await
            .inspect_err(|e| {
                error!(team_name, error = %e, "failed to list open pull requests for deactivated reviewers");
            })?;

        for summary in &affected {
            let pr_id = summary.pull_request_id.as_str();
            let pr = self.prs.get_by_id(pr_id).await.inspect_err(|e| {
                error!(pr_id, error = %e, "failed to load pull request for rebalancing");
            })?;

            if pr.is_merged() {
                warn!(pr_id, "pull request merged before rebalancing, leaving reviewers frozen");
                continue;
            }

            let rebuilt =
                rebalance_reviewers(&pr.assigned_reviewers, &pr.author_id, &deactivated, &still_active);
            if rebuilt == pr.assigned_reviewers {
                continue;
            }

            self.prs
                .set_reviewers(pr_id, &rebuilt)
                .await
                .inspect_err(|e| {
                    error!(pr_id, ?rebuilt, error = %e, "failed to rebalance reviewers");
                })?;

            debug!(pr_id, before = ?pr.assigned_reviewers, after = ?rebuilt, "reviewers rebalanced");
        }

        for user_id in &to_deactivate {
            self.users
                .update_active(user_id, false)
                .await
                .inspect_err(|e| {
                    error!(user_id = %user_id, error = %e, "failed to deactivate user");
                })?;
        }

        info!(
            team_name,
            deactivated = ?to_deactivate,
            pull_requests = affected.len(),
            "team users deactivated"
        );
        Ok(to_deactivate)
    }
}
