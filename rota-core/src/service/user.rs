//! Single-user activation and review listings

use std::sync::Arc;

use tracing::{error, info};

use crate::model::{User, UserReviews};
use crate::store::{PullRequestStore, UserDirectory};
use crate::Result;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserDirectory>,
    prs: Arc<dyn PullRequestStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>, prs: Arc<dyn PullRequestStore>) -> Self {
        Self { users, prs }
    }

    /// Flip one user's active flag and return the stored user
    ///
    /// Open reviews held by the user are left alone; use
    /// [`PullRequestService::deactivate_team_users_and_reassign`](super::PullRequestService::deactivate_team_users_and_reassign)
    /// to rebalance them.
    pub async fn set_is_active(&self, user_id: &str, active: bool) -> Result<User> {
        self.users
            .update_active(user_id, active)
            .await
            .inspect_err(|e| {
                error!(user_id, active, error = %e, "failed to update user active flag");
            })?;

        let user = self.users.get_by_id(user_id).await.inspect_err(|e| {
            error!(user_id, error = %e, "failed to load user after update");
        })?;

        info!(user_id, active, "user active flag updated");
        Ok(user)
    }

    /// Every pull request the user is assigned to review
    pub async fn get_user_reviews(&self, user_id: &str) -> Result<UserReviews> {
        self.users.get_by_id(user_id).await.inspect_err(|e| {
            error!(user_id, error = %e, "user not found when fetching reviews");
        })?;

        let pull_requests = self.prs.list_by_reviewer(user_id).await.inspect_err(|e| {
            error!(user_id, error = %e, "failed to list pull requests for reviewer");
        })?;

        info!(user_id, pull_requests_count = pull_requests.len(), "fetched user reviews");
        Ok(UserReviews {
            user_id: user_id.to_string(),
            pull_requests,
        })
    }
}
