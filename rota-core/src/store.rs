//! Collaborator contracts for persisted state
//!
//! The services never cache entities: every operation reads through these
//! traits before deciding and writes single entities back. Implementations
//! report absence as [`Error::NotFound`](crate::Error::NotFound), ID
//! collisions as [`Error::AlreadyExists`](crate::Error::AlreadyExists) and
//! any other backend failure as [`Error::Storage`](crate::Error::Storage).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{PrStatus, PullRequest, PullRequestShort, Team, User};
use crate::Result;

/// User records and their active flags
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_by_id(&self, user_id: &str) -> Result<User>;

    /// All members of a team, active or not, ordered by user ID
    async fn list_by_team(&self, team_name: &str) -> Result<Vec<User>>;

    async fn update_active(&self, user_id: &str, active: bool) -> Result<()>;

    /// Insert or overwrite users as members of `team_name`
    async fn add_team_members(&self, team_name: &str, members: &[User]) -> Result<()>;
}

/// Team records
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn create(&self, team_name: &str) -> Result<()>;

    async fn get_by_name(&self, team_name: &str) -> Result<Team>;

    /// All teams ordered by name
    async fn list(&self) -> Result<Vec<Team>>;
}

/// Pull requests and their reviewer sets
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Persist a new pull request record with any reviewers it already carries
    ///
    /// An existing ID yields `AlreadyExists`.
    async fn create(&self, pr: &PullRequest) -> Result<()>;

    /// Full view including reviewers in slot order
    async fn get_by_id(&self, pr_id: &str) -> Result<PullRequest>;

    /// Conditional status update
    ///
    /// A pull request already in `status` is left untouched (its
    /// `merged_at` is not rewritten); a missing one yields `NotFound`.
    async fn update_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Replace the reviewer list, keeping the given order
    ///
    /// A missing pull request yields `NotFound`.
    async fn set_reviewers(&self, pr_id: &str, reviewer_ids: &[String]) -> Result<()>;

    /// Every pull request the user reviews, newest first
    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>>;

    /// Distinct open pull requests with at least one of `reviewer_ids` assigned
    async fn list_open_by_reviewers(&self, reviewer_ids: &[String])
        -> Result<Vec<PullRequestShort>>;

    /// Raw reviewer -> assignment count aggregate
    ///
    /// Counts are returned as the backend reports them; callers parse them.
    async fn count_by_reviewer(&self) -> Result<HashMap<String, String>>;
}
