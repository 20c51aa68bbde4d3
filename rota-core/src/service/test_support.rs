//! Store wrappers and pickers shared by the service tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::memory::InMemoryStore;
use crate::model::{PrStatus, PullRequest, PullRequestShort, User};
use crate::selection::ReviewerPicker;
use crate::store::{PullRequestStore, UserDirectory};
use crate::{Error, Result};

fn connection_reset(operation: &str) -> Error {
    Error::storage(
        operation,
        std::io::Error::new(std::io::ErrorKind::Other, "connection reset"),
    )
}

/// Take one unit from `budget`, or report that it is spent
fn spend(budget: &AtomicUsize) -> bool {
    budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok()
}

/// Pull request store whose `set_reviewers` fails once `successes` are spent
pub struct FailingReviewerWrites {
    inner: Arc<InMemoryStore>,
    successes: AtomicUsize,
}

impl FailingReviewerWrites {
    pub fn new(inner: Arc<InMemoryStore>, successes: usize) -> Self {
        Self {
            inner,
            successes: AtomicUsize::new(successes),
        }
    }

    pub fn heal(&self) {
        self.successes.store(usize::MAX, Ordering::SeqCst);
    }
}

#[async_trait]
impl PullRequestStore for FailingReviewerWrites {
    async fn create(&self, pr: &PullRequest) -> Result<()> {
        PullRequestStore::create(self.inner.as_ref(), pr).await
    }

    async fn get_by_id(&self, pr_id: &str) -> Result<PullRequest> {
        PullRequestStore::get_by_id(self.inner.as_ref(), pr_id).await
    }

    async fn update_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.inner.update_status(pr_id, status, merged_at).await
    }

    async fn set_reviewers(&self, pr_id: &str, reviewer_ids: &[String]) -> Result<()> {
        if !spend(&self.successes) {
            return Err(connection_reset("set reviewers"));
        }
        self.inner.set_reviewers(pr_id, reviewer_ids).await
    }

    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>> {
        self.inner.list_by_reviewer(reviewer_id).await
    }

    async fn list_open_by_reviewers(&self, reviewer_ids: &[String]) -> Result<Vec<PullRequestShort>> {
        self.inner.list_open_by_reviewers(reviewer_ids).await
    }

    async fn count_by_reviewer(&self) -> Result<HashMap<String, String>> {
        self.inner.count_by_reviewer().await
    }
}

/// User directory whose `update_active` fails once `successes` are spent
pub struct FailingActivation {
    inner: Arc<InMemoryStore>,
    successes: AtomicUsize,
}

impl FailingActivation {
    pub fn new(inner: Arc<InMemoryStore>, successes: usize) -> Self {
        Self {
            inner,
            successes: AtomicUsize::new(successes),
        }
    }

    pub fn heal(&self) {
        self.successes.store(usize::MAX, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for FailingActivation {
    async fn get_by_id(&self, user_id: &str) -> Result<User> {
        UserDirectory::get_by_id(self.inner.as_ref(), user_id).await
    }

    async fn list_by_team(&self, team_name: &str) -> Result<Vec<User>> {
        self.inner.list_by_team(team_name).await
    }

    async fn update_active(&self, user_id: &str, active: bool) -> Result<()> {
        if !spend(&self.successes) {
            return Err(connection_reset("update user active flag"));
        }
        self.inner.update_active(user_id, active).await
    }

    async fn add_team_members(&self, team_name: &str, members: &[User]) -> Result<()> {
        self.inner.add_team_members(team_name, members).await
    }
}

/// Picker that records its inputs and returns the last `n` candidates
#[derive(Default)]
pub struct RecordingPicker {
    pub calls: Mutex<Vec<(Vec<String>, usize)>>,
}

impl ReviewerPicker for RecordingPicker {
    fn pick(&self, candidates: &[String], n: usize) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .push((candidates.to_vec(), n));
        let skip = candidates.len().saturating_sub(n);
        candidates[skip..].to_vec()
    }
}
