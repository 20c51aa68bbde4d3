//! In-memory implementation of the collaborator traits
//!
//! All state is held behind a single `RwLock` and lost when the store is
//! dropped. Ordering, conflict and not-found behaviour match the SQLite
//! repositories so services can be exercised without a database.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::{PrStatus, PullRequest, PullRequestShort, Team, TeamMember, User};
use crate::store::{PullRequestStore, TeamDirectory, UserDirectory};
use crate::{Entity, Error, Result};

#[derive(Debug, Clone)]
struct StoredPullRequest {
    pr: PullRequest,
    /// Insertion sequence, breaks `created_at` ties
    seq: u64,
}

#[derive(Debug, Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, StoredPullRequest>,
    next_seq: u64,
}

impl State {
    fn members_of(&self, team_name: &str) -> Vec<User> {
        self.users
            .values()
            .filter(|u| u.team_name == team_name)
            .cloned()
            .collect()
    }

    fn team(&self, team_name: &str) -> Team {
        Team {
            team_name: team_name.to_string(),
            members: self
                .members_of(team_name)
                .into_iter()
                .map(TeamMember::from)
                .collect(),
        }
    }

    fn insert_pull_request(&mut self, pr: PullRequest) -> Result<()> {
        if self.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(Error::already_exists(Entity::PullRequest, &pr.pull_request_id));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pull_requests
            .insert(pr.pull_request_id.clone(), StoredPullRequest { pr, seq });
        Ok(())
    }

    /// Pull requests in creation order
    fn ordered(&self) -> Vec<&StoredPullRequest> {
        let mut prs: Vec<&StoredPullRequest> = self.pull_requests.values().collect();
        prs.sort_by(|a, b| a.pr.created_at.cmp(&b.pr.created_at).then(a.seq.cmp(&b.seq)));
        prs
    }
}

/// Teams, users and pull requests held in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a team name, ignoring duplicates
    pub async fn seed_team(&self, team_name: &str) {
        self.state.write().await.teams.insert(team_name.to_string());
    }

    /// Insert an open pull request with a fixed reviewer list
    ///
    /// Replaces any existing pull request with the same ID.
    pub async fn seed_pull_request(&self, pr_id: &str, author_id: &str, reviewers: &[&str]) {
        let mut pr = PullRequest::open(pr_id, pr_id, author_id);
        pr.assigned_reviewers = reviewers.iter().map(|r| r.to_string()).collect();

        let mut state = self.state.write().await;
        state.pull_requests.remove(pr_id);
        // cannot collide after the removal above
        let _ = state.insert_pull_request(pr);
    }

    /// Snapshot of a pull request, if present
    pub async fn pull_request(&self, pr_id: &str) -> Option<PullRequest> {
        self.state
            .read()
            .await
            .pull_requests
            .get(pr_id)
            .map(|s| s.pr.clone())
    }

    /// Snapshot of a user, if present
    pub async fn user(&self, user_id: &str) -> Option<User> {
        self.state.read().await.users.get(user_id).cloned()
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn get_by_id(&self, user_id: &str) -> Result<User> {
        self.state
            .read()
            .await
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::not_found(Entity::User, user_id))
    }

    async fn list_by_team(&self, team_name: &str) -> Result<Vec<User>> {
        Ok(self.state.read().await.members_of(team_name))
    }

    async fn update_active(&self, user_id: &str, active: bool) -> Result<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::not_found(Entity::User, user_id))?;
        user.is_active = active;
        Ok(())
    }

    async fn add_team_members(&self, team_name: &str, members: &[User]) -> Result<()> {
        let mut state = self.state.write().await;
        for member in members {
            let mut user = member.clone();
            user.team_name = team_name.to_string();
            state.users.insert(user.user_id.clone(), user);
        }
        Ok(())
    }
}

#[async_trait]
impl TeamDirectory for InMemoryStore {
    async fn create(&self, team_name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.teams.insert(team_name.to_string()) {
            return Err(Error::already_exists(Entity::Team, team_name));
        }
        Ok(())
    }

    async fn get_by_name(&self, team_name: &str) -> Result<Team> {
        let state = self.state.read().await;
        if !state.teams.contains(team_name) {
            return Err(Error::not_found(Entity::Team, team_name));
        }
        Ok(state.team(team_name))
    }

    async fn list(&self) -> Result<Vec<Team>> {
        let state = self.state.read().await;
        Ok(state.teams.iter().map(|name| state.team(name)).collect())
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn create(&self, pr: &PullRequest) -> Result<()> {
        self.state.write().await.insert_pull_request(pr.clone())
    }

    async fn get_by_id(&self, pr_id: &str) -> Result<PullRequest> {
        self.pull_request(pr_id)
            .await
            .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))
    }

    async fn update_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let stored = state
            .pull_requests
            .get_mut(pr_id)
            .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))?;

        if stored.pr.status != status {
            stored.pr.status = status;
            stored.pr.merged_at = merged_at;
        }
        Ok(())
    }

    async fn set_reviewers(&self, pr_id: &str, reviewer_ids: &[String]) -> Result<()> {
        let mut state = self.state.write().await;
        let stored = state
            .pull_requests
            .get_mut(pr_id)
            .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))?;
        stored.pr.assigned_reviewers = reviewer_ids.to_vec();
        Ok(())
    }

    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>> {
        let state = self.state.read().await;
        Ok(state
            .ordered()
            .into_iter()
            .rev()
            .filter(|s| s.pr.has_reviewer(reviewer_id))
            .map(|s| s.pr.summary())
            .collect())
    }

    async fn list_open_by_reviewers(
        &self,
        reviewer_ids: &[String],
    ) -> Result<Vec<PullRequestShort>> {
        let state = self.state.read().await;
        Ok(state
            .ordered()
            .into_iter()
            .filter(|s| {
                s.pr.status == PrStatus::Open
                    && reviewer_ids.iter().any(|id| s.pr.has_reviewer(id))
            })
            .map(|s| s.pr.summary())
            .collect())
    }

    async fn count_by_reviewer(&self) -> Result<HashMap<String, String>> {
        let state = self.state.read().await;
        let mut counts: HashMap<String, i64> = HashMap::new();
        for stored in state.pull_requests.values() {
            for reviewer in &stored.pr.assigned_reviewers {
                *counts.entry(reviewer.clone()).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(id, count)| (id, count.to_string()))
            .collect())
    }
}
