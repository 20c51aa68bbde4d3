//! Pull request lifecycle: creation, merge and single-reviewer reassignment

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::model::{PrStatus, PullRequest};
use crate::selection::{ReviewerPicker, SecureRandomPicker};
use crate::store::{PullRequestStore, UserDirectory};
use crate::{Error, Result};

/// Reviewers assigned when a pull request is opened
pub const REVIEWERS_PER_PULL_REQUEST: usize = 2;

/// Enforces reviewer-assignment rules over the user directory and PR store
#[derive(Clone)]
pub struct PullRequestService {
    pub(super) prs: Arc<dyn PullRequestStore>,
    pub(super) users: Arc<dyn UserDirectory>,
    picker: Arc<dyn ReviewerPicker>,
}

impl PullRequestService {
    /// Create a service that selects reviewers with [`SecureRandomPicker`]
    pub fn new(prs: Arc<dyn PullRequestStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            prs,
            users,
            picker: Arc::new(SecureRandomPicker::new()),
        }
    }

    /// Replace the reviewer selection policy
    pub fn with_picker(mut self, picker: Arc<dyn ReviewerPicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Open a pull request and assign up to two active teammates of the author
    pub async fn create_pull_request(
        &self,
        pr_id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<PullRequest> {
        let author = self.users.get_by_id(author_id).await.map_err(|e| {
            error!(author_id, error = %e, "author lookup failed when creating pull request");
            match e {
                Error::NotFound { .. } => Error::AuthorNotFound(author_id.to_string()),
                other => other,
            }
        })?;

        let team_members = self
            .users
            .list_by_team(&author.team_name)
            .await
            .inspect_err(|e| {
                error!(team_name = %author.team_name, error = %e, "failed to list team members for pull request creation")
            })?;

        let candidates: Vec<String> = team_members
            .into_iter()
            .filter(|u| u.is_active && u.user_id != author_id)
            .map(|u| u.user_id)
            .collect();

        let reviewers = self.picker.pick(&candidates, REVIEWERS_PER_PULL_REQUEST);

        // record and reviewers are persisted together
        let mut draft = PullRequest::open(pr_id, name, author_id);
        draft.assigned_reviewers = reviewers;
        self.prs.create(&draft).await.inspect_err(|e| {
            error!(pr_id, reviewers = ?draft.assigned_reviewers, error = %e, "failed to create pull request");
        })?;

        let created = self.prs.get_by_id(pr_id).await.inspect_err(|e| {
            error!(pr_id, error = %e, "failed to reload pull request after creation");
        })?;

        info!(pr_id, author_id, reviewers = ?created.assigned_reviewers, "pull request created");
        Ok(created)
    }

    /// Mark a pull request merged
    ///
    /// Merging an already merged pull request returns it unchanged, so
    /// callers may retry safely.
    pub async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest> {
        let pr = self.prs.get_by_id(pr_id).await.inspect_err(|e| {
            error!(pr_id, error = %e, "failed to get pull request for merge");
        })?;

        if pr.is_merged() {
            info!(pr_id, "merge called on already merged pull request");
            return Ok(pr);
        }

        self.prs
            .update_status(pr_id, PrStatus::Merged, Some(Utc::now()))
            .await
            .inspect_err(|e| {
                error!(pr_id, error = %e, "failed to update pull request status to MERGED");
            })?;

        let merged = self.prs.get_by_id(pr_id).await.inspect_err(|e| {
            error!(pr_id, error = %e, "failed to reload pull request after merge");
        })?;

        info!(pr_id, "pull request merged");
        Ok(merged)
    }

    /// Swap one reviewer for a random active teammate, keeping its slot
    ///
    /// Returns the updated pull request and the ID of the new reviewer.
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> Result<(PullRequest, String)> {
        let pr = self.prs.get_by_id(pr_id).await.inspect_err(|e| {
            error!(pr_id, error = %e, "failed to get pull request for reassign");
        })?;

        if pr.is_merged() {
            warn!(pr_id, "attempt to reassign reviewer on merged pull request");
            return Err(Error::AlreadyMerged(pr_id.to_string()));
        }

        if !pr.has_reviewer(old_reviewer_id) {
            warn!(pr_id, old_reviewer_id, "old reviewer is not assigned to pull request");
            return Err(Error::NotAssigned {
                pr_id: pr_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        let old_reviewer = self.users.get_by_id(old_reviewer_id).await.inspect_err(|e| {
            error!(old_reviewer_id, error = %e, "failed to load old reviewer");
        })?;

        let team_members = self
            .users
            .list_by_team(&old_reviewer.team_name)
            .await
            .inspect_err(|e| {
                error!(team_name = %old_reviewer.team_name, error = %e, "failed to list team members for reassign");
            })?;

        let assigned: HashSet<&str> = pr.assigned_reviewers.iter().map(String::as_str).collect();
        let candidates: Vec<String> = team_members
            .into_iter()
            .filter(|u| {
                u.is_active
                    && u.user_id != old_reviewer_id
                    && u.user_id != pr.author_id
                    && !assigned.contains(u.user_id.as_str())
            })
            .map(|u| u.user_id)
            .collect();

        let Some(new_reviewer_id) = self.picker.pick(&candidates, 1).into_iter().next() else {
            warn!(pr_id, old_reviewer_id, "no candidate for reviewer reassign");
            return Err(Error::NoCandidate {
                pr_id: pr_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            });
        };

        let new_reviewers: Vec<String> = pr
            .assigned_reviewers
            .iter()
            .map(|r| {
                if r == old_reviewer_id {
                    new_reviewer_id.clone()
                } else {
                    r.clone()
                }
            })
            .collect();

        self.prs
            .set_reviewers(pr_id, &new_reviewers)
            .await
            .inspect_err(|e| {
                error!(pr_id, ?new_reviewers, error = %e, "failed to update reviewers on reassign");
            })?;

        let updated = self.prs.get_by_id(pr_id).await.inspect_err(|e| {
            error!(pr_id, error = %e, "failed to reload pull request after reassign");
        })?;

        info!(pr_id, old_reviewer_id, new_reviewer_id = %new_reviewer_id, "reviewer reassigned");
        Ok((updated, new_reviewer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::model::User;
    use crate::service::test_support::{FailingReviewerWrites, RecordingPicker};
    use crate::ErrorKind;
    use std::collections::HashSet;

    async fn seed(store: &InMemoryStore, team: &str, users: &[(&str, bool)]) {
        store.seed_team(team).await;
        let members: Vec<User> = users
            .iter()
            .map(|(id, active)| User::new(*id, id.to_uppercase(), team).with_active(*active))
            .collect();
        crate::store::UserDirectory::add_team_members(store, team, &members)
            .await
            .unwrap();
    }

    fn service(store: &Arc<InMemoryStore>) -> PullRequestService {
        PullRequestService::new(store.clone(), store.clone())
    }

    fn set(ids: &[String]) -> HashSet<String> {
        ids.iter().cloned().collect()
    }

    #[tokio::test]
    async fn test_create_assigns_two_teammates_excluding_author() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true), ("c", true)]).await;

        let pr = service(&store)
            .create_pull_request("pr-1", "Add search", "a")
            .await
            .unwrap();

        assert_eq!(pr.status, PrStatus::Open);
        assert_eq!(
            set(&pr.assigned_reviewers),
            ["b", "c"].iter().map(|s| s.to_string()).collect()
        );
        assert!(pr.merged_at.is_none());
    }

    #[tokio::test]
    async fn test_create_never_assigns_author_or_inactive() {
        let store = Arc::new(InMemoryStore::new());
        seed(
            &store,
            "backend",
            &[("a", true), ("b", true), ("c", false), ("d", true), ("e", true)],
        )
        .await;
        let svc = service(&store);

        for i in 0..30 {
            let pr = svc
                .create_pull_request(&format!("pr-{}", i), "Change", "a")
                .await
                .unwrap();
            assert_eq!(pr.assigned_reviewers.len(), 2);
            assert!(!pr.has_reviewer("a"));
            assert!(!pr.has_reviewer("c"));
            assert_eq!(set(&pr.assigned_reviewers).len(), 2);
        }
    }

    #[tokio::test]
    async fn test_create_with_small_team() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "solo", &[("a", true)]).await;
        seed(&store, "pair", &[("p", true), ("q", true)]).await;
        let svc = service(&store);

        let alone = svc.create_pull_request("pr-1", "Solo", "a").await.unwrap();
        assert!(alone.assigned_reviewers.is_empty());

        let paired = svc.create_pull_request("pr-2", "Pair", "p").await.unwrap();
        assert_eq!(paired.assigned_reviewers, vec!["q".to_string()]);
    }

    #[tokio::test]
    async fn test_create_unknown_author() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store)
            .create_pull_request("pr-1", "Ghost", "nobody")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AuthorNotFound(ref id) if id == "nobody"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_duplicate_id() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true)]).await;
        let svc = service(&store);

        svc.create_pull_request("pr-1", "First", "a").await.unwrap();
        let err = svc
            .create_pull_request("pr-1", "Second", "a")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        let kept = store.pull_request("pr-1").await.unwrap();
        assert_eq!(kept.pull_request_name, "First");
    }

    #[tokio::test]
    async fn test_create_writes_reviewers_with_the_record() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true), ("c", true)]).await;
        let no_reviewer_writes = Arc::new(FailingReviewerWrites::new(store.clone(), 0));
        let svc = PullRequestService::new(no_reviewer_writes, store.clone());

        let pr = svc.create_pull_request("pr-1", "Add search", "a").await.unwrap();

        assert_eq!(pr.assigned_reviewers.len(), 2);
        let stored = store.pull_request("pr-1").await.unwrap();
        assert_eq!(stored.assigned_reviewers, pr.assigned_reviewers);
    }

    #[tokio::test]
    async fn test_create_passes_filtered_pool_to_picker() {
        let store = Arc::new(InMemoryStore::new());
        seed(
            &store,
            "backend",
            &[("a", true), ("b", true), ("c", false), ("d", true), ("e", true)],
        )
        .await;
        seed(&store, "qa", &[("q", true)]).await;
        let picker = Arc::new(RecordingPicker::default());
        let svc = service(&store).with_picker(picker.clone());

        let pr = svc.create_pull_request("pr-1", "Change", "a").await.unwrap();

        let calls = picker.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![(
                vec!["b".to_string(), "d".to_string(), "e".to_string()],
                REVIEWERS_PER_PULL_REQUEST
            )]
        );
        assert_eq!(pr.assigned_reviewers, vec!["d".to_string(), "e".to_string()]);
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true)]).await;
        let svc = service(&store);
        svc.create_pull_request("pr-1", "Change", "a").await.unwrap();

        let first = svc.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(first.status, PrStatus::Merged);
        assert!(first.merged_at.is_some());

        let second = svc.merge_pull_request("pr-1").await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_merge_unknown() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store).merge_pull_request("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_reassign_unknown() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true)]).await;

        let err = service(&store)
            .reassign_reviewer("missing", "b")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_reassign_preserves_slot() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true), ("c", true), ("d", true)]).await;
        store
            .seed_pull_request("pr-2", "a", &["b", "c"])
            .await;

        let (pr, new_id) = service(&store)
            .reassign_reviewer("pr-2", "b")
            .await
            .unwrap();

        assert_eq!(new_id, "d");
        assert_eq!(pr.assigned_reviewers, vec!["d".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_reassign_never_picks_author() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true), ("c", true)]).await;
        store.seed_pull_request("pr-1", "a", &["b", "c"]).await;

        let err = service(&store)
            .reassign_reviewer("pr-1", "b")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoCandidate);
        let pr = store.pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_reassign_not_assigned() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true), ("c", true), ("d", true)]).await;
        store.seed_pull_request("pr-1", "a", &["b", "c"]).await;

        let err = service(&store)
            .reassign_reviewer("pr-1", "d")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotAssigned { .. }));
        let pr = store.pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_reassign_rejects_merged() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true), ("c", true), ("d", true)]).await;
        store.seed_pull_request("pr-1", "a", &["b", "c"]).await;
        let svc = service(&store);
        svc.merge_pull_request("pr-1").await.unwrap();

        let err = svc.reassign_reviewer("pr-1", "b").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyMerged);
        let pr = store.pull_request("pr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_reassign_skips_inactive_and_assigned() {
        let store = Arc::new(InMemoryStore::new());
        seed(
            &store,
            "backend",
            &[("a", true), ("b", true), ("c", true), ("d", false), ("e", true)],
        )
        .await;
        store.seed_pull_request("pr-1", "a", &["b", "c"]).await;
        let svc = service(&store);

        for _ in 0..10 {
            let (pr, new_id) = svc.reassign_reviewer("pr-1", "b").await.unwrap();
            assert_eq!(new_id, "e");
            assert_eq!(pr.assigned_reviewers, vec!["e".to_string(), "c".to_string()]);
            // put b back for the next round
            store.set_reviewers("pr-1", &["b".to_string(), "c".to_string()]).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_reassign_uses_old_reviewers_team() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "backend", &[("a", true), ("b", true)]).await;
        seed(&store, "qa", &[("q1", true), ("q2", true)]).await;
        store.seed_pull_request("pr-1", "a", &["b", "q1"]).await;

        let (pr, new_id) = service(&store)
            .reassign_reviewer("pr-1", "q1")
            .await
            .unwrap();

        assert_eq!(new_id, "q2");
        assert_eq!(pr.assigned_reviewers, vec!["b".to_string(), "q2".to_string()]);
    }
}
