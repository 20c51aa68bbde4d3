//! Reviewer assignment statistics

use std::sync::Arc;

use tracing::{error, warn};

use crate::model::ReviewerStat;
use crate::store::PullRequestStore;
use crate::Result;

#[derive(Clone)]
pub struct StatsService {
    prs: Arc<dyn PullRequestStore>,
}

impl StatsService {
    pub fn new(prs: Arc<dyn PullRequestStore>) -> Self {
        Self { prs }
    }

    /// Assignment count per reviewer, sorted by user ID
    ///
    /// Aggregate rows whose count is not an integer are skipped.
    pub async fn get_reviewer_stats(&self) -> Result<Vec<ReviewerStat>> {
        let raw = self.prs.count_by_reviewer().await.inspect_err(|e| {
            error!(error = %e, "failed to get reviewer stats");
        })?;

        let mut stats: Vec<ReviewerStat> = raw
            .into_iter()
            .filter_map(|(user_id, raw_count)| match raw_count.trim().parse::<i64>() {
                Ok(review_count) => Some(ReviewerStat {
                    user_id,
                    review_count,
                }),
                Err(e) => {
                    warn!(user_id = %user_id, raw_count = %raw_count, error = %e, "failed to parse count from store");
                    None
                }
            })
            .collect();

        stats.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(stats)
    }
}
