//! Services enforcing reviewer-assignment rules
//!
//! Each operation reads through the collaborator traits, decides, writes
//! single entities back and re-reads what it returns.

mod cascade;
mod pull_request;
mod stats;
mod team;
mod user;

#[cfg(test)]
mod test_support;

pub use pull_request::{PullRequestService, REVIEWERS_PER_PULL_REQUEST};
pub use stats::StatsService;
pub use team::TeamService;
pub use user::UserService;
