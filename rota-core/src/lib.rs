//! Rota Core - reviewer assignment and pull request lifecycle
//!
//! Services in [`service`] depend only on the collaborator traits in
//! [`store`]; [`InMemoryStore`] implements them for tests and embedding,
//! and the `rota-db` crate implements them on SQLite.

pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod selection;
pub mod service;
pub mod store;

pub use config::{Config, DatabaseSettings, LoggingConfig};
pub use error::{BoxError, Entity, Error, ErrorKind, Result};
pub use memory::InMemoryStore;
pub use model::{
    PrStatus, PullRequest, PullRequestShort, ReviewerStat, Team, TeamMember, User, UserReviews,
};
pub use selection::{ReviewerPicker, SecureRandomPicker};
pub use service::{
    PullRequestService, StatsService, TeamService, UserService, REVIEWERS_PER_PULL_REQUEST,
};
pub use store::{PullRequestStore, TeamDirectory, UserDirectory};
