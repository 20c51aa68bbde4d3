//! CLI command implementations

pub mod pr;
pub mod stats;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use std::sync::Arc;

use rota_core::{Config, PullRequestService, StatsService, TeamService, UserService};
use rota_db::{Database, DatabaseConfig};
use serde::Serialize;

/// Services wired to the configured SQLite database
pub struct Services {
    pub teams: TeamService,
    pub users: UserService,
    pub pull_requests: PullRequestService,
    pub stats: StatsService,
}

impl Services {
    /// Open (creating and migrating if needed) the database and build services on it
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let db = Database::open(DatabaseConfig::from(&config.database)).await?;
        tracing::debug!(path = %config.database.path.display(), "database ready");

        let users = Arc::new(db.users());
        let teams = Arc::new(db.teams());
        let prs = Arc::new(db.pull_requests());

        Ok(Self {
            teams: TeamService::new(teams, users.clone()),
            users: UserService::new(users.clone(), prs.clone()),
            pull_requests: PullRequestService::new(prs.clone(), users),
            stats: StatsService::new(prs),
        })
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn active_label(is_active: bool) -> &'static str {
    if is_active {
        "active"
    } else {
        "inactive"
    }
}
