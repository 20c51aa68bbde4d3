//! Repositories implementing the rota-core collaborator traits on SQLite

pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestRepo;
pub use teams::TeamRepo;
pub use users::UserRepo;

use rota_core::Error;

/// Wrap a sqlx failure as a storage error tagged with the operation
pub(crate) fn storage(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| Error::storage(operation, e)
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
