//! Database layer for rota
//!
//! SQLite implementations of the rota-core collaborator traits: teams,
//! users, pull requests and their reviewer slots.

pub mod db;
pub mod error;
pub mod repos;

pub use db::{Database, DatabaseConfig};
pub use error::{DbError, Result};
pub use repos::{PullRequestRepo, TeamRepo, UserRepo};
