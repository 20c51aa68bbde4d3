//! Error types for rota
//!
//! Every error carries an [`ErrorKind`] so callers can branch on the kind of
//! failure without matching on messages. Storage failures keep their
//! underlying cause as a `source` rather than flattening it into text.

use std::fmt;

use thiserror::Error;

/// Result type alias for rota operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause attached to storage failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Team,
    PullRequest,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "user",
            Entity::Team => "team",
            Entity::PullRequest => "pull request",
        };
        f.write_str(name)
    }
}

/// Distinguishable failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    AlreadyMerged,
    NotAssigned,
    NoCandidate,
    StorageFailure,
    Config,
    Io,
}

/// Error type for rota operations
#[derive(Error, Debug)]
pub enum Error {
    /// A user, team or pull request does not exist
    #[error("{entity} '{id}' not found")]
    NotFound { entity: Entity, id: String },

    /// The author of a new pull request does not exist
    #[error("author '{0}' not found")]
    AuthorNotFound(String),

    /// Create collided with an existing ID
    #[error("{entity} '{id}' already exists")]
    AlreadyExists { entity: Entity, id: String },

    /// Reviewer change attempted on a merged pull request
    #[error("pull request '{0}' is already merged")]
    AlreadyMerged(String),

    #[error("reviewer '{reviewer_id}' is not assigned to pull request '{pr_id}'")]
    NotAssigned { pr_id: String, reviewer_id: String },

    #[error("no active replacement candidate for reviewer '{reviewer_id}' on pull request '{pr_id}'")]
    NoCandidate { pr_id: String, reviewer_id: String },

    /// Any persistence failure not otherwise classified
    #[error("storage failure during {operation}: {source}")]
    Storage {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `NotFound` error for the given entity
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Build an `AlreadyExists` error for the given entity
    pub fn already_exists(entity: Entity, id: impl Into<String>) -> Self {
        Error::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    /// Wrap an underlying persistence error with the operation that failed
    pub fn storage(
        operation: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Storage {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// The kind of failure, for programmatic matching
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } | Error::AuthorNotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::AlreadyMerged(_) => ErrorKind::AlreadyMerged,
            Error::NotAssigned { .. } => ErrorKind::NotAssigned,
            Error::NoCandidate { .. } => ErrorKind::NoCandidate,
            Error::Storage { .. } => ErrorKind::StorageFailure,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::AlreadyExists {
                entity: Entity::PullRequest,
                ..
            } => "PR_EXISTS",
            Error::AlreadyExists {
                entity: Entity::Team,
                ..
            } => "TEAM_EXISTS",
            other => other.kind().code(),
        }
    }
}

impl ErrorKind {
    /// Default machine-readable code for the kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::AlreadyMerged => "PR_MERGED",
            ErrorKind::NotAssigned => "NOT_ASSIGNED",
            ErrorKind::NoCandidate => "NO_CANDIDATE",
            ErrorKind::StorageFailure | ErrorKind::Io => "INTERNAL_ERROR",
            ErrorKind::Config => "CONFIG_ERROR",
        }
    }
}
