use thiserror::Error;

/// The error codes the core surfaces to callers. Every variant here is a
/// named result, never an exception-for-control-flow path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("draft not found: {0}")]
    NotFound(String),

    #[error("host-only operation")]
    NotHost,

    #[error("seat not owned by caller")]
    NotSeatOwner,

    #[error("draft is locked: {0}")]
    DraftLocked(String),

    #[error("draft is full")]
    DraftFull,

    #[error("principal already has a seat")]
    AlreadyJoined,

    #[error("selection not valid: {0}")]
    InvalidSelection(String),

    #[error("state changed, refetch and retry")]
    StateChanged,

    #[error("too few players to start")]
    TooFewPlayers,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
