//! Error types for placement strategies.

use thiserror::Error;

/// Result type alias for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// Errors raised while configuring a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid overcommit ratio {0:?}: expected a decimal number such as \"0.05\"")]
    InvalidFormat(String),

    #[error("overcommit ratio out of range: {0}")]
    OutOfRange(String),

    #[error("unknown placement strategy: {0}")]
    UnknownStrategy(String),
}

/// Errors raised by a single placement decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("no resources available to schedule container")]
    NoResourcesAvailable,
}

/// Errors raised by [`Fleet`](crate::fleet::Fleet) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node already registered: {0}")]
    DuplicateNode(String),
}
