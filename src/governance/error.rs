//! Governance errors.
//!
//! Every failure is raised before any state is touched, except
//! `ExecutionFailed`, which is raised after the staged batch has been
//! discarded. Either way the store is exactly as it was before the call.

use super::threshold::ThresholdError;
use crate::actions::ActionError;
use crate::serialization::SerializationError;
use thiserror::Error;

/// Result type for governance operations.
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Logical class of a [`GovernanceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any mutation.
    Validation,
    /// Caller lacks the right to perform the operation.
    Authorization,
    /// Operation not legal in the proposal's current status.
    StateConflict,
    /// An action in the batch could not be applied; batch rolled back.
    ExecutionFailure,
    /// Lookup of an unknown proposal or voter.
    NotFound,
    /// Encoding of a response or snapshot failed.
    Internal,
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("Proposal title cannot be empty")]
    EmptyTitle,

    #[error("Proposal description cannot be empty")]
    EmptyDescription,

    #[error("Proposal must contain at least one action")]
    EmptyActionList,

    #[error("Metadata name cannot be empty")]
    EmptyName,

    #[error("Invalid action at index {index}: {source}")]
    InvalidAction {
        index: usize,
        #[source]
        source: ActionError,
    },

    #[error("{0}")]
    Threshold(#[from] ThresholdError),

    #[error("Requested expiration exceeds the maximum voting period")]
    MaxVotingPeriodExceeded,

    #[error("Wrong expiration option")]
    WrongExpiration,

    #[error("Maximum voting period cannot be zero")]
    InvalidVotingPeriod,

    #[error("Member address cannot be empty")]
    EmptyAddress,

    #[error("Duplicate member '{0}'")]
    DuplicateMember(String),

    #[error("Total member weight exceeds the supported maximum")]
    WeightOverflow,

    #[error("Executor address cannot be empty")]
    InvalidExecutor,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("'{0}' is not a voting member")]
    NotAMember(String),

    #[error("Proposal {0} is not open")]
    ProposalNotOpen(u64),

    #[error("Proposal {0} voting period has expired")]
    Expired(u64),

    #[error("Proposal must have passed and not yet been executed")]
    WrongExecuteState,

    #[error("Cannot close completed or passed proposals")]
    WrongCloseStatus,

    #[error("Cannot close an executed proposal")]
    CannotCloseExecuted,

    #[error("Proposal must expire before you can close it")]
    NotExpired,

    #[error("Execution of proposal {proposal_id} failed at action {index}: {source}")]
    ExecutionFailed {
        proposal_id: u64,
        index: usize,
        #[source]
        source: ActionError,
    },

    #[error("Proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("Voter '{0}' not found")]
    VoterNotFound(String),

    #[error("Malformed message: {0}")]
    InvalidMessage(#[source] SerializationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        use GovernanceError::*;
        match self {
            EmptyTitle
            | EmptyDescription
            | EmptyActionList
            | EmptyName
            | InvalidAction { .. }
            | Threshold(_)
            | MaxVotingPeriodExceeded
            | WrongExpiration
            | InvalidVotingPeriod
            | EmptyAddress
            | DuplicateMember(_)
            | WeightOverflow
            | InvalidMessage(_)
            | InvalidExecutor => ErrorKind::Validation,
            Unauthorized | NotAMember(_) => ErrorKind::Authorization,
            ProposalNotOpen(_)
            | Expired(_)
            | WrongExecuteState
            | WrongCloseStatus
            | CannotCloseExecuted
            | NotExpired => ErrorKind::StateConflict,
            ExecutionFailed { .. } => ErrorKind::ExecutionFailure,
            ProposalNotFound(_) | VoterNotFound(_) => ErrorKind::NotFound,
            Serialization(_) => ErrorKind::Internal,
        }
    }
}
