use thiserror::Error;

use crate::round::{RequestId, RoundId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FairdrawError {
    #[error("No active round: advance the round counter before opening")]
    NoActiveRound,

    #[error("Round {0} is not open")]
    RoundNotOpen(RoundId),

    #[error("Round {0} is already open")]
    AlreadyOpen(RoundId),

    #[error("Round {0} is already fulfilled")]
    AlreadyFulfilled(RoundId),

    #[error("Round {0} is already finalized")]
    AlreadyFinalized(RoundId),

    #[error("Round {0} is not fulfilled")]
    NotFulfilled(RoundId),

    #[error("Round {0} is not finalized")]
    NotFinalized(RoundId),

    #[error("Oracle round {pending} is still pending")]
    OraclePending { pending: RoundId },

    #[error("Unknown request: {0}")]
    UnknownRequest(RequestId),

    #[error("Request {request} already belongs to round {round}")]
    DuplicateRequest { request: RequestId, round: RoundId },

    #[error("Stale callback: {request} targets round {round} which is not the pending round")]
    StaleCallback { request: RequestId, round: RoundId },

    #[error("Callback for {0} carried no random words")]
    EmptyRandomWords(RequestId),

    #[error("Operation not supported in {0} mode")]
    WrongMode(String),

    #[error("Invalid secret for round {0}")]
    InvalidSecret(RoundId),

    #[error("Entropy for round {0} is not available yet")]
    EntropyUnavailable(RoundId),

    #[error("Reveal too early for round {round}: current block {current}, earliest {earliest}")]
    RevealTooEarly {
        round: RoundId,
        current: u64,
        earliest: u64,
    },

    #[error("Reveal window expired for round {round}: current block {current}, latest {latest}")]
    RevealWindowExpired {
        round: RoundId,
        current: u64,
        latest: u64,
    },

    #[error("Block hash unavailable for round {round} (block {block})")]
    BlockHashUnavailable { round: RoundId, block: u64 },

    #[error("Exhausted {attempts} attempts sampling index {index}")]
    ExhaustedAttempts { index: u32, attempts: u32 },

    #[error("Advance amount must be greater than zero")]
    InvalidAdvance,

    #[error("Round counter overflow")]
    RoundOverflow,

    #[error("Invalid count: {0} (expected 1..=1000)")]
    InvalidCount(u32),

    #[error("Invalid range: min={min}, max={max}")]
    InvalidRange { min: u32, max: u32 },

    #[error("Range of {range} values cannot hold {count} unique samples")]
    RangeTooSmall { range: u64, count: u32 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Entropy source error: {0}")]
    Entropy(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Coarse failure classes callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation invoked in the wrong state
    Sequencing,
    /// Revealed secret does not match the commitment
    Authentication,
    /// Block-hash reveal outside its window
    Window,
    /// Sampler ran out of attempts
    Exhaustion,
    InvalidArgument,
    External,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Sequencing => "sequencing",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Window => "window",
            ErrorKind::Exhaustion => "exhaustion",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::External => "external",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FairdrawError {
    pub fn kind(&self) -> ErrorKind {
        use FairdrawError::*;
        match self {
            NoActiveRound | RoundNotOpen(_) | AlreadyOpen(_) | AlreadyFulfilled(_)
            | AlreadyFinalized(_) | NotFulfilled(_) | NotFinalized(_) | OraclePending { .. }
            | UnknownRequest(_) | DuplicateRequest { .. } | StaleCallback { .. } | WrongMode(_)
            | EntropyUnavailable(_) => ErrorKind::Sequencing,
            InvalidSecret(_) => ErrorKind::Authentication,
            RevealTooEarly { .. } | RevealWindowExpired { .. } | BlockHashUnavailable { .. } => {
                ErrorKind::Window
            }
            ExhaustedAttempts { .. } => ErrorKind::Exhaustion,
            InvalidAdvance | RoundOverflow | InvalidCount(_) | InvalidRange { .. }
            | RangeTooSmall { .. } | InvalidArgument(_) | InvalidCommitment(_) | Config(_)
            | EmptyRandomWords(_) | SerializationError(_) => ErrorKind::InvalidArgument,
            Entropy(_) | IoError(_) => ErrorKind::External,
        }
    }

    /// False when the round can never be finalized anymore
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            FairdrawError::RevealWindowExpired { .. } | FairdrawError::BlockHashUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FairdrawError>;
