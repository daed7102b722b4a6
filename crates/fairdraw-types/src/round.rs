use serde::{Deserialize, Serialize};
use std::fmt;

/// Round identifier (sequential counter, 0 means "no round")
pub type RoundId = u64;

/// Reserved identifier that never names a real round
pub const NO_ROUND: RoundId = 0;

/// Opaque identifier issued by the VRF coordinator for a randomness request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Lifecycle of a single round. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoundState {
    /// No commitment recorded
    Unopened,
    /// Commitment recorded, entropy requested but not resolved
    Committed,
    /// Entropy resolved (oracle mode) or anchored (block-hash mode)
    Fulfilled,
    /// Final result written; terminal
    Finalized,
}

impl RoundState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundState::Finalized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::Unopened => "UNOPENED",
            RoundState::Committed => "COMMITTED",
            RoundState::Fulfilled => "FULFILLED",
            RoundState::Finalized => "FINALIZED",
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
