use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::round::{RequestId, RoundId};

/// Notification emitted by every registry transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    RoundChanged {
        previous: RoundId,
        current: RoundId,
    },
    RandomnessRequested {
        round: RoundId,
        request_id: Option<RequestId>,
        anchor_block: u64,
    },
    RandomnessFulfilled {
        round: RoundId,
        request_id: Option<RequestId>,
        block: u64,
    },
    RoundFinalized {
        round: RoundId,
        result: U256,
    },
    ConfigUpdated {
        field: String,
        value: String,
    },
}

impl RoundEvent {
    /// Round this event concerns, if any
    pub fn round(&self) -> Option<RoundId> {
        match self {
            RoundEvent::RoundChanged { current, .. } => Some(*current),
            RoundEvent::RandomnessRequested { round, .. }
            | RoundEvent::RandomnessFulfilled { round, .. }
            | RoundEvent::RoundFinalized { round, .. } => Some(*round),
            RoundEvent::ConfigUpdated { .. } => None,
        }
    }
}
