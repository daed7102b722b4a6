use fairdraw_types::{RequestId, RoundId, U256};
use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;

/// In-flight round, deleted once the round is finalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRound {
    pub round: RoundId,
    /// Fixed at commit time
    pub commitment: Commitment,
    /// Raw oracle output; stays `None` in block-hash mode
    pub resolved_entropy: Option<U256>,
    /// Block at which the commitment was recorded
    pub anchor_block: u64,
    /// Oracle request issued for this round
    pub request_id: Option<RequestId>,
}
