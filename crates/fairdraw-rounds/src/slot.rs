use fairdraw_entropy::{ChainView, VrfCoordinator, VrfRequest};
use fairdraw_types::{
    BlockHashConfig, EntropyMode, EntropyModeConfig, FairdrawError, RequestId, Result, RoundId,
    VrfConfig, MAX_BLOCK_HASH_AGE, U256,
};
use std::collections::BTreeMap;

use crate::pending::PendingRound;

/// Oracle mode: one global pending round, serialized on the callback
pub(crate) struct VrfSlot {
    pub(crate) coordinator: Box<dyn VrfCoordinator>,
    pub(crate) config: VrfConfig,
    pub(crate) pending: Option<PendingRound>,
    pub(crate) requests: BTreeMap<RequestId, RoundId>,
}

/// Block-hash mode: independent pending rounds keyed by id
pub(crate) struct BlockHashSlot {
    pub(crate) config: BlockHashConfig,
    pub(crate) pending: BTreeMap<RoundId, PendingRound>,
}

/// The registry's entropy source together with the in-flight records whose
/// shape depends on it. Every mode-dependent decision lives here.
pub(crate) enum EntropySlot {
    Vrf(VrfSlot),
    BlockHash(BlockHashSlot),
}

impl EntropySlot {
    pub(crate) fn vrf(config: VrfConfig, coordinator: Box<dyn VrfCoordinator>) -> Self {
        EntropySlot::Vrf(VrfSlot {
            coordinator,
            config,
            pending: None,
            requests: BTreeMap::new(),
        })
    }

    pub(crate) fn block_hash(config: BlockHashConfig) -> Self {
        EntropySlot::BlockHash(BlockHashSlot {
            config,
            pending: BTreeMap::new(),
        })
    }

    pub(crate) fn mode(&self) -> EntropyMode {
        match self {
            EntropySlot::Vrf(_) => EntropyMode::Vrf,
            EntropySlot::BlockHash(_) => EntropyMode::BlockHash,
        }
    }

    pub(crate) fn config(&self) -> EntropyModeConfig {
        match self {
            EntropySlot::Vrf(slot) => EntropyModeConfig::Vrf(slot.config.clone()),
            EntropySlot::BlockHash(slot) => EntropyModeConfig::BlockHash(slot.config),
        }
    }

    pub(crate) fn vrf_mut(&mut self) -> Result<&mut VrfSlot> {
        match self {
            EntropySlot::Vrf(slot) => Ok(slot),
            EntropySlot::BlockHash(_) => Err(FairdrawError::WrongMode(
                EntropyMode::BlockHash.to_string(),
            )),
        }
    }

    pub(crate) fn block_hash_mut(&mut self) -> Result<&mut BlockHashSlot> {
        match self {
            EntropySlot::BlockHash(slot) => Ok(slot),
            EntropySlot::Vrf(_) => Err(FairdrawError::WrongMode(EntropyMode::Vrf.to_string())),
        }
    }

    pub(crate) fn pending(&self, round: RoundId) -> Option<&PendingRound> {
        match self {
            EntropySlot::Vrf(slot) => slot.pending.as_ref().filter(|p| p.round == round),
            EntropySlot::BlockHash(slot) => slot.pending.get(&round),
        }
    }

    pub(crate) fn pending_rounds(&self) -> Vec<&PendingRound> {
        match self {
            EntropySlot::Vrf(slot) => slot.pending.iter().collect(),
            EntropySlot::BlockHash(slot) => slot.pending.values().collect(),
        }
    }

    /// Fails when the mode cannot take another in-flight round
    pub(crate) fn check_capacity(&self) -> Result<()> {
        match self {
            EntropySlot::Vrf(VrfSlot {
                pending: Some(pending),
                ..
            }) => Err(FairdrawError::OraclePending {
                pending: pending.round,
            }),
            _ => Ok(()),
        }
    }

    /// Ask the source to resolve. Oracle mode submits a request; block-hash
    /// mode has nothing to call.
    pub(crate) fn dispatch(&mut self) -> Result<Option<RequestId>> {
        match self {
            EntropySlot::Vrf(slot) => {
                let request = VrfRequest::from(&slot.config);
                slot.coordinator.request_random_words(&request).map(Some)
            }
            EntropySlot::BlockHash(_) => Ok(None),
        }
    }

    /// Record a freshly opened round. Returns true when opening also anchors
    /// the round, i.e. it is fulfilled immediately.
    pub(crate) fn admit(&mut self, pending: PendingRound) -> bool {
        match self {
            EntropySlot::Vrf(slot) => {
                if let Some(request_id) = pending.request_id {
                    slot.requests.insert(request_id, pending.round);
                }
                slot.pending = Some(pending);
                false
            }
            EntropySlot::BlockHash(slot) => {
                slot.pending.insert(pending.round, pending);
                true
            }
        }
    }

    pub(crate) fn remove(&mut self, round: RoundId) -> Option<PendingRound> {
        match self {
            EntropySlot::Vrf(slot) => {
                if slot.pending.as_ref().is_some_and(|p| p.round == round) {
                    slot.pending.take()
                } else {
                    None
                }
            }
            EntropySlot::BlockHash(slot) => slot.pending.remove(&round),
        }
    }

    pub(crate) fn round_for_request(&self, request_id: RequestId) -> Option<RoundId> {
        match self {
            EntropySlot::Vrf(slot) => slot.requests.get(&request_id).copied(),
            EntropySlot::BlockHash(_) => None,
        }
    }

    /// Raw entropy for a fulfilled round, or why it cannot be read yet
    pub(crate) fn resolved_entropy(
        &self,
        pending: &PendingRound,
        chain: &dyn ChainView,
    ) -> Result<U256> {
        match self {
            EntropySlot::Vrf(_) => pending
                .resolved_entropy
                .ok_or(FairdrawError::EntropyUnavailable(pending.round)),
            EntropySlot::BlockHash(slot) => {
                let anchor = pending.anchor_block;
                let current = chain.block_number();
                let earliest = anchor.saturating_add(slot.config.block_wait);
                let latest = anchor.saturating_add(MAX_BLOCK_HASH_AGE);

                if current < earliest {
                    return Err(FairdrawError::RevealTooEarly {
                        round: pending.round,
                        current,
                        earliest,
                    });
                }
                if current > latest {
                    tracing::warn!(
                        round = pending.round,
                        anchor,
                        current,
                        "reveal window expired, round can no longer be finalized"
                    );
                    return Err(FairdrawError::RevealWindowExpired {
                        round: pending.round,
                        current,
                        latest,
                    });
                }

                let hash = chain.block_hash(anchor);
                if hash.is_zero() {
                    return Err(FairdrawError::BlockHashUnavailable {
                        round: pending.round,
                        block: anchor,
                    });
                }
                Ok(U256::from_big_endian(hash.as_bytes()))
            }
        }
    }
}
