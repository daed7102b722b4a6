use fairdraw_entropy::{ChainView, VrfCoordinator};
use fairdraw_types::{
    BlockHashConfig, EngineConfig, EntropyMode, EntropyModeConfig, FairdrawError, RequestId,
    Result, RoundEvent, RoundId, RoundState, VrfConfig, H256, NO_ROUND, U256,
};
use std::collections::BTreeMap;
use std::fmt;

use crate::commitment::Commitment;
use crate::pending::PendingRound;
use crate::slot::EntropySlot;

/// Most recent events kept in the registry log; older ones are dropped
pub const MAX_RETAINED_EVENTS: usize = 1024;

pub(crate) fn record(events: &mut Vec<RoundEvent>, event: RoundEvent) {
    if events.len() >= MAX_RETAINED_EVENTS {
        let excess = events.len() + 1 - MAX_RETAINED_EVENTS;
        events.drain(..excess);
    }
    events.push(event);
}

/// Owns every round record and enforces the per-round state machine
/// `Unopened -> Committed -> Fulfilled -> Finalized`.
///
/// The entropy mode is chosen once at construction. Every failing operation
/// returns before touching state.
pub struct RoundRegistry {
    pub(crate) chain: Box<dyn ChainView>,
    pub(crate) slot: EntropySlot,
    pub(crate) needs_secret_combination: bool,
    pub(crate) current_round: RoundId,
    pub(crate) fulfilled_at: BTreeMap<RoundId, u64>,
    pub(crate) results: BTreeMap<RoundId, U256>,
    pub(crate) events: Vec<RoundEvent>,
}

impl RoundRegistry {
    /// Registry backed by an asynchronous VRF oracle
    pub fn vrf(
        config: VrfConfig,
        chain: impl ChainView + 'static,
        coordinator: impl VrfCoordinator + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_slot(
            EntropySlot::vrf(config, Box::new(coordinator)),
            Box::new(chain),
            true,
        ))
    }

    /// Registry backed by delayed block hashes
    pub fn block_hash(config: BlockHashConfig, chain: impl ChainView + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_slot(
            EntropySlot::block_hash(config),
            Box::new(chain),
            true,
        ))
    }

    /// Build from a loaded config. Oracle mode requires a coordinator.
    pub fn from_config(
        config: EngineConfig,
        chain: Box<dyn ChainView>,
        coordinator: Option<Box<dyn VrfCoordinator>>,
    ) -> Result<Self> {
        config.validate()?;
        let slot = match (config.entropy, coordinator) {
            (EntropyModeConfig::Vrf(vrf), Some(coordinator)) => EntropySlot::vrf(vrf, coordinator),
            (EntropyModeConfig::Vrf(_), None) => {
                return Err(FairdrawError::Config(
                    "vrf mode requires a coordinator".to_string(),
                ))
            }
            (EntropyModeConfig::BlockHash(block_hash), _) => EntropySlot::block_hash(block_hash),
        };
        Ok(Self::with_slot(slot, chain, config.needs_secret_combination))
    }

    /// Toggle combining oracle output with the operator secret
    pub fn with_secret_combination(mut self, enabled: bool) -> Self {
        self.needs_secret_combination = enabled;
        self.warn_if_uncombined();
        self
    }

    fn with_slot(slot: EntropySlot, chain: Box<dyn ChainView>, combine: bool) -> Self {
        let registry = RoundRegistry {
            chain,
            slot,
            needs_secret_combination: combine,
            current_round: NO_ROUND,
            fulfilled_at: BTreeMap::new(),
            results: BTreeMap::new(),
            events: Vec::new(),
        };
        tracing::info!(mode = %registry.mode(), "round registry created");
        registry.warn_if_uncombined();
        registry
    }

    fn warn_if_uncombined(&self) {
        if self.slot.mode() == EntropyMode::Vrf && !self.needs_secret_combination {
            tracing::warn!(
                "secret combination disabled: raw oracle output becomes final without a reveal"
            );
        }
    }

    // ----- round counter -----

    pub fn current_round(&self) -> RoundId {
        self.current_round
    }

    /// Move to the next round id. Does not open it.
    pub fn advance(&mut self) -> Result<RoundId> {
        self.advance_by(1)
    }

    /// Skip ahead by `n` round ids (`n > 0`)
    pub fn advance_by(&mut self, n: u64) -> Result<RoundId> {
        if n == 0 {
            return Err(FairdrawError::InvalidAdvance);
        }
        let next = self
            .current_round
            .checked_add(n)
            .ok_or(FairdrawError::RoundOverflow)?;
        self.set_current(next);
        Ok(next)
    }

    fn set_current(&mut self, next: RoundId) {
        let previous = self.current_round;
        self.current_round = next;
        tracing::info!(previous, current = next, "round changed");
        record(&mut self.events, RoundEvent::RoundChanged {
            previous,
            current: next,
        });
    }

    // ----- commit -----

    /// Commit to a secret for the current round and ask the entropy source
    /// to resolve
    pub fn open_round(&mut self, commitment: Commitment) -> Result<RoundId> {
        self.open(self.current_round, commitment, false)
    }

    /// Advance by one and open the new round in a single step. Nothing
    /// changes if opening fails.
    pub fn open_next_round(&mut self, commitment: Commitment) -> Result<RoundId> {
        let next = self
            .current_round
            .checked_add(1)
            .ok_or(FairdrawError::RoundOverflow)?;
        self.open(next, commitment, true)
    }

    fn open(&mut self, round: RoundId, commitment: Commitment, advance: bool) -> Result<RoundId> {
        if round == NO_ROUND {
            return Err(FairdrawError::NoActiveRound);
        }
        if commitment.is_zero() {
            return Err(FairdrawError::InvalidCommitment(
                "commitment must be non-zero".to_string(),
            ));
        }
        if self.results.contains_key(&round) {
            return Err(FairdrawError::AlreadyFinalized(round));
        }
        if self.slot.pending(round).is_some() {
            return Err(FairdrawError::AlreadyOpen(round));
        }
        if self.fulfilled_at.contains_key(&round) {
            return Err(FairdrawError::AlreadyFulfilled(round));
        }
        self.slot.check_capacity()?;

        let anchor_block = self.chain.block_number();
        let request_id = self.slot.dispatch()?;
        if let Some(id) = request_id {
            if let Some(owner) = self.slot.round_for_request(id) {
                tracing::warn!(round, request_id = %id, owner, "coordinator reused a request id");
                return Err(FairdrawError::DuplicateRequest {
                    request: id,
                    round: owner,
                });
            }
        }

        if advance {
            self.set_current(round);
        }

        let anchored = self.slot.admit(PendingRound {
            round,
            commitment,
            resolved_entropy: None,
            anchor_block,
            request_id,
        });
        tracing::info!(round, %commitment, anchor_block, ?request_id, "round opened");
        record(&mut self.events, RoundEvent::RandomnessRequested {
            round,
            request_id,
            anchor_block,
        });

        if anchored {
            self.fulfilled_at.insert(round, anchor_block);
            record(&mut self.events, RoundEvent::RandomnessFulfilled {
                round,
                request_id,
                block: anchor_block,
            });
        }

        Ok(round)
    }

    // ----- oracle callback -----

    /// Deliver the oracle's answer for `request_id`. Only the globally
    /// pending round accepts it.
    pub fn fulfill_random_words(&mut self, request_id: RequestId, words: &[U256]) -> Result<RoundId> {
        let block = self.chain.block_number();
        let combine = self.needs_secret_combination;
        let slot = self.slot.vrf_mut()?;

        let round = slot
            .requests
            .get(&request_id)
            .copied()
            .ok_or(FairdrawError::UnknownRequest(request_id))?;
        let pending = match slot.pending.as_mut() {
            Some(pending) if pending.round == round => pending,
            _ => {
                tracing::debug!(%request_id, round, "callback does not match the pending round");
                return Err(FairdrawError::StaleCallback {
                    request: request_id,
                    round,
                });
            }
        };
        if self.fulfilled_at.contains_key(&round) {
            return Err(FairdrawError::AlreadyFulfilled(round));
        }
        let word = *words
            .first()
            .ok_or(FairdrawError::EmptyRandomWords(request_id))?;

        self.fulfilled_at.insert(round, block);
        record(&mut self.events, RoundEvent::RandomnessFulfilled {
            round,
            request_id: Some(request_id),
            block,
        });

        if combine {
            pending.resolved_entropy = Some(word);
            tracing::info!(round, %request_id, block, "randomness fulfilled");
        } else {
            slot.pending = None;
            self.results.insert(round, word);
            record(&mut self.events, RoundEvent::RoundFinalized {
                round,
                result: word,
            });
            tracing::warn!(round, %request_id, "raw oracle output accepted as final result");
        }

        Ok(round)
    }

    // ----- queries -----

    pub fn mode(&self) -> EntropyMode {
        self.slot.mode()
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            entropy: self.slot.config(),
            needs_secret_combination: self.needs_secret_combination,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.chain.block_number()
    }

    pub fn is_fulfilled(&self, round: RoundId) -> bool {
        self.fulfilled_at.contains_key(&round)
    }

    pub fn is_finalized(&self, round: RoundId) -> bool {
        self.results.contains_key(&round)
    }

    /// Final value of a round; fails until the round is finalized
    pub fn final_result(&self, round: RoundId) -> Result<U256> {
        self.results
            .get(&round)
            .copied()
            .ok_or(FairdrawError::NotFinalized(round))
    }

    pub fn fulfillment_block(&self, round: RoundId) -> Option<u64> {
        self.fulfilled_at.get(&round).copied()
    }

    pub fn round_for_request(&self, request_id: RequestId) -> Option<RoundId> {
        self.slot.round_for_request(request_id)
    }

    pub fn pending_round(&self, round: RoundId) -> Option<&PendingRound> {
        self.slot.pending(round)
    }

    pub fn pending_rounds(&self) -> Vec<&PendingRound> {
        self.slot.pending_rounds()
    }

    pub fn round_state(&self, round: RoundId) -> RoundState {
        if self.is_finalized(round) {
            RoundState::Finalized
        } else if self.is_fulfilled(round) {
            RoundState::Fulfilled
        } else if self.slot.pending(round).is_some() {
            RoundState::Committed
        } else {
            RoundState::Unopened
        }
    }

    /// Draw `count` distinct values in `[min, max]` from a finalized round
    pub fn sample(
        &self,
        tag: &[u8],
        round: RoundId,
        min: u32,
        max: u32,
        count: u32,
        offset: u64,
    ) -> Result<Vec<u32>> {
        let seed = self.final_result(round)?;
        fairdraw_sampler::sample(tag, seed, min, max, count, offset)
    }

    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    // ----- operator configuration -----

    pub fn set_key_hash(&mut self, key_hash: H256) -> Result<()> {
        self.update_vrf("key_hash", format!("{:?}", key_hash), |c| c.key_hash = key_hash)
    }

    pub fn set_request_confirmations(&mut self, confirmations: u16) -> Result<()> {
        self.update_vrf("request_confirmations", confirmations.to_string(), |c| {
            c.request_confirmations = confirmations
        })
    }

    pub fn set_callback_gas_limit(&mut self, gas_limit: u32) -> Result<()> {
        self.update_vrf("callback_gas_limit", gas_limit.to_string(), |c| {
            c.callback_gas_limit = gas_limit
        })
    }

    pub fn set_num_words(&mut self, num_words: u32) -> Result<()> {
        self.update_vrf("num_words", num_words.to_string(), |c| c.num_words = num_words)
    }

    pub fn set_native_payment(&mut self, native: bool) -> Result<()> {
        self.update_vrf("native_payment", native.to_string(), |c| c.native_payment = native)
    }

    pub fn set_needs_secret_combination(&mut self, enabled: bool) -> Result<()> {
        self.slot.vrf_mut()?;
        self.needs_secret_combination = enabled;
        self.config_updated("needs_secret_combination", enabled.to_string());
        self.warn_if_uncombined();
        Ok(())
    }

    pub fn set_block_wait(&mut self, block_wait: u64) -> Result<()> {
        let slot = self.slot.block_hash_mut()?;
        let updated = BlockHashConfig { block_wait };
        updated.validate()?;
        slot.config = updated;
        self.config_updated("block_wait", block_wait.to_string());
        Ok(())
    }

    fn update_vrf(
        &mut self,
        field: &str,
        value: String,
        apply: impl FnOnce(&mut VrfConfig),
    ) -> Result<()> {
        let slot = self.slot.vrf_mut()?;
        let mut updated = slot.config.clone();
        apply(&mut updated);
        updated.validate()?;
        slot.config = updated;
        self.config_updated(field, value);
        Ok(())
    }

    fn config_updated(&mut self, field: &str, value: String) {
        tracing::info!(field, %value, "config updated");
        record(&mut self.events, RoundEvent::ConfigUpdated {
            field: field.to_string(),
            value,
        });
    }
}

impl fmt::Debug for RoundRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundRegistry")
            .field("mode", &self.mode())
            .field("current_round", &self.current_round)
            .field("pending", &self.pending_rounds())
            .field("finalized", &self.results.len())
            .finish_non_exhaustive()
    }
}
