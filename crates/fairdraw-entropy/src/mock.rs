use fairdraw_types::{FairdrawError, RequestId, Result, H256, U256};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::chain::{ChainView, BLOCK_HASH_RETENTION};
use crate::vrf::{VrfCoordinator, VrfRequest};

/// In-memory chain with a movable head and deterministic block hashes.
/// Clones share the same head, so a test can keep a handle while the
/// registry owns another.
#[derive(Debug, Clone)]
pub struct MockChain {
    height: Arc<AtomicU64>,
    salt: H256,
}

impl MockChain {
    /// Create a chain at the given height
    pub fn new(height: u64) -> Self {
        MockChain {
            height: Arc::new(AtomicU64::new(height)),
            salt: H256::repeat_byte(0x42),
        }
    }

    /// Use a different salt so two chains produce different hashes
    pub fn with_salt(mut self, salt: H256) -> Self {
        self.salt = salt;
        self
    }

    /// Produce `count` new blocks and return the new height
    pub fn mine(&self, count: u64) -> u64 {
        self.height.fetch_add(count, Ordering::SeqCst) + count
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Hash the block would have regardless of retention
    pub fn canonical_hash(&self, number: u64) -> H256 {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(number.to_be_bytes());
        H256::from_slice(&hasher.finalize())
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ChainView for MockChain {
    fn block_number(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    fn block_hash(&self, number: u64) -> H256 {
        let head = self.block_number();
        if number >= head || head - number > BLOCK_HASH_RETENTION {
            return H256::zero();
        }
        self.canonical_hash(number)
    }
}

#[derive(Debug, Default)]
struct CoordinatorState {
    next_id: u64,
    requests: Vec<(RequestId, VrfRequest)>,
    reject: bool,
}

/// VRF coordinator that records requests instead of answering them.
/// Tests pull deterministic words with [`MockVrfCoordinator::random_words_for`]
/// and deliver them to the registry themselves.
#[derive(Debug, Clone)]
pub struct MockVrfCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
    seed: H256,
}

impl MockVrfCoordinator {
    pub fn new() -> Self {
        MockVrfCoordinator {
            state: Arc::new(Mutex::new(CoordinatorState {
                next_id: 1,
                ..CoordinatorState::default()
            })),
            seed: H256::repeat_byte(0x07),
        }
    }

    pub fn with_seed(mut self, seed: H256) -> Self {
        self.seed = seed;
        self
    }

    /// Make subsequent requests fail (simulates an unfunded subscription)
    pub fn reject_requests(&self, reject: bool) {
        self.state().reject = reject;
    }

    /// All accepted requests in submission order
    pub fn requests(&self) -> Vec<(RequestId, VrfRequest)> {
        self.state().requests.clone()
    }

    pub fn last_request_id(&self) -> Option<RequestId> {
        self.state().requests.last().map(|(id, _)| *id)
    }

    /// Words the oracle would deliver for a request it has accepted
    pub fn random_words_for(&self, request_id: RequestId) -> Option<Vec<U256>> {
        let state = self.state();
        let (_, request) = state.requests.iter().find(|(id, _)| *id == request_id)?;
        let words = (0..request.num_words)
            .map(|i| {
                let mut hasher = Sha256::new();
                hasher.update(self.seed.as_bytes());
                hasher.update(request_id.0.to_be_bytes());
                hasher.update(i.to_be_bytes());
                U256::from_big_endian(&hasher.finalize())
            })
            .collect();
        Some(words)
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockVrfCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl VrfCoordinator for MockVrfCoordinator {
    fn request_random_words(&mut self, request: &VrfRequest) -> Result<RequestId> {
        let mut state = self.state();
        if state.reject {
            return Err(FairdrawError::Entropy(
                "coordinator rejected request".to_string(),
            ));
        }
        let id = RequestId(state.next_id);
        state.next_id += 1;
        state.requests.push((id, request.clone()));
        tracing::debug!(request_id = %id, num_words = request.num_words, "mock vrf request accepted");
        Ok(id)
    }
}
