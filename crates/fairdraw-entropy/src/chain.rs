use fairdraw_types::{H256, MAX_BLOCK_HASH_AGE};

/// Number of recent blocks whose hashes the host keeps readable. A round
/// revealed at `anchor + MAX_BLOCK_HASH_AGE` still reads its anchor hash.
pub const BLOCK_HASH_RETENTION: u64 = MAX_BLOCK_HASH_AGE + 1;

/// Read-only view of the host chain.
pub trait ChainView: Send + Sync {
    /// Current block number
    fn block_number(&self) -> u64;

    /// Hash of a past block, or `H256::zero()` when the host no longer (or
    /// not yet) serves it
    fn block_hash(&self, number: u64) -> H256;
}

impl<T: ChainView + ?Sized> ChainView for Box<T> {
    fn block_number(&self) -> u64 {
        (**self).block_number()
    }

    fn block_hash(&self, number: u64) -> H256 {
        (**self).block_hash(number)
    }
}
