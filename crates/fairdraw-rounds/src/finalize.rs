use fairdraw_types::{FairdrawError, Result, RoundEvent, RoundId, U256};
use sha2::{Digest, Sha256};

use crate::registry::{record, RoundRegistry};

/// Final value of a round: SHA256(raw_entropy as 32 big-endian bytes || secret)
pub fn combine(raw_entropy: U256, secret: &[u8]) -> U256 {
    let mut raw = [0u8; 32];
    raw_entropy.to_big_endian(&mut raw);

    let mut hasher = Sha256::new();
    hasher.update(raw);
    hasher.update(secret);
    U256::from_big_endian(&hasher.finalize())
}

impl RoundRegistry {
    /// Reveal the secret for `round` and write its final result.
    ///
    /// Checks, in order: the round is live and not finalized, its entropy
    /// is resolved, the mode-specific source is readable (oracle word present,
    /// or the block-hash reveal window is open and the anchor hash is still
    /// served), and the secret matches the commitment. Any failure leaves the
    /// round untouched so a correct reveal can follow.
    pub fn finalize(&mut self, round: RoundId, secret: &[u8]) -> Result<U256> {
        if self.results.contains_key(&round) {
            return Err(FairdrawError::AlreadyFinalized(round));
        }
        let pending = self
            .slot
            .pending(round)
            .ok_or(FairdrawError::RoundNotOpen(round))?;
        if !self.fulfilled_at.contains_key(&round) {
            return Err(FairdrawError::NotFulfilled(round));
        }

        let raw_entropy = self.slot.resolved_entropy(pending, &*self.chain)?;

        if !pending.commitment.verify(secret) {
            tracing::debug!(round, "revealed secret does not match commitment");
            return Err(FairdrawError::InvalidSecret(round));
        }

        let result = combine(raw_entropy, secret);
        self.slot.remove(round);
        self.results.insert(round, result);
        record(&mut self.events, RoundEvent::RoundFinalized { round, result });
        tracing::info!(round, %result, "round finalized");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_matches_manual_hash() {
        let raw = U256::from(0x1234u64);
        let mut hasher = Sha256::new();
        let mut bytes = [0u8; 32];
        bytes[30] = 0x12;
        bytes[31] = 0x34;
        hasher.update(bytes);
        hasher.update(b"abc");
        let expected = U256::from_big_endian(&hasher.finalize());

        assert_eq!(combine(raw, b"abc"), expected);
    }

    #[test]
    fn test_combine_depends_on_both_inputs() {
        let base = combine(U256::from(7u64), b"secret");
        assert_ne!(base, combine(U256::from(8u64), b"secret"));
        assert_ne!(base, combine(U256::from(7u64), b"secreT"));
    }
}
