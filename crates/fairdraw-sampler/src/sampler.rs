use fairdraw_types::{FairdrawError, Result, U256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Largest number of values a single call may produce
pub const MAX_SAMPLE_COUNT: u32 = 1000;

/// Hash attempts allowed per output position before giving up
pub const MAX_ATTEMPTS: u32 = 10_000;

/// Parameters of a bounded unique sample, detached from the seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRequest {
    /// Domain separator so different consumers of one seed get unrelated draws
    pub tag: String,
    pub min: u32,
    pub max: u32,
    pub count: u32,
    #[serde(default)]
    pub offset: u64,
}

impl SampleRequest {
    pub fn new(tag: impl Into<String>, min: u32, max: u32, count: u32) -> Self {
        SampleRequest {
            tag: tag.into(),
            min,
            max,
            count,
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn sample(&self, seed: U256) -> Result<Vec<u32>> {
        sample(
            self.tag.as_bytes(),
            seed,
            self.min,
            self.max,
            self.count,
            self.offset,
        )
    }
}

/// Expand `seed` into `count` distinct integers in `[min, max]`.
///
/// Position `i` hashes `(tag, seed, i + offset, attempt)` for increasing
/// attempts. Candidates at or above the largest multiple of the range that
/// fits in 256 bits are rejected so the remainder is exactly uniform, and
/// values already produced by this call are skipped. The output is a pure
/// function of the arguments.
pub fn sample(
    tag: &[u8],
    seed: U256,
    min: u32,
    max: u32,
    count: u32,
    offset: u64,
) -> Result<Vec<u32>> {
    sample_with_attempts(tag, seed, min, max, count, offset, MAX_ATTEMPTS)
}

/// `sample` with a caller-chosen attempt budget per position
pub(crate) fn sample_with_attempts(
    tag: &[u8],
    seed: U256,
    min: u32,
    max: u32,
    count: u32,
    offset: u64,
    max_attempts: u32,
) -> Result<Vec<u32>> {
    if count == 0 || count > MAX_SAMPLE_COUNT {
        return Err(FairdrawError::InvalidCount(count));
    }
    if max < min {
        return Err(FairdrawError::InvalidRange { min, max });
    }
    let range = u64::from(max - min) + 1;
    if range < u64::from(count) {
        return Err(FairdrawError::RangeTooSmall { range, count });
    }
    if offset.checked_add(u64::from(count)).is_none() {
        return Err(FairdrawError::InvalidArgument(format!(
            "offset {} overflows with count {}",
            offset, count
        )));
    }

    let modulus = U256::from(range);
    let limit = rejection_limit(modulus);
    let mut seed_bytes = [0u8; 32];
    seed.to_big_endian(&mut seed_bytes);

    let mut values = Vec::with_capacity(count as usize);
    let mut seen = HashSet::with_capacity(count as usize);

    for index in 0..count {
        let position = offset + u64::from(index);
        let mut accepted = None;

        for attempt in 0..max_attempts {
            let word = candidate(tag, &seed_bytes, position, attempt);
            if limit.is_some_and(|limit| word >= limit) {
                continue;
            }
            let value = (u64::from(min) + (word % modulus).low_u64()) as u32;
            if seen.insert(value) {
                accepted = Some(value);
                break;
            }
        }

        match accepted {
            Some(value) => values.push(value),
            None => {
                return Err(FairdrawError::ExhaustedAttempts {
                    index,
                    attempts: max_attempts,
                })
            }
        }
    }

    Ok(values)
}

/// First rejected candidate, or `None` when `modulus` divides 2^256
fn rejection_limit(modulus: U256) -> Option<U256> {
    // 2^256 mod m, computed without leaving 256 bits
    let excess = (U256::MAX % modulus + 1) % modulus;
    if excess.is_zero() {
        None
    } else {
        Some(U256::MAX - excess + 1)
    }
}

fn candidate(tag: &[u8], seed: &[u8; 32], position: u64, attempt: u32) -> U256 {
    let mut hasher = Sha256::new();
    hasher.update((tag.len() as u32).to_be_bytes());
    hasher.update(tag);
    hasher.update(seed);
    hasher.update(position.to_be_bytes());
    hasher.update(attempt.to_be_bytes());
    U256::from_big_endian(&hasher.finalize())
}
