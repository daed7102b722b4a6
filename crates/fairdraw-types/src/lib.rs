mod round;
mod config;
mod event;
mod error;

pub use round::{RequestId, RoundId, RoundState, NO_ROUND};
pub use config::{BlockHashConfig, EngineConfig, EntropyMode, EntropyModeConfig, VrfConfig};
pub use event::RoundEvent;
pub use error::{ErrorKind, FairdrawError, Result};

/// 256-bit hash and word types shared across the workspace
pub use primitive_types::{H256, U256};

/// Oldest block (relative to its anchor) whose hash the host chain still serves
pub const MAX_BLOCK_HASH_AGE: u64 = 255;
