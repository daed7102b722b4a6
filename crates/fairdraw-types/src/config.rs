use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{FairdrawError, Result};
use crate::MAX_BLOCK_HASH_AGE;

/// Upper bound the VRF coordinator accepts for request confirmations
pub const MAX_REQUEST_CONFIRMATIONS: u16 = 200;

/// Upper bound the VRF coordinator accepts for words per request
pub const MAX_NUM_WORDS: u32 = 500;

/// Which entropy source a registry was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntropyMode {
    Vrf,
    BlockHash,
}

impl fmt::Display for EntropyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyMode::Vrf => f.write_str("vrf"),
            EntropyMode::BlockHash => f.write_str("block-hash"),
        }
    }
}

/// Parameters forwarded with every VRF request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrfConfig {
    /// Oracle key identity (gas lane)
    pub key_hash: H256,

    /// Block confirmations the oracle waits before answering
    pub request_confirmations: u16,

    /// Gas budget for the callback
    pub callback_gas_limit: u32,

    /// Random words requested; only the first one feeds the round
    pub num_words: u32,

    /// Pay in native currency instead of the fee token
    pub native_payment: bool,
}

impl Default for VrfConfig {
    fn default() -> Self {
        VrfConfig {
            key_hash: H256::zero(),
            request_confirmations: 3,
            callback_gas_limit: 200_000,
            num_words: 1,
            native_payment: false,
        }
    }
}

impl VrfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_confirmations == 0 || self.request_confirmations > MAX_REQUEST_CONFIRMATIONS
        {
            return Err(FairdrawError::Config(format!(
                "request_confirmations must be in 1..={}, got {}",
                MAX_REQUEST_CONFIRMATIONS, self.request_confirmations
            )));
        }
        if self.callback_gas_limit == 0 {
            return Err(FairdrawError::Config(
                "callback_gas_limit must be non-zero".to_string(),
            ));
        }
        if self.num_words == 0 || self.num_words > MAX_NUM_WORDS {
            return Err(FairdrawError::Config(format!(
                "num_words must be in 1..={}, got {}",
                MAX_NUM_WORDS, self.num_words
            )));
        }
        Ok(())
    }
}

/// Parameters for the delayed block-hash source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHashConfig {
    /// Confirmations to wait after the anchor block before revealing (1..=255)
    pub block_wait: u64,
}

impl Default for BlockHashConfig {
    fn default() -> Self {
        BlockHashConfig { block_wait: 5 }
    }
}

impl BlockHashConfig {
    pub fn validate(&self) -> Result<()> {
        validate_block_wait(self.block_wait)
    }
}

fn validate_block_wait(block_wait: u64) -> Result<()> {
    if block_wait == 0 || block_wait > MAX_BLOCK_HASH_AGE {
        return Err(FairdrawError::Config(format!(
            "block_wait must be in 1..={}, got {}",
            MAX_BLOCK_HASH_AGE, block_wait
        )));
    }
    Ok(())
}

/// Entropy source selection; fixed for the lifetime of a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntropyModeConfig {
    Vrf(VrfConfig),
    BlockHash(BlockHashConfig),
}

impl EntropyModeConfig {
    pub fn mode(&self) -> EntropyMode {
        match self {
            EntropyModeConfig::Vrf(_) => EntropyMode::Vrf,
            EntropyModeConfig::BlockHash(_) => EntropyMode::BlockHash,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub entropy: EntropyModeConfig,

    /// Combine oracle output with the operator secret. When disabled the raw
    /// oracle word becomes final on callback and no reveal happens.
    #[serde(default = "default_needs_secret_combination")]
    pub needs_secret_combination: bool,
}

fn default_needs_secret_combination() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::vrf(VrfConfig::default())
    }
}

impl EngineConfig {
    pub fn vrf(config: VrfConfig) -> Self {
        EngineConfig {
            entropy: EntropyModeConfig::Vrf(config),
            needs_secret_combination: true,
        }
    }

    pub fn block_hash(block_wait: u64) -> Self {
        EngineConfig {
            entropy: EntropyModeConfig::BlockHash(BlockHashConfig { block_wait }),
            needs_secret_combination: true,
        }
    }

    pub fn with_secret_combination(mut self, enabled: bool) -> Self {
        self.needs_secret_combination = enabled;
        self
    }

    pub fn mode(&self) -> EntropyMode {
        self.entropy.mode()
    }

    pub fn validate(&self) -> Result<()> {
        match &self.entropy {
            EntropyModeConfig::Vrf(vrf) => vrf.validate(),
            EntropyModeConfig::BlockHash(block_hash) => block_hash.validate(),
        }
    }

    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| FairdrawError::SerializationError(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| FairdrawError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}
