use fairdraw_sampler::SampleRequest;
use fairdraw_types::{EngineConfig, FairdrawError, Result, VrfConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub description: String,

    /// Engine under test
    pub engine: EngineConfig,

    /// Number of rounds to open and finalize
    pub num_rounds: usize,

    /// Oracle reply latency
    pub oracle_delay_ms: u64,

    /// Blocks mined between fulfillment and the reveal
    pub reveal_after_blocks: u64,

    /// Chain height when the run starts
    pub start_block: u64,

    /// Operator secrets are derived from this
    pub seed: u64,

    /// Draw to take from every finalized round
    pub sample: Option<SampleRequest>,

    /// Expected outcomes for validation
    pub expected_outcomes: Option<ExpectedOutcomes>,
}

/// Expected outcomes for scenario validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedOutcomes {
    /// Rounds that must reach a final result
    pub min_finalized: Option<usize>,

    /// Rounds allowed to be lost to an expired reveal window
    pub max_expired: Option<usize>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            name: "default".to_string(),
            description: "Oracle rounds with prompt reveals".to_string(),
            engine: EngineConfig::default(),
            num_rounds: 5,
            oracle_delay_ms: 5,
            reveal_after_blocks: 1,
            start_block: 100,
            seed: 42,
            sample: None,
            expected_outcomes: None,
        }
    }
}

impl ScenarioConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScenarioConfig = serde_json::from_str(json)
            .map_err(|e| FairdrawError::SerializationError(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| FairdrawError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Scenario A: oracle rounds, each drawing a raffle
    pub fn oracle_raffle() -> Self {
        ScenarioConfig {
            name: "A_oracle_raffle".to_string(),
            description: "VRF rounds with secret combination and a 3-of-100 draw".to_string(),
            engine: EngineConfig::vrf(VrfConfig {
                request_confirmations: 3,
                num_words: 2,
                ..VrfConfig::default()
            }),
            num_rounds: 8,
            sample: Some(SampleRequest::new("raffle", 1, 100, 3)),
            expected_outcomes: Some(ExpectedOutcomes {
                min_finalized: Some(8),
                max_expired: Some(0),
            }),
            ..Default::default()
        }
    }

    /// Scenario B: block-hash rounds revealed inside the window
    pub fn block_hash_prompt() -> Self {
        ScenarioConfig {
            name: "B_block_hash_prompt".to_string(),
            description: "Block-hash rounds revealed right after the wait".to_string(),
            engine: EngineConfig::block_hash(5),
            num_rounds: 10,
            reveal_after_blocks: 5,
            sample: Some(SampleRequest::new("lottery", 1, 49, 6)),
            expected_outcomes: Some(ExpectedOutcomes {
                min_finalized: Some(10),
                max_expired: Some(0),
            }),
            ..Default::default()
        }
    }

    /// Scenario C: operator reveals too late, every round is lost
    pub fn block_hash_late_reveal() -> Self {
        ScenarioConfig {
            name: "C_block_hash_late_reveal".to_string(),
            description: "Reveals past the 255-block window".to_string(),
            engine: EngineConfig::block_hash(5),
            num_rounds: 3,
            reveal_after_blocks: 300,
            expected_outcomes: Some(ExpectedOutcomes {
                min_finalized: Some(0),
                max_expired: Some(3),
            }),
            ..Default::default()
        }
    }

    /// Scenario D: raw oracle output accepted without a reveal
    pub fn oracle_uncombined() -> Self {
        ScenarioConfig {
            name: "D_oracle_uncombined".to_string(),
            description: "VRF rounds with secret combination disabled".to_string(),
            engine: EngineConfig::default().with_secret_combination(false),
            num_rounds: 4,
            expected_outcomes: Some(ExpectedOutcomes {
                min_finalized: Some(4),
                max_expired: Some(0),
            }),
            ..Default::default()
        }
    }

    pub fn all_presets() -> Vec<Self> {
        vec![
            Self::oracle_raffle(),
            Self::block_hash_prompt(),
            Self::block_hash_late_reveal(),
            Self::oracle_uncombined(),
        ]
    }
}
