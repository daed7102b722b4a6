use crate::oracle::spawn_oracle;
use crate::scenario::ScenarioConfig;
use fairdraw_entropy::{ChainView, MockChain, VrfCoordinator};
use fairdraw_rounds::{Commitment, RoundRegistry};
use fairdraw_types::{EntropyMode, EntropyModeConfig, FairdrawError, Result, RoundId, H256, U256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Result of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimResult {
    pub scenario_name: String,
    pub rounds: Vec<RoundOutcome>,
    pub summary: SimSummary,
}

/// Result of a single round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: RoundId,
    pub request_id: Option<u64>,
    pub anchor_block: u64,
    /// Final value as 0x-prefixed hex
    pub result: Option<String>,
    pub sample: Option<Vec<u32>>,
    pub error: Option<String>,
    pub expired: bool,
    pub runtime_ms: f64,
}

/// Summary statistics across all rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSummary {
    pub total_rounds: usize,
    pub finalized: usize,
    pub expired: usize,
    pub failed: usize,
    pub events_emitted: usize,
    pub total_runtime_ms: f64,
    pub passed: bool,
    pub failure_reasons: Vec<String>,
}

/// Operator secret for a round: SHA256(seed || round), both big-endian
pub fn derive_secret(seed: u64, round: RoundId) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_be_bytes());
    hasher.update(round.to_be_bytes());
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&hasher.finalize());
    secret
}

fn word_hex(word: U256) -> String {
    let mut bytes = [0u8; 32];
    word.to_big_endian(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

fn lock(registry: &Mutex<RoundRegistry>) -> MutexGuard<'_, RoundRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives scenarios against a registry over a local chain
pub struct SimRunner {
    oracle_timeout: Duration,
}

impl SimRunner {
    pub fn new() -> Self {
        Self {
            oracle_timeout: Duration::from_secs(5),
        }
    }

    /// Give up on a round whose oracle answer takes longer than this
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Run a scenario: open, resolve and reveal `num_rounds` rounds in order
    pub async fn run_scenario(&self, config: &ScenarioConfig) -> Result<SimResult> {
        let started = Instant::now();
        let chain = MockChain::new(config.start_block);
        let mode = config.engine.mode();

        let (coordinator, replies) = match mode {
            EntropyMode::Vrf => {
                let (coordinator, replies) = spawn_oracle(
                    Duration::from_millis(config.oracle_delay_ms),
                    H256::from_low_u64_be(config.seed),
                );
                (Some(Box::new(coordinator) as Box<dyn VrfCoordinator>), Some(replies))
            }
            EntropyMode::BlockHash => (None, None),
        };
        let registry = RoundRegistry::from_config(
            config.engine.clone(),
            Box::new(chain.clone()),
            coordinator,
        )?;
        let registry = Arc::new(Mutex::new(registry));

        // Oracle answers are applied by their own task, as a callback would be
        let (fulfilled_tx, mut fulfilled_rx) = mpsc::unbounded_channel::<Result<RoundId>>();
        if let Some(mut replies) = replies {
            let registry = Arc::clone(&registry);
            let chain = chain.clone();
            let confirmations = match &config.engine.entropy {
                EntropyModeConfig::Vrf(vrf) => u64::from(vrf.request_confirmations),
                EntropyModeConfig::BlockHash(_) => 0,
            };
            tokio::spawn(async move {
                while let Some(fulfillment) = replies.recv().await {
                    chain.mine(confirmations);
                    let outcome = lock(&registry)
                        .fulfill_random_words(fulfillment.request_id, &fulfillment.words);
                    if fulfilled_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }

        let mut outcomes = Vec::with_capacity(config.num_rounds);
        for _ in 0..config.num_rounds {
            let round_start = Instant::now();
            let next = lock(&registry).current_round() + 1;
            let secret = derive_secret(config.seed, next);

            let mut outcome = RoundOutcome {
                round: next,
                request_id: None,
                anchor_block: chain.block_number(),
                result: None,
                sample: None,
                error: None,
                expired: false,
                runtime_ms: 0.0,
            };

            let opened = lock(&registry).open_next_round(Commitment::from_secret(&secret));
            if let Err(e) = opened {
                tracing::warn!(round = next, error = %e, "open failed");
                outcome.error = Some(e.to_string());
                outcomes.push(outcome);
                continue;
            }
            if let Some(pending) = lock(&registry).pending_round(next) {
                outcome.request_id = pending.request_id.map(|id| id.0);
                outcome.anchor_block = pending.anchor_block;
            }

            if mode == EntropyMode::Vrf {
                if let Err(e) = self.await_fulfillment(&mut fulfilled_rx).await {
                    tracing::warn!(round = next, error = %e, "oracle did not fulfill");
                    outcome.error = Some(e.to_string());
                    outcome.runtime_ms = round_start.elapsed().as_secs_f64() * 1000.0;
                    outcomes.push(outcome);
                    continue;
                }
            }

            chain.mine(config.reveal_after_blocks);

            let finalized = {
                let mut registry = lock(&registry);
                if registry.is_finalized(next) {
                    registry.final_result(next)
                } else {
                    registry.finalize(next, &secret)
                }
            };
            match finalized {
                Ok(result) => {
                    outcome.result = Some(word_hex(result));
                    if let Some(request) = &config.sample {
                        match request.sample(result) {
                            Ok(values) => outcome.sample = Some(values),
                            Err(e) => outcome.error = Some(e.to_string()),
                        }
                    }
                }
                Err(e) => {
                    outcome.expired = matches!(e, FairdrawError::RevealWindowExpired { .. });
                    outcome.error = Some(e.to_string());
                }
            }
            outcome.runtime_ms = round_start.elapsed().as_secs_f64() * 1000.0;
            outcomes.push(outcome);
        }

        let events_emitted = lock(&registry).drain_events().len();
        let summary = self.calculate_summary(
            config,
            &outcomes,
            events_emitted,
            started.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(SimResult {
            scenario_name: config.name.clone(),
            rounds: outcomes,
            summary,
        })
    }

    async fn await_fulfillment(
        &self,
        fulfilled: &mut mpsc::UnboundedReceiver<Result<RoundId>>,
    ) -> Result<RoundId> {
        match tokio::time::timeout(self.oracle_timeout, fulfilled.recv()).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => Err(FairdrawError::Entropy("oracle task has stopped".to_string())),
            Err(_) => Err(FairdrawError::Entropy(format!(
                "no oracle answer within {:?}",
                self.oracle_timeout
            ))),
        }
    }

    fn calculate_summary(
        &self,
        config: &ScenarioConfig,
        outcomes: &[RoundOutcome],
        events_emitted: usize,
        total_runtime_ms: f64,
    ) -> SimSummary {
        let finalized = outcomes.iter().filter(|o| o.result.is_some()).count();
        let expired = outcomes.iter().filter(|o| o.expired).count();
        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

        let mut failure_reasons = Vec::new();
        if let Some(expected) = &config.expected_outcomes {
            if let Some(min) = expected.min_finalized {
                if finalized < min {
                    failure_reasons.push(format!(
                        "finalized {} rounds, expected at least {}",
                        finalized, min
                    ));
                }
            }
            if let Some(max) = expected.max_expired {
                if expired > max {
                    failure_reasons.push(format!(
                        "{} rounds expired, expected at most {}",
                        expired, max
                    ));
                }
            }
        }

        SimSummary {
            total_rounds: outcomes.len(),
            finalized,
            expired,
            failed,
            events_emitted,
            total_runtime_ms,
            passed: failure_reasons.is_empty(),
            failure_reasons,
        }
    }
}

impl Default for SimRunner {
    fn default() -> Self {
        Self::new()
    }
}
