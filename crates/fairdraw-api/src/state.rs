use fairdraw_entropy::{MockChain, MockVrfCoordinator, VrfCoordinator};
use fairdraw_rounds::RoundRegistry;
use fairdraw_types::{EngineConfig, EntropyMode, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<RoundRegistry>>,
    /// Local chain the dev server ticks forward
    pub chain: MockChain,
}

impl AppState {
    pub fn new(registry: RoundRegistry, chain: MockChain) -> Self {
        AppState {
            registry: Arc::new(Mutex::new(registry)),
            chain,
        }
    }

    /// Registry over a local chain. Oracle mode gets a mock coordinator whose
    /// answers arrive through the callback endpoint.
    pub fn from_config(config: EngineConfig, chain: MockChain) -> Result<Self> {
        let coordinator: Option<Box<dyn VrfCoordinator>> = match config.mode() {
            EntropyMode::Vrf => Some(Box::new(MockVrfCoordinator::new())),
            EntropyMode::BlockHash => None,
        };
        let registry = RoundRegistry::from_config(config, Box::new(chain.clone()), coordinator)?;
        Ok(Self::new(registry, chain))
    }

    /// Lock the registry. Registry operations never leave partial state, so a
    /// poisoned lock is still usable.
    pub fn registry(&self) -> MutexGuard<'_, RoundRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
