mod scenario;
mod oracle;
mod runner;

pub use scenario::{ExpectedOutcomes, ScenarioConfig};
pub use oracle::{spawn_oracle, ChannelVrfCoordinator, Fulfillment};
pub use runner::{derive_secret, RoundOutcome, SimResult, SimRunner, SimSummary};
