mod vrf;
mod chain;
mod mock;

pub use vrf::{VrfCoordinator, VrfRequest};
pub use chain::{ChainView, BLOCK_HASH_RETENTION};
pub use mock::{MockChain, MockVrfCoordinator};
