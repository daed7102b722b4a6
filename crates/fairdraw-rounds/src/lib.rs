mod commitment;
mod pending;
mod slot;
mod registry;
mod finalize;

pub use commitment::Commitment;
pub use pending::PendingRound;
pub use registry::{RoundRegistry, MAX_RETAINED_EVENTS};
pub use finalize::combine;

#[cfg(test)]
mod tests;
