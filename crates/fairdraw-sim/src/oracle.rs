use fairdraw_entropy::{VrfCoordinator, VrfRequest};
use fairdraw_types::{FairdrawError, RequestId, Result, H256, U256};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::sync::mpsc;

/// Oracle answer for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub request_id: RequestId,
    pub words: Vec<U256>,
}

/// Coordinator that forwards requests to an oracle task over a channel
#[derive(Debug)]
pub struct ChannelVrfCoordinator {
    next_id: u64,
    requests: mpsc::UnboundedSender<(RequestId, VrfRequest)>,
}

impl VrfCoordinator for ChannelVrfCoordinator {
    fn request_random_words(&mut self, request: &VrfRequest) -> Result<RequestId> {
        let id = RequestId(self.next_id);
        self.requests
            .send((id, request.clone()))
            .map_err(|_| FairdrawError::Entropy("oracle task has stopped".to_string()))?;
        self.next_id += 1;
        Ok(id)
    }
}

/// Start an oracle task on the current runtime. Each request is answered
/// after `delay` with `num_words` words derived from `seed` and the id.
pub fn spawn_oracle(
    delay: Duration,
    seed: H256,
) -> (ChannelVrfCoordinator, mpsc::UnboundedReceiver<Fulfillment>) {
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<(RequestId, VrfRequest)>();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some((request_id, request)) = request_rx.recv().await {
            tokio::time::sleep(delay).await;
            let words = (0..request.num_words)
                .map(|i| oracle_word(&seed, request_id, i))
                .collect();
            tracing::debug!(%request_id, num_words = request.num_words, "oracle answered");
            if reply_tx.send(Fulfillment { request_id, words }).is_err() {
                break;
            }
        }
    });

    let coordinator = ChannelVrfCoordinator {
        next_id: 1,
        requests: request_tx,
    };
    (coordinator, reply_rx)
}

fn oracle_word(seed: &H256, request_id: RequestId, index: u32) -> U256 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(request_id.0.to_be_bytes());
    hasher.update(index.to_be_bytes());
    U256::from_big_endian(&hasher.finalize())
}
