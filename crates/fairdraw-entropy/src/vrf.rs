use fairdraw_types::{RequestId, Result, VrfConfig, H256};
use serde::{Deserialize, Serialize};

/// Randomness request as submitted to the VRF coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrfRequest {
    pub key_hash: H256,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    pub native_payment: bool,
}

impl From<&VrfConfig> for VrfRequest {
    fn from(config: &VrfConfig) -> Self {
        VrfRequest {
            key_hash: config.key_hash,
            request_confirmations: config.request_confirmations,
            callback_gas_limit: config.callback_gas_limit,
            num_words: config.num_words,
            native_payment: config.native_payment,
        }
    }
}

/// Asynchronous VRF oracle.
///
/// `request_random_words` returns as soon as the request is accepted. The
/// random words arrive later through the registry's fulfillment callback,
/// keyed by the returned [`RequestId`].
pub trait VrfCoordinator: Send {
    /// Submit a request and return the identifier the callback will carry
    fn request_random_words(&mut self, request: &VrfRequest) -> Result<RequestId>;
}

impl<T: VrfCoordinator + ?Sized> VrfCoordinator for Box<T> {
    fn request_random_words(&mut self, request: &VrfRequest) -> Result<RequestId> {
        (**self).request_random_words(request)
    }
}
