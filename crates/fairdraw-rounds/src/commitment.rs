use fairdraw_types::{FairdrawError, Result, H256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Commitment to an operator secret: SHA256(secret)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Commitment(pub H256);

impl Commitment {
    /// Commit to a secret
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret);
        Commitment(H256::from_slice(&hasher.finalize()))
    }

    /// Parse from hex string (optional `0x` prefix)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix("0x").unwrap_or(hex);
        if digits.len() != 64 {
            return Err(FairdrawError::InvalidCommitment(
                "commitment must be 64 hex characters".to_string(),
            ));
        }
        let bytes = hex::decode(digits).map_err(|_| {
            FairdrawError::InvalidCommitment("invalid hex encoding".to_string())
        })?;
        Ok(Commitment(H256::from_slice(&bytes)))
    }

    /// Reveal check: does `secret` hash to this commitment?
    pub fn verify(&self, secret: &[u8]) -> bool {
        Self::from_secret(secret) == *self
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
