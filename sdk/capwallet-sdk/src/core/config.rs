use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::core::constants::DEFAULT_PROGRAM_ID;
use crate::error::{Result, SdkError};

/// Deployment settings threaded through the assembler and the wallet façade.
///
/// Several configs can coexist in one process, one per cluster or deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Wallet program address
    #[serde(with = "pubkey_string")]
    pub program_id: Pubkey,

    /// Commitment used by RPC adapters ("processed", "confirmed", "finalized")
    pub commitment: Option<String>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            commitment: None,
        }
    }
}

impl SdkConfig {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            ..Self::default()
        }
    }

    pub fn with_commitment(mut self, commitment: impl Into<String>) -> Self {
        self.commitment = Some(commitment.into());
        self
    }

    /// Loads a config from TOML; missing keys fall back to the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn commitment_config(&self) -> Result<CommitmentConfig> {
        match &self.commitment {
            Some(level) => CommitmentConfig::from_str(level)
                .map_err(|e| SdkError::Config(format!("commitment {level:?}: {e}"))),
            None => Ok(CommitmentConfig::confirmed()),
        }
    }
}

mod pubkey_string {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Pubkey::from_str(&raw).map_err(serde::de::Error::custom)
    }
}
