//! Authority payloads: the proof an instruction carries for its acting role.
//!
//! Ed25519 keys sign the transaction itself, so their payload is only the
//! key. Secp256k1 keys sign a message that commits to the instruction's
//! accounts and a recent slot:
//!
//! ```text
//! message = domain_payload ++ accounts (40 B each) ++ slot LE8 [++ odometer LE4]
//! payload = slot LE8 [++ odometer LE4] ++ signature ++ prefix
//! ```

use capwallet_state::authority::secp256k1::AccountsPayload;
use capwallet_state::{AuthorityType, IntoBytes, Transmutable};
use sha2::{Digest, Sha256};
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::core::connection::ChainAccess;
use crate::core::signer::Secp256k1Signer;
use crate::error::{Result, SdkError};
use crate::types::{Authority, SessionAuthority, TokenAuthority};

/// Key that proves one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningKey {
    /// Verified by the runtime as a transaction signer
    Ed25519(Pubkey),
    Secp256k1 {
        authority_type: AuthorityType,
        /// Counter committed to by the signature, if replay counting is on
        odometer: Option<u32>,
    },
}

impl SigningKey {
    /// Key for routine operations: the session key of session authorities.
    pub fn routine(authority: &Authority, replay_counting: bool) -> Self {
        match authority {
            Authority::Token(TokenAuthority::Ed25519(a)) => {
                SigningKey::Ed25519(Pubkey::new_from_array(a.public_key))
            },
            Authority::Token(TokenAuthority::Secp256k1(a)) => SigningKey::Secp256k1 {
                authority_type: AuthorityType::Secp256k1,
                odometer: replay_counting.then(|| a.next_odometer()),
            },
            Authority::Session(SessionAuthority::Ed25519(a)) => {
                SigningKey::Ed25519(Pubkey::new_from_array(a.session_key))
            },
            Authority::Session(SessionAuthority::Secp256k1(a)) => {
                SigningKey::Ed25519(Pubkey::new_from_array(a.session_key))
            },
        }
    }

    /// Root key of a session authority; signs session creation.
    pub fn session_root(authority: &SessionAuthority, replay_counting: bool) -> Self {
        match authority {
            SessionAuthority::Ed25519(a) => SigningKey::Ed25519(Pubkey::new_from_array(a.public_key)),
            SessionAuthority::Secp256k1(a) => SigningKey::Secp256k1 {
                authority_type: AuthorityType::Secp256k1Session,
                odometer: replay_counting.then(|| a.next_odometer()),
            },
        }
    }

    /// Readonly signer account to append to the instruction's fixed accounts.
    pub fn signer_account(&self) -> Option<AccountMeta> {
        match self {
            SigningKey::Ed25519(key) => Some(AccountMeta::new_readonly(*key, true)),
            SigningKey::Secp256k1 { .. } => None,
        }
    }
}

/// Where the freshness slot of a secp256k1 payload comes from.
#[derive(Clone, Copy)]
pub enum SlotSource<'a> {
    Fixed(u64),
    Chain(&'a dyn ChainAccess),
}

/// Bytes a secp256k1 authority signs for one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationMessage {
    bytes: Vec<u8>,
}

impl AuthorizationMessage {
    pub fn new(
        domain_payload: &[u8],
        accounts: &[AccountMeta],
        slot: u64,
        odometer: Option<u32>,
    ) -> Result<Self> {
        let mut bytes =
            Vec::with_capacity(domain_payload.len() + accounts.len() * AccountsPayload::LEN + 12);
        bytes.extend_from_slice(domain_payload);
        for meta in accounts {
            let entry = AccountsPayload::new(meta.pubkey.to_bytes(), meta.is_writable, meta.is_signer);
            bytes.extend_from_slice(&entry.into_bytes()?);
        }
        bytes.extend_from_slice(&slot.to_le_bytes());
        if let Some(odometer) = odometer {
            bytes.extend_from_slice(&odometer.to_le_bytes());
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// SHA-256 of the message; this is what the signing callback receives.
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(&self.bytes).into()
    }
}

/// Builds authority payloads for one instruction at a time.
pub struct AuthorityPayloadBuilder<'a> {
    signer: Option<&'a dyn Secp256k1Signer>,
    slot_source: Option<SlotSource<'a>>,
}

impl<'a> AuthorityPayloadBuilder<'a> {
    pub fn new(
        signer: Option<&'a dyn Secp256k1Signer>,
        slot_source: Option<SlotSource<'a>>,
    ) -> Self {
        Self {
            signer,
            slot_source,
        }
    }

    /// Fails fast when `key` needs a signing callback this builder lacks.
    pub fn ensure_ready(&self, key: &SigningKey) -> Result<()> {
        if let SigningKey::Secp256k1 { authority_type, .. } = key {
            if self.signer.is_none() {
                return Err(SdkError::MissingSigner(*authority_type));
            }
            if self.slot_source.is_none() {
                return Err(SdkError::MissingSlotSource);
            }
        }
        Ok(())
    }

    /// Payload proving `key` authorized `domain_payload` over `accounts`.
    pub async fn build(
        &self,
        key: &SigningKey,
        domain_payload: &[u8],
        accounts: &[AccountMeta],
    ) -> Result<Vec<u8>> {
        self.ensure_ready(key)?;
        match key {
            SigningKey::Ed25519(pubkey) => Ok(pubkey.to_bytes().to_vec()),
            SigningKey::Secp256k1 {
                authority_type,
                odometer,
            } => {
                self.secp256k1(*authority_type, domain_payload, accounts, *odometer)
                    .await
            },
        }
    }

    async fn secp256k1(
        &self,
        authority_type: AuthorityType,
        domain_payload: &[u8],
        accounts: &[AccountMeta],
        odometer: Option<u32>,
    ) -> Result<Vec<u8>> {
        let (signer, slot_source) = match (self.signer, self.slot_source) {
            (Some(signer), Some(slot_source)) => (signer, slot_source),
            (None, _) => return Err(SdkError::MissingSigner(authority_type)),
            (_, None) => return Err(SdkError::MissingSlotSource),
        };

        let slot = match slot_source {
            SlotSource::Fixed(slot) => slot,
            SlotSource::Chain(chain) => chain
                .get_slot()
                .await
                .map_err(|e| SdkError::Connection(e.to_string()))?,
        };

        let message = AuthorizationMessage::new(domain_payload, accounts, slot, odometer)?;
        debug!(
            slot,
            odometer = ?odometer,
            accounts = accounts.len(),
            "requesting secp256k1 signature"
        );
        let response = signer
            .sign(&message.hash())
            .await
            .map_err(SdkError::Signing)?;

        if !matches!(response.signature.len(), 64 | 65) {
            return Err(SdkError::Signing(format!(
                "expected a 64 or 65 byte signature, got {}",
                response.signature.len()
            )));
        }

        let mut payload = Vec::with_capacity(12 + response.signature.len());
        payload.extend_from_slice(&slot.to_le_bytes());
        if let Some(odometer) = odometer {
            payload.extend_from_slice(&odometer.to_le_bytes());
        }
        payload.extend_from_slice(&response.signature);
        if let Some(prefix) = response.prefix {
            payload.extend_from_slice(&prefix);
        }
        Ok(payload)
    }
}
