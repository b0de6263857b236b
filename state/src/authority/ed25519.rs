//! Ed25519 authority layouts.
//!
//! The runtime verifies Ed25519 transaction signatures itself, so these
//! authorities only need to carry the keys.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Authority, AuthorityInfo, AuthorityType, SessionInfo};
use crate::transmute::Transmutable;
use crate::Pubkey;

/// Standard Ed25519 authority implementation.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ED25519Authority {
    /// The Ed25519 public key used for signature verification
    pub public_key: Pubkey,
}

impl Transmutable for ED25519Authority {
    const LEN: usize = 32;
}

impl Authority for ED25519Authority {
    const TYPE: AuthorityType = AuthorityType::Ed25519;
    const SESSION_BASED: bool = false;
}

impl AuthorityInfo for ED25519Authority {
    fn authority_type(&self) -> AuthorityType {
        Self::TYPE
    }

    fn session_based(&self) -> bool {
        Self::SESSION_BASED
    }

    fn identity(&self) -> &[u8] {
        &self.public_key
    }

    fn signer(&self) -> &[u8] {
        &self.public_key
    }
}

/// Creation data for a session-based Ed25519 authority.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateEd25519SessionAuthority {
    pub public_key: Pubkey,
    /// Initial session key; usually zeroed until the first session is opened
    pub session_key: [u8; 32],
    pub max_session_length: u64,
}

impl CreateEd25519SessionAuthority {
    pub fn new(public_key: Pubkey, session_key: [u8; 32], max_session_length: u64) -> Self {
        Self {
            public_key,
            session_key,
            max_session_length,
        }
    }
}

impl Transmutable for CreateEd25519SessionAuthority {
    const LEN: usize = 72;
}

/// Session-based Ed25519 authority as stored in a role.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519SessionAuthority {
    /// The root Ed25519 key; signs session creation only
    pub public_key: Pubkey,
    /// The current session key; signs everything else
    pub session_key: [u8; 32],
    pub max_session_length: u64,
    /// Slot at which the current session expires
    pub current_session_expiration: u64,
}

impl Transmutable for Ed25519SessionAuthority {
    const LEN: usize = 80;
}

impl Authority for Ed25519SessionAuthority {
    const TYPE: AuthorityType = AuthorityType::Ed25519Session;
    const SESSION_BASED: bool = true;
}

impl AuthorityInfo for Ed25519SessionAuthority {
    fn authority_type(&self) -> AuthorityType {
        Self::TYPE
    }

    fn session_based(&self) -> bool {
        Self::SESSION_BASED
    }

    fn identity(&self) -> &[u8] {
        &self.public_key
    }

    fn signer(&self) -> &[u8] {
        &self.session_key
    }
}

impl SessionInfo for Ed25519SessionAuthority {
    fn session_key(&self) -> [u8; 32] {
        self.session_key
    }

    fn max_session_length(&self) -> u64 {
        self.max_session_length
    }

    fn current_session_expiration(&self) -> u64 {
        self.current_session_expiration
    }
}
