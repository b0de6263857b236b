//! Authority module for the state crate.
//!
//! Stored layouts for the four supported authority kinds, plus the creation
//! layouts sent when a role is added. Ed25519 and Secp256k1 each come in a
//! standard and a session-based variant.

pub mod ed25519;
pub mod secp256k1;

use ed25519::{ED25519Authority, Ed25519SessionAuthority};
use secp256k1::{Secp256k1Authority, Secp256k1SessionAuthority};

use crate::error::{Result, StateError};
use crate::transmute::Transmutable;

/// Trait for stored authority data structures.
pub trait Authority: Transmutable {
    /// The type of authority this implementation represents
    const TYPE: AuthorityType;
    /// Whether this authority supports session-based authentication
    const SESSION_BASED: bool;
}

/// Read-only view shared by every stored authority.
pub trait AuthorityInfo {
    /// Returns the type of this authority
    fn authority_type(&self) -> AuthorityType;

    /// Returns whether this authority supports session-based authentication
    fn session_based(&self) -> bool;

    /// Bytes identifying the holder of the role
    fn identity(&self) -> &[u8];

    /// Bytes a signature must match for routine operations.
    ///
    /// Differs from [`AuthorityInfo::identity`] exactly for session variants.
    fn signer(&self) -> &[u8];

    /// Returns the signature odometer for this authority if it exists
    fn signature_odometer(&self) -> Option<u32> {
        None
    }
}

/// Session fields carried by the session-based variants.
pub trait SessionInfo: AuthorityInfo {
    fn session_key(&self) -> [u8; 32];

    /// Longest session the root key may open, in slots
    fn max_session_length(&self) -> u64;

    fn current_session_expiration(&self) -> u64;

    fn is_session_active(&self, current_slot: u64) -> bool {
        current_slot < self.current_session_expiration()
    }
}

/// Represents different types of authorities supported by the system.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorityType {
    /// Standard Ed25519 authority
    Ed25519 = 1,
    /// Session-based Ed25519 authority
    Ed25519Session = 2,
    /// Standard Secp256k1 authority
    Secp256k1 = 3,
    /// Session-based Secp256k1 authority
    Secp256k1Session = 4,
}

impl TryFrom<u16> for AuthorityType {
    type Error = StateError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            1 => Ok(AuthorityType::Ed25519),
            2 => Ok(AuthorityType::Ed25519Session),
            3 => Ok(AuthorityType::Secp256k1),
            4 => Ok(AuthorityType::Secp256k1Session),
            _ => Err(StateError::InvalidAuthorityType(value)),
        }
    }
}

impl From<AuthorityType> for u16 {
    fn from(authority_type: AuthorityType) -> Self {
        authority_type as u16
    }
}

impl AuthorityType {
    pub const fn session_based(&self) -> bool {
        matches!(
            self,
            AuthorityType::Ed25519Session | AuthorityType::Secp256k1Session
        )
    }

    /// Ed25519 keys are verified by the runtime; Secp256k1 keys need a signed payload.
    pub const fn is_secp256k1(&self) -> bool {
        matches!(
            self,
            AuthorityType::Secp256k1 | AuthorityType::Secp256k1Session
        )
    }
}

/// Returns the stored length in bytes for a given authority type.
pub const fn authority_type_to_length(authority_type: &AuthorityType) -> usize {
    match authority_type {
        AuthorityType::Ed25519 => ED25519Authority::LEN,
        AuthorityType::Ed25519Session => Ed25519SessionAuthority::LEN,
        AuthorityType::Secp256k1 => Secp256k1Authority::LEN,
        AuthorityType::Secp256k1Session => Secp256k1SessionAuthority::LEN,
    }
}
