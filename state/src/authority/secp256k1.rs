//! Secp256k1 authority layouts and key helpers.
//!
//! Secp256k1 signatures cannot be checked by the runtime, so every
//! instruction carries a signed payload that binds the signature to the
//! instruction's accounts and to a recent slot. The odometer stored here is
//! the last counter the wallet program accepted.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Authority, AuthorityInfo, AuthorityType, SessionInfo};
use crate::error::{Result, StateError};
use crate::transmute::Transmutable;
use crate::Pubkey;

/// Uncompressed key length without the leading 0x04 tag.
pub const UNCOMPRESSED_KEY_LEN: usize = 64;

pub const COMPRESSED_KEY_LEN: usize = 33;

/// Standard Secp256k1 authority as stored in a role.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1Authority {
    /// The compressed Secp256k1 public key
    pub public_key: [u8; 33],
    _padding: [u8; 3],
    /// Last accepted signature counter
    pub signature_odometer: u32,
}

impl Secp256k1Authority {
    pub fn new(public_key: [u8; 33]) -> Self {
        Self {
            public_key,
            _padding: [0; 3],
            signature_odometer: 0,
        }
    }

    /// Counter the next signed payload must carry.
    pub fn next_odometer(&self) -> u32 {
        self.signature_odometer.wrapping_add(1)
    }
}

impl Transmutable for Secp256k1Authority {
    const LEN: usize = 40;
}

impl Authority for Secp256k1Authority {
    const TYPE: AuthorityType = AuthorityType::Secp256k1;
    const SESSION_BASED: bool = false;
}

impl AuthorityInfo for Secp256k1Authority {
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

    fn signature_odometer(&self) -> Option<u32> {
        Some(self.signature_odometer)
    }
}

/// Creation data for a session-based Secp256k1 authority.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateSecp256k1SessionAuthority {
    /// Uncompressed key without the 0x04 tag
    pub public_key: [u8; 64],
    pub session_key: [u8; 32],
    pub max_session_length: u64,
}

impl CreateSecp256k1SessionAuthority {
    pub fn new(public_key: [u8; 64], session_key: [u8; 32], max_session_length: u64) -> Self {
        Self {
            public_key,
            session_key,
            max_session_length,
        }
    }
}

impl Transmutable for CreateSecp256k1SessionAuthority {
    const LEN: usize = 104;
}

/// Session-based Secp256k1 authority as stored in a role.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1SessionAuthority {
    /// The compressed root key; signs session creation only
    pub public_key: [u8; 33],
    _padding: [u8; 3],
    pub signature_odometer: u32,
    /// Ed25519 session key; signs everything else
    pub session_key: [u8; 32],
    pub max_session_age: u64,
    pub current_session_expiration: u64,
}

impl Secp256k1SessionAuthority {
    pub fn new(public_key: [u8; 33], session_key: [u8; 32], max_session_age: u64) -> Self {
        Self {
            public_key,
            _padding: [0; 3],
            signature_odometer: 0,
            session_key,
            max_session_age,
            current_session_expiration: 0,
        }
    }

    pub fn next_odometer(&self) -> u32 {
        self.signature_odometer.wrapping_add(1)
    }
}

impl Transmutable for Secp256k1SessionAuthority {
    const LEN: usize = 88;
}

impl Authority for Secp256k1SessionAuthority {
    const TYPE: AuthorityType = AuthorityType::Secp256k1Session;
    const SESSION_BASED: bool = true;
}

impl AuthorityInfo for Secp256k1SessionAuthority {
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

    fn signature_odometer(&self) -> Option<u32> {
        Some(self.signature_odometer)
    }
}

impl SessionInfo for Secp256k1SessionAuthority {
    fn session_key(&self) -> [u8; 32] {
        self.session_key
    }

    fn max_session_length(&self) -> u64 {
        self.max_session_age
    }

    fn current_session_expiration(&self) -> u64 {
        self.current_session_expiration
    }
}

/// Compresses a 64-byte uncompressed public key to a 33-byte compressed format.
///
/// The first byte is 0x02 if Y is even and 0x03 if Y is odd; the remaining
/// 32 bytes are the X coordinate.
pub fn compress(key: &[u8; 64]) -> [u8; 33] {
    let mut compressed = [0u8; 33];
    compressed[0] = if key[63] & 1 == 0 { 0x02 } else { 0x03 };
    compressed[1..33].copy_from_slice(&key[..32]);
    compressed
}

/// Expands a compressed key back to its 64-byte uncompressed form.
pub fn decompress(key: &[u8; 33]) -> Result<[u8; 64]> {
    let public_key = libsecp256k1::PublicKey::parse_compressed(key)
        .map_err(|_| StateError::InvalidSecp256k1Key)?;
    let full = public_key.serialize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&full[1..]);
    Ok(out)
}

/// Normalizes a 33, 64 or 65 byte key to its compressed form.
///
/// Every form is parsed, so points off the curve are rejected here.
pub fn compressed_key_from_slice(bytes: &[u8]) -> Result<[u8; 33]> {
    match bytes.len() {
        COMPRESSED_KEY_LEN => {
            let key: [u8; 33] = bytes
                .try_into()
                .map_err(|_| StateError::InvalidSecp256k1Key)?;
            decompress(&key)?;
            Ok(key)
        },
        UNCOMPRESSED_KEY_LEN => {
            let mut tagged = [0u8; 65];
            tagged[0] = 0x04;
            tagged[1..].copy_from_slice(bytes);
            compress_checked(&tagged)
        },
        65 if bytes[0] == 0x04 => {
            let tagged: [u8; 65] = bytes
                .try_into()
                .map_err(|_| StateError::InvalidSecp256k1Key)?;
            compress_checked(&tagged)
        },
        _ => Err(StateError::InvalidSecp256k1Key),
    }
}

fn compress_checked(tagged: &[u8; 65]) -> Result<[u8; 33]> {
    let public_key =
        libsecp256k1::PublicKey::parse(tagged).map_err(|_| StateError::InvalidSecp256k1Key)?;
    Ok(public_key.serialize_compressed())
}

/// One account entry of a signed secp256k1 message.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountsPayload {
    /// The account's public key
    pub pubkey: Pubkey,
    /// Whether the account is writable
    pub is_writable: bool,
    /// Whether the account is a signer
    pub is_signer: bool,
    _padding: [u8; 6],
}

impl AccountsPayload {
    pub fn new(pubkey: Pubkey, is_writable: bool, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_writable,
            is_signer,
            _padding: [0u8; 6],
        }
    }
}

impl Transmutable for AccountsPayload {
    const LEN: usize = 40;
}
