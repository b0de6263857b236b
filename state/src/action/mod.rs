//! Capability grants ("actions") attached to a role.
//!
//! A grant set is a flat buffer of `[ActionHeader][payload]` records. Each
//! header stores the absolute offset where its payload ends, so a reader
//! walks the buffer with a single cursor and a verifier can check total
//! consumption with one comparison against the buffer length.

pub mod actions;
pub mod limits;
pub mod program_scope;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{Result, StateError};
use crate::transmute::{IntoBytes, Transmutable};
use crate::Pubkey;

pub use actions::Actions;
pub use limits::{
    ProgramLimit, SolLimit, SolRecurringLimit, SubAccountLimit, TokenLimit, TokenRecurringLimit,
};
pub use program_scope::{NumericType, ProgramScope, ProgramScopeType};

/// Closed set of grant kinds, keyed by their wire tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    SolLimit = 1,
    SolRecurringLimit = 2,
    Program = 3,
    ProgramScope = 4,
    TokenLimit = 5,
    TokenRecurringLimit = 6,
    All = 7,
    ManageAuthority = 8,
    SubAccount = 9,
    ProgramAll = 13,
    ProgramCurated = 14,
}

impl TryFrom<u8> for Permission {
    type Error = StateError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Permission::SolLimit),
            2 => Ok(Permission::SolRecurringLimit),
            3 => Ok(Permission::Program),
            4 => Ok(Permission::ProgramScope),
            5 => Ok(Permission::TokenLimit),
            6 => Ok(Permission::TokenRecurringLimit),
            7 => Ok(Permission::All),
            8 => Ok(Permission::ManageAuthority),
            9 => Ok(Permission::SubAccount),
            13 => Ok(Permission::ProgramAll),
            14 => Ok(Permission::ProgramCurated),
            other => Err(StateError::UnknownPermission(other as u16)),
        }
    }
}

impl From<Permission> for u8 {
    fn from(permission: Permission) -> Self {
        permission as u8
    }
}

impl Permission {
    pub const fn name(&self) -> &'static str {
        match self {
            Permission::SolLimit => "SolLimit",
            Permission::SolRecurringLimit => "SolRecurringLimit",
            Permission::Program => "Program",
            Permission::ProgramScope => "ProgramScope",
            Permission::TokenLimit => "TokenLimit",
            Permission::TokenRecurringLimit => "TokenRecurringLimit",
            Permission::All => "All",
            Permission::ManageAuthority => "ManageAuthority",
            Permission::SubAccount => "SubAccount",
            Permission::ProgramAll => "ProgramAll",
            Permission::ProgramCurated => "ProgramCurated",
        }
    }

    /// Encoded payload size for this kind.
    pub const fn payload_len(&self) -> usize {
        match self {
            Permission::All
            | Permission::ManageAuthority
            | Permission::ProgramAll
            | Permission::ProgramCurated => 0,
            Permission::Program => ProgramLimit::LEN,
            Permission::SubAccount => SubAccountLimit::LEN,
            Permission::SolLimit => SolLimit::LEN,
            Permission::SolRecurringLimit => SolRecurringLimit::LEN,
            Permission::TokenLimit => TokenLimit::LEN,
            Permission::TokenRecurringLimit => TokenRecurringLimit::LEN,
            Permission::ProgramScope => ProgramScope::LEN,
        }
    }
}

/// Header preceding every grant payload.
///
/// `boundary` is the absolute offset, within the whole grant buffer, of the
/// end of this grant's payload.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionHeader {
    permission: u8,
    reserved: u8,
    length: u16,
    boundary: u32,
}

impl ActionHeader {
    pub fn new(permission: Permission, length: u16, boundary: u32) -> Self {
        Self {
            permission: permission.into(),
            reserved: 0,
            length,
            boundary,
        }
    }

    pub fn permission(&self) -> Result<Permission> {
        Permission::try_from(self.permission)
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn boundary(&self) -> u32 {
        self.boundary
    }
}

impl Transmutable for ActionHeader {
    const LEN: usize = 8;
}

/// Fixed-shape payload belonging to exactly one grant kind.
pub trait ActionPayload: Transmutable {
    const PERMISSION: Permission;

    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(StateError::InvalidPayloadLength {
                kind: Self::PERMISSION.name(),
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self::try_from_slice(bytes)?)
    }
}

/// One capability grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Root: satisfies every query
    All,
    ManageAuthority,
    /// May invoke one named program
    Program(ProgramLimit),
    /// May invoke any program
    ProgramAll,
    /// May invoke programs on the curated list kept by the wallet program
    ProgramCurated,
    ProgramScope(ProgramScope),
    SubAccount(SubAccountLimit),
    SolLimit(SolLimit),
    SolRecurringLimit(SolRecurringLimit),
    TokenLimit(TokenLimit),
    TokenRecurringLimit(TokenRecurringLimit),
}

impl Action {
    pub fn permission(&self) -> Permission {
        match self {
            Action::All => Permission::All,
            Action::ManageAuthority => Permission::ManageAuthority,
            Action::Program(_) => Permission::Program,
            Action::ProgramAll => Permission::ProgramAll,
            Action::ProgramCurated => Permission::ProgramCurated,
            Action::ProgramScope(_) => Permission::ProgramScope,
            Action::SubAccount(_) => Permission::SubAccount,
            Action::SolLimit(_) => Permission::SolLimit,
            Action::SolRecurringLimit(_) => Permission::SolRecurringLimit,
            Action::TokenLimit(_) => Permission::TokenLimit,
            Action::TokenRecurringLimit(_) => Permission::TokenRecurringLimit,
        }
    }

    pub fn payload_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Action::All | Action::ManageAuthority | Action::ProgramAll | Action::ProgramCurated => {
                Ok(Vec::new())
            },
            Action::Program(p) => p.into_bytes(),
            Action::ProgramScope(p) => p.into_bytes(),
            Action::SubAccount(p) => p.into_bytes(),
            Action::SolLimit(p) => p.into_bytes(),
            Action::SolRecurringLimit(p) => p.into_bytes(),
            Action::TokenLimit(p) => p.into_bytes(),
            Action::TokenRecurringLimit(p) => p.into_bytes(),
        }
    }

    /// Encodes header and payload for a grant starting at `offset` in its buffer.
    pub fn encode(&self, offset: usize) -> Result<Vec<u8>> {
        let payload = self.payload_bytes()?;
        let boundary = offset + ActionHeader::LEN + payload.len();
        let header = ActionHeader::new(self.permission(), payload.len() as u16, boundary as u32);

        let mut bytes = header.into_bytes()?;
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decodes a payload for an already-identified kind.
    pub fn decode_payload(permission: Permission, payload: &[u8]) -> Result<Self> {
        match permission {
            Permission::All => expect_empty(permission, payload).map(|_| Action::All),
            Permission::ManageAuthority => {
                expect_empty(permission, payload).map(|_| Action::ManageAuthority)
            },
            Permission::ProgramAll => expect_empty(permission, payload).map(|_| Action::ProgramAll),
            Permission::ProgramCurated => {
                expect_empty(permission, payload).map(|_| Action::ProgramCurated)
            },
            Permission::Program => ProgramLimit::decode(payload).map(Action::Program),
            Permission::ProgramScope => {
                let scope = ProgramScope::decode(payload)?;
                scope.validate()?;
                Ok(Action::ProgramScope(scope))
            },
            Permission::SubAccount => SubAccountLimit::decode(payload).map(Action::SubAccount),
            Permission::SolLimit => SolLimit::decode(payload).map(Action::SolLimit),
            Permission::SolRecurringLimit => {
                SolRecurringLimit::decode(payload).map(Action::SolRecurringLimit)
            },
            Permission::TokenLimit => TokenLimit::decode(payload).map(Action::TokenLimit),
            Permission::TokenRecurringLimit => {
                TokenRecurringLimit::decode(payload).map(Action::TokenRecurringLimit)
            },
        }
    }

    pub fn program(program_id: Pubkey) -> Self {
        Action::Program(ProgramLimit { program_id })
    }

    pub fn sub_account(sub_account: Pubkey) -> Self {
        Action::SubAccount(SubAccountLimit { sub_account })
    }

    pub fn sol_limit(amount: u64) -> Self {
        Action::SolLimit(SolLimit { amount })
    }

    pub fn sol_recurring_limit(recurring_amount: u64, window: u64) -> Self {
        Action::SolRecurringLimit(SolRecurringLimit::new(recurring_amount, window))
    }

    pub fn token_limit(mint: Pubkey, amount: u64) -> Self {
        Action::TokenLimit(TokenLimit {
            mint,
            current_amount: amount,
        })
    }

    pub fn token_recurring_limit(mint: Pubkey, recurring_amount: u64, window: u64) -> Self {
        Action::TokenRecurringLimit(TokenRecurringLimit::new(mint, recurring_amount, window))
    }
}

fn expect_empty(permission: Permission, payload: &[u8]) -> Result<()> {
    if !payload.is_empty() {
        return Err(StateError::InvalidPayloadLength {
            kind: permission.name(),
            expected: 0,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// Walks `count` grants from the start of `buffer`.
///
/// Returns the grants and the final cursor position.
pub fn decode_actions(buffer: &[u8], count: usize) -> Result<(Vec<Action>, usize)> {
    let mut actions = Vec::with_capacity(count);
    let mut cursor = 0usize;

    for _ in 0..count {
        let header_end = cursor + ActionHeader::LEN;
        let header_bytes = buffer.get(cursor..header_end).ok_or(StateError::Truncated {
            offset: cursor,
            needed: ActionHeader::LEN,
            available: buffer.len().saturating_sub(cursor),
        })?;
        let header = ActionHeader::load(header_bytes)?;
        let permission = header.permission()?;

        let boundary = header.boundary() as usize;
        if boundary < header_end || boundary > buffer.len() {
            return Err(StateError::InvalidBoundary {
                offset: cursor,
                boundary,
            });
        }

        actions.push(Action::decode_payload(permission, &buffer[header_end..boundary])?);
        cursor = boundary;
    }

    Ok((actions, cursor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_kind() -> Vec<Action> {
        vec![
            Action::All,
            Action::ManageAuthority,
            Action::program([3u8; 32]),
            Action::ProgramAll,
            Action::ProgramCurated,
            Action::ProgramScope(ProgramScope::recurring_limit(
                [4u8; 32],
                [5u8; 32],
                NumericType::U64,
                64,
                72,
                1_000_000,
                250,
            )),
            Action::sub_account([6u8; 32]),
            Action::sol_limit(100_000_000),
            Action::SolRecurringLimit(SolRecurringLimit {
                recurring_amount: 500,
                window: 1_000,
                last_reset: 42,
                current_amount: 123,
            }),
            Action::token_limit([7u8; 32], 77),
            Action::TokenRecurringLimit(TokenRecurringLimit {
                mint: [8u8; 32],
                recurring_amount: 9,
                window: 10,
                last_reset: 11,
                current_amount: 12,
            }),
        ]
    }

    #[test]
    fn test_permission_from_u8() {
        assert_eq!(Permission::try_from(1).unwrap(), Permission::SolLimit);
        assert_eq!(Permission::try_from(7).unwrap(), Permission::All);
        assert_eq!(Permission::try_from(14).unwrap(), Permission::ProgramCurated);
        assert!(Permission::try_from(0).is_err());
        assert!(Permission::try_from(10).is_err());
        assert!(Permission::try_from(255).is_err());
    }

    #[test]
    fn test_every_kind_round_trips() {
        for action in every_kind() {
            let bytes = action.encode(0).unwrap();
            assert_eq!(
                bytes.len(),
                ActionHeader::LEN + action.permission().payload_len(),
                "{:?}",
                action.permission()
            );
            let (decoded, cursor) = decode_actions(&bytes, 1).unwrap();
            assert_eq!(decoded, vec![action]);
            assert_eq!(cursor, bytes.len());
        }
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(Permission::All.payload_len(), 0);
        assert_eq!(Permission::ManageAuthority.payload_len(), 0);
        assert_eq!(Permission::ProgramAll.payload_len(), 0);
        assert_eq!(Permission::ProgramCurated.payload_len(), 0);
        assert_eq!(Permission::Program.payload_len(), 32);
        assert_eq!(Permission::SubAccount.payload_len(), 32);
        assert_eq!(Permission::SolLimit.payload_len(), 8);
        assert_eq!(Permission::SolRecurringLimit.payload_len(), 32);
        assert_eq!(Permission::TokenLimit.payload_len(), 40);
        assert_eq!(Permission::TokenRecurringLimit.payload_len(), 64);
        assert_eq!(Permission::ProgramScope.payload_len(), 144);
    }

    #[test]
    fn test_header_layout() {
        let bytes = Action::sol_limit(0x0102).encode(16).unwrap();
        // tag, reserved, length u16, boundary u32
        assert_eq!(&bytes[..8], &[1, 0, 8, 0, 32, 0, 0, 0]);
        assert_eq!(&bytes[8..], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let mut bytes = Action::All.encode(0).unwrap();
        bytes[0] = 200;
        assert!(matches!(
            decode_actions(&bytes, 1),
            Err(StateError::UnknownPermission(200))
        ));
    }

    #[test]
    fn test_short_fixed_payload_is_fatal() {
        let mut bytes = Action::sol_limit(5).encode(0).unwrap();
        bytes.truncate(ActionHeader::LEN + 4);
        let len = bytes.len() as u32;
        bytes[4..8].copy_from_slice(&len.to_le_bytes());
        assert!(matches!(
            decode_actions(&bytes, 1),
            Err(StateError::InvalidPayloadLength {
                expected: 8,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_boundary_past_buffer_is_fatal() {
        let mut bytes = Action::sol_limit(5).encode(0).unwrap();
        bytes[4..8].copy_from_slice(&1_000u32.to_le_bytes());
        assert!(matches!(
            decode_actions(&bytes, 1),
            Err(StateError::InvalidBoundary { boundary: 1_000, .. })
        ));
    }

    #[test]
    fn test_boundary_inside_header_is_fatal() {
        let mut bytes = Action::All.encode(0).unwrap();
        bytes[4..8].copy_from_slice(&4u32.to_le_bytes());
        assert!(matches!(
            decode_actions(&bytes, 1),
            Err(StateError::InvalidBoundary { boundary: 4, .. })
        ));
    }

    #[test]
    fn test_truncated_header_is_fatal() {
        let bytes = Action::All.encode(0).unwrap();
        assert!(matches!(
            decode_actions(&bytes[..5], 1),
            Err(StateError::Truncated { offset: 0, .. })
        ));
        assert!(matches!(
            decode_actions(&bytes, 2),
            Err(StateError::Truncated { offset: 8, .. })
        ));
    }

    #[test]
    fn test_invalid_scope_type_is_fatal() {
        let scope = ProgramScope::basic([1u8; 32], [2u8; 32]);
        let mut bytes = Action::ProgramScope(scope).encode(0).unwrap();
        // scope_type lives after two u128, two u64 and two keys
        let scope_type_at = ActionHeader::LEN + 16 + 16 + 8 + 8 + 32 + 32;
        bytes[scope_type_at] = 9;
        assert!(matches!(
            decode_actions(&bytes, 1),
            Err(StateError::InvalidEnumValue { field: "scope_type", value: 9 })
        ));
    }
}
