//! Position structure - header of one role inside a wallet's roles buffer

use borsh::{BorshDeserialize, BorshSerialize};

use crate::authority::AuthorityType;
use crate::error::Result;
use crate::transmute::Transmutable;

/// Role header.
///
/// The role's authority data follows the header, then its grants. `boundary`
/// is the absolute offset, within the roles buffer, where the role ends.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Authority type (Ed25519, Secp256k1, etc.)
    pub authority_type: u16,
    /// Length of authority data
    pub authority_length: u16,
    /// Number of grants following the authority data
    pub num_actions: u16,
    padding: u16,
    /// Role id assigned by the wallet program
    pub id: u32,
    /// Boundary marker (end of this role)
    pub boundary: u32,
}

impl Position {
    pub fn new(
        authority_type: AuthorityType,
        authority_length: u16,
        num_actions: u16,
        id: u32,
        boundary: u32,
    ) -> Self {
        Self {
            authority_type: authority_type.into(),
            authority_length,
            num_actions,
            padding: 0,
            id,
            boundary,
        }
    }

    /// Get authority type
    pub fn authority_type(&self) -> Result<AuthorityType> {
        AuthorityType::try_from(self.authority_type)
    }
}

impl Transmutable for Position {
    const LEN: usize = 16;
}
