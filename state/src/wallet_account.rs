//! Wallet and sub-account headers

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{Result, StateError};
use crate::transmute::Transmutable;
use crate::{Discriminator, Pubkey};

/// Wallet account header.
///
/// Followed by `roles` role records, each a [`crate::Position`] plus its
/// authority data and grants.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletAccount {
    /// Account type discriminator
    pub discriminator: u8,
    /// PDA bump seed
    pub bump: u8,
    /// Unique wallet identifier
    pub id: [u8; 32],
    /// Number of roles currently stored
    pub roles: u16,
    /// Total roles ever created; the next role id
    pub role_counter: u32,
    pub reserved_lamports: u64,
}

impl WalletAccount {
    /// PDA seed prefix for the wallet
    pub const PREFIX_SEED: &'static [u8] = b"swig";

    pub fn new(id: [u8; 32], bump: u8) -> Self {
        Self {
            discriminator: Discriminator::Wallet as u8,
            bump,
            id,
            roles: 0,
            role_counter: 0,
            reserved_lamports: 0,
        }
    }

    /// Parses the header and returns it with the roles buffer that follows.
    pub fn split(data: &[u8]) -> Result<(Self, &[u8])> {
        let header = Self::load_prefix(data)?;
        if header.discriminator != Discriminator::Wallet as u8 {
            return Err(StateError::InvalidDiscriminator {
                expected: Discriminator::Wallet as u8,
                actual: header.discriminator,
            });
        }
        Ok((header, &data[Self::LEN..]))
    }
}

impl Transmutable for WalletAccount {
    const LEN: usize = 48;
}

/// Sub-account owned by one role of a wallet.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubAccount {
    pub discriminator: u8,
    pub bump: u8,
    pub enabled: bool,
    _padding: u8,
    pub role_id: u32,
    pub wallet_id: Pubkey,
    pub reserved_lamports: u64,
}

impl SubAccount {
    /// PDA seed prefix for sub-accounts
    pub const PREFIX_SEED: &'static [u8] = b"sub-account";

    pub fn new(wallet_id: Pubkey, role_id: u32, bump: u8) -> Self {
        Self {
            discriminator: Discriminator::SubAccount as u8,
            bump,
            enabled: true,
            _padding: 0,
            role_id,
            wallet_id,
            reserved_lamports: 0,
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let account = Self::load_prefix(data)?;
        if account.discriminator != Discriminator::SubAccount as u8 {
            return Err(StateError::InvalidDiscriminator {
                expected: Discriminator::SubAccount as u8,
                actual: account.discriminator,
            });
        }
        Ok(account)
    }
}

impl Transmutable for SubAccount {
    const LEN: usize = 48;
}
