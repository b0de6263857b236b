//! State crate for the capability wallet client.
//!
//! This crate defines the byte layouts shared with the wallet program:
//! capability grants, authority data, role headers and account headers.

pub mod action;
pub mod authority;
pub mod error;
pub mod position;
pub mod transmute;
pub mod wallet_account;

pub use action::{Action, ActionHeader, Actions, Permission};
pub use authority::{AuthorityInfo, AuthorityType, SessionInfo};
pub use error::{Result, StateError};
pub use position::Position;
pub use transmute::{IntoBytes, Transmutable};
pub use wallet_account::{SubAccount, WalletAccount};

/// Raw 32-byte address.
pub type Pubkey = [u8; 32];

/// Discriminator for wallet program account types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminator {
    /// Uninitialized account
    Uninitialized = 0,
    /// Wallet account holding the roles
    Wallet = 1,
    /// Per-role sub-account
    SubAccount = 2,
}
