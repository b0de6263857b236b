//! Client library for a capability-based smart wallet.
//!
//! Roles pair an authority with a set of grants. This crate evaluates
//! grants client-side, packs wrapped instructions and builds the
//! authorization payloads the wallet program verifies.

pub mod advanced;
pub mod basic;
pub mod core;
pub mod error;
pub mod permissions;
pub mod types;
pub mod utils;

pub use crate::advanced::instructions::{BuildArgs, InstructionAssembler, Operation};
pub use crate::basic::grants::ActionsBuilder;
pub use crate::basic::wallet::CapWallet;
pub use crate::core::config::SdkConfig;
pub use crate::core::connection::{rpc_client, ChainAccess};
pub use crate::core::signer::{LocalSecp256k1Signer, Secp256k1Signer, SignatureResponse};
pub use crate::error::{Result, SdkError};
pub use crate::permissions::{Permissions, SpendController};
pub use crate::types::{Authority, AuthorityConfig, Role, SessionAuthority, TokenAuthority, WalletInfo};
pub use crate::utils::{
    derive_associated_token_address, derive_sub_account_pda, derive_wallet_pda, fetch_wallet_account,
    find_role, find_roles_by_signer, parse_roles, parse_wallet, secp256k1_address,
};

pub mod state {
    pub use capwallet_state::action::{NumericType, ProgramScope, ProgramScopeType};
    pub use capwallet_state::authority::AuthorityType;
    pub use capwallet_state::{
        Action, Actions, AuthorityInfo, IntoBytes, Permission, Position, SessionInfo, SubAccount,
        Transmutable, WalletAccount,
    };
}
