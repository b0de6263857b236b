//! Fixed-size grant payloads for program, sub-account and spend grants.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{ActionPayload, Permission};
use crate::transmute::Transmutable;
use crate::Pubkey;

/// Allows invoking one program.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLimit {
    pub program_id: Pubkey,
}

impl Transmutable for ProgramLimit {
    const LEN: usize = 32;
}

impl ActionPayload for ProgramLimit {
    const PERMISSION: Permission = Permission::Program;
}

/// Allows controlling the role's sub-account.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubAccountLimit {
    /// Zeroed until the wallet program records the created sub-account
    pub sub_account: Pubkey,
}

impl Transmutable for SubAccountLimit {
    const LEN: usize = 32;
}

impl ActionPayload for SubAccountLimit {
    const PERMISSION: Permission = Permission::SubAccount;
}

/// One-shot lamport budget.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolLimit {
    pub amount: u64,
}

impl Transmutable for SolLimit {
    const LEN: usize = 8;
}

impl ActionPayload for SolLimit {
    const PERMISSION: Permission = Permission::SolLimit;
}

/// Lamport budget that refills every `window` slots.
///
/// `current_amount` is what remains in the current window as of the last
/// fetch; the wallet program resets it lazily.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolRecurringLimit {
    pub recurring_amount: u64,
    pub window: u64,
    pub last_reset: u64,
    pub current_amount: u64,
}

impl SolRecurringLimit {
    pub fn new(recurring_amount: u64, window: u64) -> Self {
        Self {
            recurring_amount,
            window,
            last_reset: 0,
            current_amount: recurring_amount,
        }
    }
}

impl Transmutable for SolRecurringLimit {
    const LEN: usize = 32;
}

impl ActionPayload for SolRecurringLimit {
    const PERMISSION: Permission = Permission::SolRecurringLimit;
}

/// One-shot budget for a single token mint.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLimit {
    pub mint: Pubkey,
    pub current_amount: u64,
}

impl Transmutable for TokenLimit {
    const LEN: usize = 40;
}

impl ActionPayload for TokenLimit {
    const PERMISSION: Permission = Permission::TokenLimit;
}

/// Recurring budget for a single token mint.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRecurringLimit {
    pub mint: Pubkey,
    pub recurring_amount: u64,
    pub window: u64,
    pub last_reset: u64,
    pub current_amount: u64,
}

impl TokenRecurringLimit {
    pub fn new(mint: Pubkey, recurring_amount: u64, window: u64) -> Self {
        Self {
            mint,
            recurring_amount,
            window,
            last_reset: 0,
            current_amount: recurring_amount,
        }
    }
}

impl Transmutable for TokenRecurringLimit {
    const LEN: usize = 64;
}

impl ActionPayload for TokenRecurringLimit {
    const PERMISSION: Permission = Permission::TokenRecurringLimit;
}
