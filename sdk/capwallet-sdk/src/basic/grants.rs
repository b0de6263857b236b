use capwallet_state::action::{NumericType, ProgramScope};
use capwallet_state::{Action, Actions};
use solana_sdk::pubkey::Pubkey;

use crate::error::Result;

/// Fluent builder for the grant set of a new or replaced role.
#[derive(Debug, Default)]
pub struct ActionsBuilder {
    actions: Vec<Action>,
}

impl ActionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root access; satisfies every check.
    pub fn all(self) -> Self {
        self.push(Action::All)
    }

    pub fn manage_authority(self) -> Self {
        self.push(Action::ManageAuthority)
    }

    pub fn program(self, program_id: Pubkey) -> Self {
        self.push(Action::program(program_id.to_bytes()))
    }

    pub fn program_all(self) -> Self {
        self.push(Action::ProgramAll)
    }

    pub fn program_curated(self) -> Self {
        self.push(Action::ProgramCurated)
    }

    /// Allows `program_id` to touch `target_account` without a limit.
    pub fn program_scope(self, program_id: Pubkey, target_account: Pubkey) -> Self {
        self.push(Action::ProgramScope(ProgramScope::basic(
            program_id.to_bytes(),
            target_account.to_bytes(),
        )))
    }

    /// Caps how far the numeric field at `field` in `target_account` may move.
    pub fn program_scope_limit(
        self,
        program_id: Pubkey,
        target_account: Pubkey,
        numeric_type: NumericType,
        field: std::ops::Range<u64>,
        limit: u128,
    ) -> Self {
        self.push(Action::ProgramScope(ProgramScope::limit(
            program_id.to_bytes(),
            target_account.to_bytes(),
            numeric_type,
            field.start,
            field.end,
            limit,
        )))
    }

    /// Like [`Self::program_scope_limit`], with the cap refilled every
    /// `window` slots.
    pub fn program_scope_recurring_limit(
        self,
        program_id: Pubkey,
        target_account: Pubkey,
        numeric_type: NumericType,
        field: std::ops::Range<u64>,
        limit: u128,
        window: u64,
    ) -> Self {
        self.push(Action::ProgramScope(ProgramScope::recurring_limit(
            program_id.to_bytes(),
            target_account.to_bytes(),
            numeric_type,
            field.start,
            field.end,
            limit,
            window,
        )))
    }

    /// Lets the role create and control its sub-account.
    pub fn sub_account(self) -> Self {
        self.push(Action::sub_account([0u8; 32]))
    }

    pub fn sol_limit(self, amount: u64) -> Self {
        self.push(Action::sol_limit(amount))
    }

    pub fn sol_recurring_limit(self, amount: u64, window: u64) -> Self {
        self.push(Action::sol_recurring_limit(amount, window))
    }

    pub fn token_limit(self, mint: Pubkey, amount: u64) -> Self {
        self.push(Action::token_limit(mint.to_bytes(), amount))
    }

    pub fn token_recurring_limit(self, mint: Pubkey, amount: u64, window: u64) -> Self {
        self.push(Action::token_recurring_limit(mint.to_bytes(), amount, window))
    }

    pub fn push(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Encodes the grants in insertion order.
    pub fn build(self) -> Result<Actions> {
        Ok(Actions::from_actions(self.actions)?)
    }
}
