//! Program-scoped grant: allows a program and optionally caps a numeric
//! field read from a named account.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{ActionPayload, Permission};
use crate::error::{Result, StateError};
use crate::transmute::Transmutable;
use crate::Pubkey;

/// How the monitored field is limited.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramScopeType {
    /// Program use only, no limit
    Basic = 0,
    /// Fixed limit on the monitored field
    Limit = 1,
    /// Limit that refills every `window` slots
    RecurringLimit = 2,
}

impl TryFrom<u64> for ProgramScopeType {
    type Error = StateError;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            0 => Ok(ProgramScopeType::Basic),
            1 => Ok(ProgramScopeType::Limit),
            2 => Ok(ProgramScopeType::RecurringLimit),
            _ => Err(StateError::InvalidEnumValue {
                field: "scope_type",
                value,
            }),
        }
    }
}

/// Width of the monitored field inside the target account.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    U8 = 0,
    U32 = 1,
    U64 = 2,
    U128 = 3,
}

impl NumericType {
    pub const fn byte_len(&self) -> u64 {
        match self {
            NumericType::U8 => 1,
            NumericType::U32 => 4,
            NumericType::U64 => 8,
            NumericType::U128 => 16,
        }
    }
}

impl TryFrom<u64> for NumericType {
    type Error = StateError;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            0 => Ok(NumericType::U8),
            1 => Ok(NumericType::U32),
            2 => Ok(NumericType::U64),
            3 => Ok(NumericType::U128),
            _ => Err(StateError::InvalidEnumValue {
                field: "numeric_type",
                value,
            }),
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramScope {
    pub current_amount: u128,
    pub limit: u128,
    pub window: u64,
    pub last_reset: u64,
    pub program_id: Pubkey,
    pub target_account: Pubkey,
    scope_type: u64,
    numeric_type: u64,
    /// Byte range of the monitored field within the target account's data
    pub balance_field_start: u64,
    pub balance_field_end: u64,
}

impl ProgramScope {
    pub fn basic(program_id: Pubkey, target_account: Pubkey) -> Self {
        Self {
            current_amount: 0,
            limit: 0,
            window: 0,
            last_reset: 0,
            program_id,
            target_account,
            scope_type: ProgramScopeType::Basic as u64,
            numeric_type: NumericType::U64 as u64,
            balance_field_start: 0,
            balance_field_end: 0,
        }
    }

    pub fn limit(
        program_id: Pubkey,
        target_account: Pubkey,
        numeric_type: NumericType,
        balance_field_start: u64,
        balance_field_end: u64,
        limit: u128,
    ) -> Self {
        Self {
            limit,
            scope_type: ProgramScopeType::Limit as u64,
            numeric_type: numeric_type as u64,
            balance_field_start,
            balance_field_end,
            ..Self::basic(program_id, target_account)
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn recurring_limit(
        program_id: Pubkey,
        target_account: Pubkey,
        numeric_type: NumericType,
        balance_field_start: u64,
        balance_field_end: u64,
        limit: u128,
        window: u64,
    ) -> Self {
        Self {
            window,
            scope_type: ProgramScopeType::RecurringLimit as u64,
            ..Self::limit(
                program_id,
                target_account,
                numeric_type,
                balance_field_start,
                balance_field_end,
                limit,
            )
        }
    }

    pub fn scope_type(&self) -> Result<ProgramScopeType> {
        ProgramScopeType::try_from(self.scope_type)
    }

    pub fn numeric_type(&self) -> Result<NumericType> {
        NumericType::try_from(self.numeric_type)
    }

    /// Remaining allowance on the monitored field, `None` for basic scopes.
    pub fn remaining(&self) -> Option<u128> {
        match self.scope_type() {
            Ok(ProgramScopeType::Limit) | Ok(ProgramScopeType::RecurringLimit) => {
                Some(self.limit.saturating_sub(self.current_amount))
            },
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.scope_type()?;
        self.numeric_type()?;
        Ok(())
    }
}

impl Transmutable for ProgramScope {
    const LEN: usize = 144;
}

impl ActionPayload for ProgramScope {
    const PERMISSION: Permission = Permission::ProgramScope;
}
