//! Packing of wrapped instructions into the compact wire format.

use std::collections::HashMap;

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use tracing::trace;

use crate::core::constants::MAX_COMPACT_INDEX;
use crate::error::{Result, SdkError};

/// A set of packed instructions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompactInstructions {
    pub inner_instructions: Vec<CompactInstruction>,
}

/// A single instruction whose accounts are indices into the outer account list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompactInstructions {
    /// Count byte, then per instruction: program index, account count,
    /// indices, u16 data length and data.
    pub fn into_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.inner_instructions.len() as u8];
        for ix in self.inner_instructions.iter() {
            bytes.push(ix.program_id_index);
            bytes.push(ix.accounts.len() as u8);
            bytes.extend(ix.accounts.iter());
            bytes.extend((ix.data.len() as u16).to_le_bytes());
            bytes.extend(ix.data.iter());
        }
        bytes
    }

    pub fn len(&self) -> usize {
        self.inner_instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner_instructions.is_empty()
    }
}

/// Packs `inner_instructions` against an account table seeded with `accounts`.
///
/// Program ids always get a fresh entry. Other accounts reuse the first
/// entry with the same address. References to `wallet` or `sub_account`
/// lose their signer flag; only the outer authorization can speak for them.
pub fn compact_instructions(
    wallet: Pubkey,
    sub_account: Option<Pubkey>,
    mut accounts: Vec<AccountMeta>,
    inner_instructions: Vec<Instruction>,
) -> Result<(Vec<AccountMeta>, CompactInstructions)> {
    if inner_instructions.len() > MAX_COMPACT_INDEX {
        return Err(SdkError::TooManyAccounts {
            what: "inner instructions",
            count: inner_instructions.len(),
        });
    }

    let mut compact_ix = Vec::with_capacity(inner_instructions.len());
    let mut indices = accounts
        .iter()
        .enumerate()
        .map(|(i, x)| (x.pubkey, i))
        .collect::<HashMap<Pubkey, usize>>();

    for ix in inner_instructions.into_iter() {
        if ix.data.len() > u16::MAX as usize {
            return Err(SdkError::PayloadTooLarge {
                what: "inner instruction data",
                len: ix.data.len(),
                max: u16::MAX as usize,
            });
        }
        if ix.accounts.len() > MAX_COMPACT_INDEX {
            return Err(SdkError::TooManyAccounts {
                what: "instruction accounts",
                count: ix.accounts.len(),
            });
        }

        let program_id_index = push_account(
            &mut accounts,
            AccountMeta::new_readonly(ix.program_id, false),
        )?;

        let mut accts = Vec::with_capacity(ix.accounts.len());
        for mut ix_account in ix.accounts.into_iter() {
            if ix_account.pubkey == wallet || Some(ix_account.pubkey) == sub_account {
                ix_account.is_signer = false;
            }
            let pubkey = ix_account.pubkey;
            if let Some(index) = indices.get(&pubkey) {
                accts.push(*index as u8);
            } else {
                let idx = push_account(&mut accounts, ix_account)?;
                indices.insert(pubkey, idx as usize);
                accts.push(idx);
            }
        }

        compact_ix.push(CompactInstruction {
            program_id_index,
            accounts: accts,
            data: ix.data,
        });
    }

    trace!(
        instructions = compact_ix.len(),
        table_size = accounts.len(),
        "packed inner instructions"
    );

    Ok((
        accounts,
        CompactInstructions {
            inner_instructions: compact_ix,
        },
    ))
}

fn push_account(accounts: &mut Vec<AccountMeta>, meta: AccountMeta) -> Result<u8> {
    let index = accounts.len();
    if index >= MAX_COMPACT_INDEX {
        return Err(SdkError::TooManyAccounts {
            what: "table accounts",
            count: index + 1,
        });
    }
    accounts.push(meta);
    Ok(index as u8)
}
