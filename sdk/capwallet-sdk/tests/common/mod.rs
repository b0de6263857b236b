#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use capwallet_sdk::state::{Actions, AuthorityType, IntoBytes, Position, Transmutable, WalletAccount};
use capwallet_sdk::types::Role;
use capwallet_sdk::{ChainAccess, SdkConfig};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

/// In-memory chain state.
pub struct MockChain {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    slot: u64,
    slot_reads: AtomicUsize,
    account_reads: AtomicUsize,
}

impl MockChain {
    pub fn new(slot: u64) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            slot,
            slot_reads: AtomicUsize::new(0),
            account_reads: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        let account = Account {
            lamports: 1_000_000,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        };
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn slot_reads(&self) -> usize {
        self.slot_reads.load(Ordering::SeqCst)
    }

    pub fn account_reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainAccess for MockChain {
    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn std::error::Error + Send + Sync>> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_slot(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        self.slot_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.slot)
    }
}

/// Role record to lay out in a synthesized wallet account.
pub struct RoleFixture {
    pub id: u32,
    pub authority_type: AuthorityType,
    pub stored_authority: Vec<u8>,
    pub actions: Actions,
}

/// Serializes a wallet account header followed by `roles`.
pub fn wallet_account_data(id: [u8; 32], bump: u8, roles: &[RoleFixture]) -> Vec<u8> {
    let mut header = WalletAccount::new(id, bump);
    header.roles = roles.len() as u16;
    header.role_counter = roles.iter().map(|r| r.id + 1).max().unwrap_or(0);

    let mut data = header.into_bytes().unwrap();
    let mut buffer = Vec::new();
    for role in roles {
        let boundary = buffer.len()
            + Position::LEN
            + role.stored_authority.len()
            + role.actions.bytes().len();
        let position = Position::new(
            role.authority_type,
            role.stored_authority.len() as u16,
            role.actions.len() as u16,
            role.id,
            boundary as u32,
        );
        buffer.extend_from_slice(&position.into_bytes().unwrap());
        buffer.extend_from_slice(&role.stored_authority);
        buffer.extend_from_slice(role.actions.bytes());
    }
    data.extend_from_slice(&buffer);
    data
}

pub fn test_config() -> SdkConfig {
    SdkConfig::default()
}

/// Role snapshot for `wallet_id` under the default program.
pub fn role(id: u32, wallet_id: [u8; 32], authority: capwallet_sdk::Authority, actions: Actions) -> Role {
    let (wallet, _) = capwallet_sdk::derive_wallet_pda(&test_config().program_id, &wallet_id);
    Role {
        id,
        wallet,
        wallet_id,
        authority,
        actions,
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
