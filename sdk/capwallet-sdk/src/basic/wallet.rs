use capwallet_state::{AuthorityInfo, SessionInfo, SubAccount};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::advanced::instructions::{BuildArgs, InstructionAssembler, Operation};
use crate::core::config::SdkConfig;
use crate::core::connection::ChainAccess;
use crate::error::{Result, SdkError};
use crate::types::{AuthorityConfig, Role, WalletInfo};
use crate::utils;

/// A wallet account and its roles, as of one fetch.
///
/// Snapshots are never updated in place; [`CapWallet::refresh`] returns a
/// new one.
#[derive(Debug, Clone)]
pub struct CapWallet {
    config: SdkConfig,
    info: WalletInfo,
    /// Slot observed together with the account data
    fetched_slot: u64,
}

impl CapWallet {
    /// Fetch an existing wallet by its address
    pub async fn fetch(chain: &dyn ChainAccess, config: SdkConfig, address: Pubkey) -> Result<Self> {
        let (data, slot) = tokio::try_join!(utils::fetch_account_data(chain, &address), async {
            chain
                .get_slot()
                .await
                .map_err(|e| SdkError::Connection(e.to_string()))
        })?;
        let info = utils::parse_wallet(&address, &data)?;

        debug!(
            wallet = %address,
            roles = info.roles.len(),
            slot,
            "fetched wallet"
        );
        Ok(Self {
            config,
            info,
            fetched_slot: slot,
        })
    }

    /// Fetch an existing wallet by its id
    pub async fn fetch_by_id(chain: &dyn ChainAccess, config: SdkConfig, id: [u8; 32]) -> Result<Self> {
        let (address, _) = utils::derive_wallet_pda(&config.program_id, &id);
        Self::fetch(chain, config, address).await
    }

    pub async fn refresh(&self, chain: &dyn ChainAccess) -> Result<Self> {
        Self::fetch(chain, self.config.clone(), self.info.address).await
    }

    /// Instruction creating a new wallet; no existing role is involved.
    pub fn create(
        config: SdkConfig,
        payer: &Pubkey,
        id: [u8; 32],
        authority: &AuthorityConfig,
        actions: &capwallet_state::Actions,
    ) -> Result<Instruction> {
        InstructionAssembler::new(config).create_wallet(payer, id, authority, actions)
    }

    pub fn address(&self) -> Pubkey {
        self.info.address
    }

    pub fn id(&self) -> [u8; 32] {
        self.info.id
    }

    pub fn info(&self) -> &WalletInfo {
        &self.info
    }

    pub fn fetched_slot(&self) -> u64 {
        self.fetched_slot
    }

    pub fn roles(&self) -> &[Role] {
        &self.info.roles
    }

    pub fn role(&self, role_id: u32) -> Result<&Role> {
        utils::find_role(&self.info.roles, role_id).ok_or(SdkError::RoleNotFound(role_id))
    }

    /// Roles whose authority is identified by `identity` (a public key).
    pub fn find_roles_by_identity(&self, identity: &[u8]) -> Vec<&Role> {
        self.info
            .roles
            .iter()
            .filter(|r| r.authority.identity() == identity)
            .collect()
    }

    /// Roles the given signer can act as. See [`Role::matches_signer`].
    pub fn find_roles_by_signer(&self, signer: &[u8]) -> Vec<&Role> {
        utils::find_roles_by_signer(&self.info.roles, signer)
    }

    pub fn find_roles_by_ed25519_signer(&self, signer: &Pubkey) -> Vec<&Role> {
        self.find_roles_by_signer(signer.as_ref())
    }

    pub fn find_roles_by_secp256k1_address(&self, address: &[u8; 20]) -> Vec<&Role> {
        self.find_roles_by_signer(address)
    }

    /// The session-based role currently delegating to `session_key`.
    pub fn find_role_by_session_key(&self, session_key: &Pubkey) -> Option<&Role> {
        let session_key = session_key.to_bytes();
        self.info.roles.iter().find(|r| {
            r.authority
                .as_session()
                .is_some_and(|s| s.session_key() == session_key)
        })
    }

    /// Whether the role's session was active at the fetched slot.
    pub fn is_session_active(&self, role_id: u32) -> Result<bool> {
        let role = self.role(role_id)?;
        let session = role
            .authority
            .as_session()
            .ok_or(SdkError::NotSessionBased(role_id))?;
        Ok(session.is_session_active(self.fetched_slot))
    }

    pub fn sub_account_address(&self, role_id: u32) -> Pubkey {
        utils::derive_sub_account_pda(&self.config.program_id, &self.info.id, role_id).0
    }

    pub async fn fetch_sub_account(&self, chain: &dyn ChainAccess, role_id: u32) -> Result<SubAccount> {
        utils::fetch_sub_account(chain, &self.sub_account_address(role_id)).await
    }

    pub fn assembler(&self) -> InstructionAssembler {
        InstructionAssembler::new(self.config.clone())
    }

    /// Builds `operation` acting as `role_id`.
    pub async fn build(
        &self,
        role_id: u32,
        operation: &Operation,
        args: &BuildArgs<'_>,
    ) -> Result<Vec<Instruction>> {
        let role = self.role(role_id)?;
        self.assembler().build(operation, Some(role), args).await
    }

    /// Wraps `instructions` so the wallet executes them as `role_id`.
    pub async fn sign(
        &self,
        role_id: u32,
        instructions: Vec<Instruction>,
        args: &BuildArgs<'_>,
    ) -> Result<Vec<Instruction>> {
        self.build(role_id, &Operation::Sign { instructions }, args)
            .await
    }
}
