use borsh::BorshSerialize;
use capwallet_state::Actions;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use tracing::debug;

use crate::advanced::compact::compact_instructions;
use crate::advanced::payload::{AuthorityPayloadBuilder, SigningKey, SlotSource};
use crate::core::config::SdkConfig;
use crate::core::connection::ChainAccess;
use crate::core::constants::{MAX_COMPACT_INDEX, TOKEN_PROGRAM_ID};
use crate::core::signer::Secp256k1Signer;
use crate::error::{Result, SdkError};
use crate::types::{AuthorityConfig, Role};
use crate::utils::{derive_associated_token_address, derive_sub_account_pda, derive_wallet_pda};

/// Instruction discriminators of the wallet program.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletInstruction {
    CreateV1 = 0,
    AddAuthorityV1 = 1,
    RemoveAuthorityV1 = 2,
    ReplaceAuthorityV1 = 3,
    SignV1 = 4,
    CreateSessionV1 = 5,
    CreateSubAccountV1 = 6,
    WithdrawFromSubAccountV1 = 7,
    SubAccountSignV1 = 8,
    ToggleSubAccountV1 = 9,
}

impl WalletInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            WalletInstruction::CreateV1 => "create",
            WalletInstruction::AddAuthorityV1 => "add_authority",
            WalletInstruction::RemoveAuthorityV1 => "remove_authority",
            WalletInstruction::ReplaceAuthorityV1 => "replace_authority",
            WalletInstruction::SignV1 => "sign",
            WalletInstruction::CreateSessionV1 => "create_session",
            WalletInstruction::CreateSubAccountV1 => "create_sub_account",
            WalletInstruction::WithdrawFromSubAccountV1 => "withdraw_from_sub_account",
            WalletInstruction::SubAccountSignV1 => "sub_account_sign",
            WalletInstruction::ToggleSubAccountV1 => "toggle_sub_account",
        }
    }
}

#[derive(BorshSerialize)]
struct CreateV1Args {
    discriminator: u16,
    authority_type: u16,
    authority_data_len: u16,
    bump: u8,
    num_actions: u8,
    id: [u8; 32],
}

#[derive(BorshSerialize)]
struct AddAuthorityV1Args {
    discriminator: u16,
    new_authority_data_len: u16,
    actions_data_len: u16,
    new_authority_type: u16,
    num_actions: u8,
    _padding: [u8; 3],
    acting_role_id: u32,
}

#[derive(BorshSerialize)]
struct RemoveAuthorityV1Args {
    discriminator: u16,
    authority_payload_len: u16,
    _padding: [u8; 4],
    acting_role_id: u32,
    authority_to_remove_id: u32,
}

#[derive(BorshSerialize)]
struct ReplaceAuthorityV1Args {
    discriminator: u16,
    new_authority_data_len: u16,
    actions_data_len: u16,
    new_authority_type: u16,
    num_actions: u8,
    _padding: [u8; 3],
    acting_role_id: u32,
    authority_to_replace_id: u32,
    _padding2: [u8; 4],
}

#[derive(BorshSerialize)]
struct SignV1Args {
    discriminator: u16,
    instruction_payload_len: u16,
    role_id: u32,
}

#[derive(BorshSerialize)]
struct CreateSessionV1Args {
    discriminator: u16,
    _padding: [u8; 2],
    role_id: u32,
    session_duration: u64,
    session_key: [u8; 32],
}

#[derive(BorshSerialize)]
struct CreateSubAccountV1Args {
    discriminator: u16,
    _padding: [u8; 2],
    role_id: u32,
    bump: u8,
    _padding2: [u8; 7],
}

#[derive(BorshSerialize)]
struct WithdrawFromSubAccountV1Args {
    discriminator: u16,
    _padding: [u8; 2],
    role_id: u32,
    amount: u64,
}

#[derive(BorshSerialize)]
struct SubAccountSignV1Args {
    discriminator: u16,
    instruction_payload_len: u16,
    role_id: u32,
    _padding: [u8; 8],
}

#[derive(BorshSerialize)]
struct ToggleSubAccountV1Args {
    discriminator: u16,
    _padding: u8,
    enabled: bool,
    role_id: u32,
}

/// Operations the assembler can build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Creates a wallet with its first role; needs no acting role
    CreateWallet {
        id: [u8; 32],
        authority: AuthorityConfig,
        actions: Actions,
    },
    /// Executes instructions with the wallet as signer
    Sign { instructions: Vec<Instruction> },
    /// Executes instructions with the role's sub-account as signer
    SubAccountSign { instructions: Vec<Instruction> },
    AddAuthority {
        authority: AuthorityConfig,
        actions: Actions,
    },
    RemoveAuthority { role_id: u32 },
    ReplaceAuthority {
        role_id: u32,
        authority: AuthorityConfig,
        actions: Actions,
    },
    /// Opens or rotates the session of a session-based role
    CreateSession { session_key: Pubkey, duration: u64 },
    CreateSubAccount,
    ToggleSubAccount { enabled: bool },
    WithdrawSol { amount: u64 },
    /// `token_program` defaults to the classic token program
    WithdrawToken {
        mint: Pubkey,
        amount: u64,
        token_program: Option<Pubkey>,
    },
}

impl Operation {
    pub fn instruction(&self) -> WalletInstruction {
        match self {
            Operation::CreateWallet { .. } => WalletInstruction::CreateV1,
            Operation::Sign { .. } => WalletInstruction::SignV1,
            Operation::SubAccountSign { .. } => WalletInstruction::SubAccountSignV1,
            Operation::AddAuthority { .. } => WalletInstruction::AddAuthorityV1,
            Operation::RemoveAuthority { .. } => WalletInstruction::RemoveAuthorityV1,
            Operation::ReplaceAuthority { .. } => WalletInstruction::ReplaceAuthorityV1,
            Operation::CreateSession { .. } => WalletInstruction::CreateSessionV1,
            Operation::CreateSubAccount => WalletInstruction::CreateSubAccountV1,
            Operation::ToggleSubAccount { .. } => WalletInstruction::ToggleSubAccountV1,
            Operation::WithdrawSol { .. } | Operation::WithdrawToken { .. } => {
                WalletInstruction::WithdrawFromSubAccountV1
            },
        }
    }
}

/// Per-call inputs besides the operation and the acting role.
#[derive(Clone, Copy)]
pub struct BuildArgs<'a> {
    pub payer: Pubkey,
    pub signer: Option<&'a dyn Secp256k1Signer>,
    pub slot_source: Option<SlotSource<'a>>,
}

impl<'a> BuildArgs<'a> {
    pub fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            signer: None,
            slot_source: None,
        }
    }

    pub fn with_signer(mut self, signer: &'a dyn Secp256k1Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_slot(mut self, slot: u64) -> Self {
        self.slot_source = Some(SlotSource::Fixed(slot));
        self
    }

    pub fn with_chain(mut self, chain: &'a dyn ChainAccess) -> Self {
        self.slot_source = Some(SlotSource::Chain(chain));
        self
    }

    fn payload_builder(&self) -> AuthorityPayloadBuilder<'a> {
        AuthorityPayloadBuilder::new(self.signer, self.slot_source)
    }
}

/// Turns operations into wallet program instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionAssembler {
    program_id: Pubkey,
    replay_counting: bool,
}

impl InstructionAssembler {
    pub fn new(config: SdkConfig) -> Self {
        Self {
            program_id: config.program_id,
            replay_counting: true,
        }
    }

    /// Whether secp256k1 payloads commit to the next signature odometer.
    pub fn with_replay_counting(mut self, enabled: bool) -> Self {
        self.replay_counting = enabled;
        self
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub async fn build(
        &self,
        operation: &Operation,
        role: Option<&Role>,
        args: &BuildArgs<'_>,
    ) -> Result<Vec<Instruction>> {
        let kind = operation.instruction();
        let instruction = match (operation, role) {
            (
                Operation::CreateWallet {
                    id,
                    authority,
                    actions,
                },
                _,
            ) => self.create_wallet(&args.payer, *id, authority, actions)?,
            (_, None) => return Err(SdkError::MissingRole(kind.name())),
            (Operation::Sign { instructions }, Some(role)) => {
                self.sign(role, instructions.clone(), args).await?
            },
            (Operation::SubAccountSign { instructions }, Some(role)) => {
                self.sub_account_sign(role, instructions.clone(), args)
                    .await?
            },
            (Operation::AddAuthority { authority, actions }, Some(role)) => {
                self.add_authority(role, authority, actions, args).await?
            },
            (Operation::RemoveAuthority { role_id }, Some(role)) => {
                self.remove_authority(role, *role_id, args).await?
            },
            (
                Operation::ReplaceAuthority {
                    role_id,
                    authority,
                    actions,
                },
                Some(role),
            ) => {
                self.replace_authority(role, *role_id, authority, actions, args)
                    .await?
            },
            (
                Operation::CreateSession {
                    session_key,
                    duration,
                },
                Some(role),
            ) => {
                self.create_session(role, session_key, *duration, args)
                    .await?
            },
            (Operation::CreateSubAccount, Some(role)) => {
                self.create_sub_account(role, args).await?
            },
            (Operation::ToggleSubAccount { enabled }, Some(role)) => {
                self.toggle_sub_account(role, *enabled, args).await?
            },
            (Operation::WithdrawSol { amount }, Some(role)) => {
                self.withdraw_sol(role, *amount, args).await?
            },
            (
                Operation::WithdrawToken {
                    mint,
                    amount,
                    token_program,
                },
                Some(role),
            ) => {
                let token_program = token_program.unwrap_or(TOKEN_PROGRAM_ID);
                self.withdraw_token(role, mint, &token_program, *amount, args)
                    .await?
            },
        };

        debug!(
            operation = kind.name(),
            role_id = ?role.map(|r| r.id),
            accounts = instruction.accounts.len(),
            data_len = instruction.data.len(),
            "assembled wallet instruction"
        );
        Ok(vec![instruction])
    }

    pub fn create_wallet(
        &self,
        payer: &Pubkey,
        id: [u8; 32],
        authority: &AuthorityConfig,
        actions: &Actions,
    ) -> Result<Instruction> {
        let (wallet, bump) = derive_wallet_pda(&self.program_id, &id);
        let authority_data = authority.create_data()?;

        let header = CreateV1Args {
            discriminator: WalletInstruction::CreateV1 as u16,
            authority_type: authority.authority_type().into(),
            authority_data_len: section_len("authority data", authority_data.len())?,
            bump,
            num_actions: action_count(actions)?,
            id,
        };

        let mut data = borsh::to_vec(&header)?;
        data.extend_from_slice(&authority_data);
        data.extend_from_slice(actions.bytes());

        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(wallet, false),
                AccountMeta::new(*payer, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data,
        })
    }

    async fn sign(
        &self,
        role: &Role,
        instructions: Vec<Instruction>,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let builder = args.payload_builder();
        builder.ensure_ready(&key)?;

        let accounts = self.with_signer(
            vec![
                AccountMeta::new(role.wallet, false),
                AccountMeta::new(args.payer, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            &key,
        );
        let (accounts, packed) = compact_instructions(role.wallet, None, accounts, instructions)?;
        let packed = packed.into_bytes();
        let payload = builder.build(&key, &packed, &accounts).await?;

        let header = SignV1Args {
            discriminator: WalletInstruction::SignV1 as u16,
            instruction_payload_len: section_len("instruction payload", packed.len())?,
            role_id: role.id,
        };
        self.finish(&header, &[&packed, &payload], accounts)
    }

    async fn sub_account_sign(
        &self,
        role: &Role,
        instructions: Vec<Instruction>,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let builder = args.payload_builder();
        builder.ensure_ready(&key)?;

        let sub_account = role.sub_account(&self.program_id);
        let accounts = self.with_signer(
            vec![
                AccountMeta::new_readonly(role.wallet, false),
                AccountMeta::new(args.payer, true),
                AccountMeta::new(sub_account, false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            &key,
        );
        let (accounts, packed) =
            compact_instructions(role.wallet, Some(sub_account), accounts, instructions)?;
        let packed = packed.into_bytes();
        let payload = builder.build(&key, &packed, &accounts).await?;

        let header = SubAccountSignV1Args {
            discriminator: WalletInstruction::SubAccountSignV1 as u16,
            instruction_payload_len: section_len("instruction payload", packed.len())?,
            role_id: role.id,
            _padding: [0; 8],
        };
        self.finish(&header, &[&packed, &payload], accounts)
    }

    async fn add_authority(
        &self,
        role: &Role,
        authority: &AuthorityConfig,
        actions: &Actions,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let authority_data = authority.create_data()?;
        let header = AddAuthorityV1Args {
            discriminator: WalletInstruction::AddAuthorityV1 as u16,
            new_authority_data_len: section_len("authority data", authority_data.len())?,
            actions_data_len: section_len("actions", actions.bytes().len())?,
            new_authority_type: authority.authority_type().into(),
            num_actions: action_count(actions)?,
            _padding: [0; 3],
            acting_role_id: role.id,
        };

        let domain = [authority_data.as_slice(), actions.bytes()].concat();
        let accounts = self.management_accounts(role, args, &key);
        let payload = args.payload_builder().build(&key, &domain, &accounts).await?;
        self.finish(
            &header,
            &[&authority_data, actions.bytes(), &payload],
            accounts,
        )
    }

    async fn remove_authority(
        &self,
        role: &Role,
        authority_to_remove_id: u32,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let accounts = self.management_accounts(role, args, &key);
        let payload = args
            .payload_builder()
            .build(&key, &authority_to_remove_id.to_le_bytes(), &accounts)
            .await?;

        let header = RemoveAuthorityV1Args {
            discriminator: WalletInstruction::RemoveAuthorityV1 as u16,
            authority_payload_len: section_len("authority payload", payload.len())?,
            _padding: [0; 4],
            acting_role_id: role.id,
            authority_to_remove_id,
        };
        self.finish(&header, &[&payload], accounts)
    }

    async fn replace_authority(
        &self,
        role: &Role,
        authority_to_replace_id: u32,
        authority: &AuthorityConfig,
        actions: &Actions,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let authority_data = authority.create_data()?;
        let header = ReplaceAuthorityV1Args {
            discriminator: WalletInstruction::ReplaceAuthorityV1 as u16,
            new_authority_data_len: section_len("authority data", authority_data.len())?,
            actions_data_len: section_len("actions", actions.bytes().len())?,
            new_authority_type: authority.authority_type().into(),
            num_actions: action_count(actions)?,
            _padding: [0; 3],
            acting_role_id: role.id,
            authority_to_replace_id,
            _padding2: [0; 4],
        };

        let domain = [authority_data.as_slice(), actions.bytes()].concat();
        let accounts = self.management_accounts(role, args, &key);
        let payload = args.payload_builder().build(&key, &domain, &accounts).await?;
        self.finish(
            &header,
            &[&authority_data, actions.bytes(), &payload],
            accounts,
        )
    }

    async fn create_session(
        &self,
        role: &Role,
        session_key: &Pubkey,
        duration: u64,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let session = role
            .authority
            .as_session()
            .ok_or(SdkError::NotSessionBased(role.id))?;
        let key = SigningKey::session_root(session, self.replay_counting);

        let domain = [session_key.to_bytes().as_slice(), &duration.to_le_bytes()[..]].concat();
        let accounts = self.management_accounts(role, args, &key);
        let payload = args.payload_builder().build(&key, &domain, &accounts).await?;

        let header = CreateSessionV1Args {
            discriminator: WalletInstruction::CreateSessionV1 as u16,
            _padding: [0; 2],
            role_id: role.id,
            session_duration: duration,
            session_key: session_key.to_bytes(),
        };
        self.finish(&header, &[&payload], accounts)
    }

    async fn create_sub_account(&self, role: &Role, args: &BuildArgs<'_>) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let (sub_account, bump) = derive_sub_account_pda(&self.program_id, &role.wallet_id, role.id);
        let accounts = self.with_signer(
            vec![
                AccountMeta::new(role.wallet, false),
                AccountMeta::new(args.payer, true),
                AccountMeta::new(sub_account, false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            &key,
        );
        let payload = args.payload_builder().build(&key, &[bump], &accounts).await?;

        let header = CreateSubAccountV1Args {
            discriminator: WalletInstruction::CreateSubAccountV1 as u16,
            _padding: [0; 2],
            role_id: role.id,
            bump,
            _padding2: [0; 7],
        };
        self.finish(&header, &[&payload], accounts)
    }

    async fn toggle_sub_account(
        &self,
        role: &Role,
        enabled: bool,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let accounts = self.with_signer(
            vec![
                AccountMeta::new_readonly(role.wallet, false),
                AccountMeta::new(args.payer, true),
                AccountMeta::new(role.sub_account(&self.program_id), false),
            ],
            &key,
        );
        let payload = args
            .payload_builder()
            .build(&key, &[enabled as u8], &accounts)
            .await?;

        let header = ToggleSubAccountV1Args {
            discriminator: WalletInstruction::ToggleSubAccountV1 as u16,
            _padding: 0,
            enabled,
            role_id: role.id,
        };
        self.finish(&header, &[&payload], accounts)
    }

    async fn withdraw_sol(&self, role: &Role, amount: u64, args: &BuildArgs<'_>) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let accounts = self.with_signer(
            vec![
                AccountMeta::new(role.wallet, false),
                AccountMeta::new(args.payer, true),
                AccountMeta::new(role.sub_account(&self.program_id), false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            &key,
        );
        let payload = args
            .payload_builder()
            .build(&key, &amount.to_le_bytes(), &accounts)
            .await?;
        self.finish(&withdraw_header(role, amount), &[&payload], accounts)
    }

    async fn withdraw_token(
        &self,
        role: &Role,
        mint: &Pubkey,
        token_program: &Pubkey,
        amount: u64,
        args: &BuildArgs<'_>,
    ) -> Result<Instruction> {
        let key = SigningKey::routine(&role.authority, self.replay_counting);
        let sub_account = role.sub_account(&self.program_id);
        let accounts = self.with_signer(
            vec![
                AccountMeta::new(role.wallet, false),
                AccountMeta::new(args.payer, true),
                AccountMeta::new(sub_account, false),
                AccountMeta::new(
                    derive_associated_token_address(&sub_account, mint, token_program),
                    false,
                ),
                AccountMeta::new(
                    derive_associated_token_address(&role.wallet, mint, token_program),
                    false,
                ),
                AccountMeta::new_readonly(*token_program, false),
            ],
            &key,
        );
        let domain = [&amount.to_le_bytes()[..], &mint.to_bytes()[..]].concat();
        let payload = args.payload_builder().build(&key, &domain, &accounts).await?;
        self.finish(&withdraw_header(role, amount), &[&payload], accounts)
    }

    fn management_accounts(&self, role: &Role, args: &BuildArgs<'_>, key: &SigningKey) -> Vec<AccountMeta> {
        self.with_signer(
            vec![
                AccountMeta::new(role.wallet, false),
                AccountMeta::new(args.payer, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            key,
        )
    }

    fn with_signer(&self, mut accounts: Vec<AccountMeta>, key: &SigningKey) -> Vec<AccountMeta> {
        if let Some(signer) = key.signer_account() {
            accounts.push(signer);
        }
        accounts
    }

    fn finish<H: BorshSerialize>(
        &self,
        header: &H,
        sections: &[&[u8]],
        accounts: Vec<AccountMeta>,
    ) -> Result<Instruction> {
        let mut data = borsh::to_vec(header)?;
        for section in sections {
            data.extend_from_slice(section);
        }
        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}

fn withdraw_header(role: &Role, amount: u64) -> WithdrawFromSubAccountV1Args {
    WithdrawFromSubAccountV1Args {
        discriminator: WalletInstruction::WithdrawFromSubAccountV1 as u16,
        _padding: [0; 2],
        role_id: role.id,
        amount,
    }
}

fn section_len(what: &'static str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| SdkError::PayloadTooLarge {
        what,
        len,
        max: u16::MAX as usize,
    })
}

fn action_count(actions: &Actions) -> Result<u8> {
    if actions.len() > MAX_COMPACT_INDEX {
        return Err(SdkError::PayloadTooLarge {
            what: "actions",
            len: actions.len(),
            max: MAX_COMPACT_INDEX,
        });
    }
    Ok(actions.len() as u8)
}
