mod common;

use assert_matches::assert_matches;
use capwallet_sdk::core::constants::TOKEN_PROGRAM_ID as TOKEN_PROGRAM;
use capwallet_sdk::state::{Action, Actions};
use capwallet_sdk::types::{Authority, AuthorityConfig, SessionAuthority, TokenAuthority};
use capwallet_sdk::utils::derive_associated_token_address;
use capwallet_sdk::{
    derive_sub_account_pda, derive_wallet_pda, ActionsBuilder, BuildArgs, InstructionAssembler,
    Operation, Role, SdkError,
};
use capwallet_state::authority::ed25519::{ED25519Authority, Ed25519SessionAuthority};
use common::{role, test_config};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::{system_instruction, system_program};

const WALLET_ID: [u8; 32] = [0x5a; 32];

fn ed25519_role(id: u32, key: Pubkey, actions: Actions) -> Role {
    role(
        id,
        WALLET_ID,
        Authority::Token(TokenAuthority::Ed25519(ED25519Authority {
            public_key: key.to_bytes(),
        })),
        actions,
    )
}

fn ed25519_session_role(id: u32, root: Pubkey, session: Pubkey) -> Role {
    role(
        id,
        WALLET_ID,
        Authority::Session(SessionAuthority::Ed25519(Ed25519SessionAuthority {
            public_key: root.to_bytes(),
            session_key: session.to_bytes(),
            max_session_length: 1_000,
            current_session_expiration: 0,
        })),
        Actions::from_actions(vec![Action::All]).unwrap(),
    )
}

async fn build_one(operation: Operation, role: &Role, payer: Pubkey) -> Instruction {
    let assembler = InstructionAssembler::new(test_config());
    let mut ixs = assembler
        .build(&operation, Some(role), &BuildArgs::new(payer))
        .await
        .unwrap();
    assert_eq!(ixs.len(), 1);
    ixs.remove(0)
}

#[tokio::test]
async fn test_sign_end_to_end_bytes() {
    common::init_tracing();
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let recipient = Pubkey::new_unique();
    let actions = ActionsBuilder::new().sol_limit(100_000_000).build().unwrap();
    let role = ed25519_role(0, key, actions);

    let transfer = system_instruction::transfer(&role.wallet, &recipient, 100_000_000);
    let ix = build_one(
        Operation::Sign {
            instructions: vec![transfer],
        },
        &role,
        payer,
    )
    .await;

    let compact: Vec<u8> = vec![
        1, // one instruction
        4, // program index: fresh system program entry
        2, 0, 5, // wallet, recipient
        12, 0, // data length
        2, 0, 0, 0, 0x00, 0xe1, 0xf5, 0x05, 0, 0, 0, 0,
    ];
    let mut expected = vec![4, 0];
    expected.extend_from_slice(&(compact.len() as u16).to_le_bytes());
    expected.extend_from_slice(&0u32.to_le_bytes());
    expected.extend_from_slice(&compact);
    expected.extend_from_slice(key.as_ref());
    assert_eq!(ix.data, expected);

    assert_eq!(ix.accounts, vec![
        AccountMeta::new(role.wallet, false),
        AccountMeta::new(payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(key, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new(recipient, false),
    ]);
    assert_eq!(ix.program_id, test_config().program_id);
}

#[tokio::test]
async fn test_over_limit_still_builds() {
    let key = Pubkey::new_unique();
    let actions = ActionsBuilder::new().sol_limit(100_000_000).build().unwrap();
    let role = ed25519_role(0, key, actions);

    let transfer = system_instruction::transfer(&role.wallet, &Pubkey::new_unique(), 110_000_000);
    let ix = build_one(
        Operation::Sign {
            instructions: vec![transfer],
        },
        &role,
        Pubkey::new_unique(),
    )
    .await;

    assert_eq!(ix.data[0], 4);
    assert!(!role.permissions().can_spend_sol(Some(110_000_000)));
    assert!(role.permissions().can_spend_sol(Some(100_000_000)));
}

#[tokio::test]
async fn test_sub_account_sign_layout() {
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let role = ed25519_role(3, key, ActionsBuilder::new().sub_account().build().unwrap());
    let (sub_account, _) = derive_sub_account_pda(&test_config().program_id, &WALLET_ID, 3);
    let recipient = Pubkey::new_unique();

    let ix = build_one(
        Operation::SubAccountSign {
            instructions: vec![system_instruction::transfer(&sub_account, &recipient, 7)],
        },
        &role,
        payer,
    )
    .await;

    let packed_len = u16::from_le_bytes([ix.data[2], ix.data[3]]) as usize;
    assert_eq!(&ix.data[0..2], &8u16.to_le_bytes());
    assert_eq!(&ix.data[4..8], &3u32.to_le_bytes());
    assert_eq!(&ix.data[8..16], &[0u8; 8]);
    // sub-account is index 2 and must appear without its signer flag
    assert_eq!(&ix.data[16..21], &[1, 5, 2, 2, 6]);
    assert_eq!(&ix.data[16 + packed_len..], key.as_ref());

    assert_eq!(ix.accounts[0], AccountMeta::new_readonly(role.wallet, false));
    assert_eq!(ix.accounts[1], AccountMeta::new(payer, true));
    assert_eq!(ix.accounts[2], AccountMeta::new(sub_account, false));
    assert_eq!(ix.accounts[3], AccountMeta::new_readonly(system_program::id(), false));
    assert_eq!(ix.accounts[4], AccountMeta::new_readonly(key, true));
    assert!(!ix.accounts[2].is_signer);
}

#[tokio::test]
async fn test_add_authority_layout() {
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let new_key = Pubkey::new_unique();
    let role = ed25519_role(1, key, ActionsBuilder::new().manage_authority().build().unwrap());
    let grants = ActionsBuilder::new().sol_limit(5).program_all().build().unwrap();

    let ix = build_one(
        Operation::AddAuthority {
            authority: AuthorityConfig::Ed25519(new_key),
            actions: grants.clone(),
        },
        &role,
        payer,
    )
    .await;

    let mut expected = vec![1, 0];
    expected.extend_from_slice(&32u16.to_le_bytes());
    expected.extend_from_slice(&(grants.bytes().len() as u16).to_le_bytes());
    expected.extend_from_slice(&1u16.to_le_bytes());
    expected.push(2);
    expected.extend_from_slice(&[0, 0, 0]);
    expected.extend_from_slice(&1u32.to_le_bytes());
    assert_eq!(expected.len(), 16);
    expected.extend_from_slice(new_key.as_ref());
    expected.extend_from_slice(grants.bytes());
    expected.extend_from_slice(key.as_ref());
    assert_eq!(ix.data, expected);

    assert_eq!(ix.accounts, vec![
        AccountMeta::new(role.wallet, false),
        AccountMeta::new(payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(key, true),
    ]);
}

#[tokio::test]
async fn test_remove_authority_layout() {
    let key = Pubkey::new_unique();
    let role = ed25519_role(0, key, Actions::from_actions(vec![Action::All]).unwrap());

    let ix = build_one(Operation::RemoveAuthority { role_id: 6 }, &role, Pubkey::new_unique()).await;

    let mut expected = vec![2, 0];
    expected.extend_from_slice(&32u16.to_le_bytes());
    expected.extend_from_slice(&[0; 4]);
    expected.extend_from_slice(&0u32.to_le_bytes());
    expected.extend_from_slice(&6u32.to_le_bytes());
    expected.extend_from_slice(key.as_ref());
    assert_eq!(ix.data, expected);
    assert_eq!(ix.accounts.len(), 4);
}

#[tokio::test]
async fn test_replace_authority_layout() {
    let key = Pubkey::new_unique();
    let role = ed25519_role(0, key, Actions::from_actions(vec![Action::All]).unwrap());
    let session_key = Pubkey::new_unique();
    let authority = AuthorityConfig::Ed25519Session {
        public_key: Pubkey::new_unique(),
        session_key,
        max_session_length: 300,
    };
    let grants = ActionsBuilder::new().all().build().unwrap();

    let ix = build_one(
        Operation::ReplaceAuthority {
            role_id: 2,
            authority: authority.clone(),
            actions: grants.clone(),
        },
        &role,
        Pubkey::new_unique(),
    )
    .await;

    assert_eq!(&ix.data[0..2], &3u16.to_le_bytes());
    assert_eq!(&ix.data[2..4], &72u16.to_le_bytes());
    assert_eq!(&ix.data[4..6], &8u16.to_le_bytes());
    assert_eq!(&ix.data[6..8], &2u16.to_le_bytes());
    assert_eq!(ix.data[8], 1);
    assert_eq!(&ix.data[9..12], &[0, 0, 0]);
    assert_eq!(&ix.data[12..16], &0u32.to_le_bytes());
    assert_eq!(&ix.data[16..20], &2u32.to_le_bytes());
    assert_eq!(&ix.data[20..24], &[0; 4]);
    assert_eq!(&ix.data[24..96], authority.create_data().unwrap().as_slice());
    assert_eq!(&ix.data[96..104], grants.bytes());
    assert_eq!(&ix.data[104..], key.as_ref());
}

#[tokio::test]
async fn test_create_session_signed_by_root() {
    let root = Pubkey::new_unique();
    let current_session = Pubkey::new_unique();
    let next_session = Pubkey::new_unique();
    let role = ed25519_session_role(4, root, current_session);

    let ix = build_one(
        Operation::CreateSession {
            session_key: next_session,
            duration: 900,
        },
        &role,
        Pubkey::new_unique(),
    )
    .await;

    assert_eq!(&ix.data[0..2], &5u16.to_le_bytes());
    assert_eq!(&ix.data[2..4], &[0, 0]);
    assert_eq!(&ix.data[4..8], &4u32.to_le_bytes());
    assert_eq!(&ix.data[8..16], &900u64.to_le_bytes());
    assert_eq!(&ix.data[16..48], next_session.as_ref());
    assert_eq!(&ix.data[48..], root.as_ref());
    assert_eq!(ix.accounts[3], AccountMeta::new_readonly(root, true));
}

#[tokio::test]
async fn test_session_role_signs_routine_ops_with_session_key() {
    let root = Pubkey::new_unique();
    let session = Pubkey::new_unique();
    let role = ed25519_session_role(4, root, session);

    let ix = build_one(Operation::RemoveAuthority { role_id: 1 }, &role, Pubkey::new_unique()).await;
    assert_eq!(&ix.data[16..], session.as_ref());
    assert_eq!(ix.accounts[3], AccountMeta::new_readonly(session, true));
}

#[tokio::test]
async fn test_create_session_requires_session_role() {
    let role = ed25519_role(2, Pubkey::new_unique(), Actions::default());
    let result = InstructionAssembler::new(test_config())
        .build(
            &Operation::CreateSession {
                session_key: Pubkey::new_unique(),
                duration: 10,
            },
            Some(&role),
            &BuildArgs::new(Pubkey::new_unique()),
        )
        .await;
    assert_matches!(result, Err(SdkError::NotSessionBased(2)));
}

#[tokio::test]
async fn test_create_sub_account_layout() {
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let role = ed25519_role(5, key, ActionsBuilder::new().sub_account().build().unwrap());
    let (sub_account, bump) = derive_sub_account_pda(&test_config().program_id, &WALLET_ID, 5);

    let ix = build_one(Operation::CreateSubAccount, &role, payer).await;

    let mut expected = vec![6, 0, 0, 0];
    expected.extend_from_slice(&5u32.to_le_bytes());
    expected.push(bump);
    expected.extend_from_slice(&[0; 7]);
    expected.extend_from_slice(key.as_ref());
    assert_eq!(ix.data, expected);
    assert_eq!(ix.accounts, vec![
        AccountMeta::new(role.wallet, false),
        AccountMeta::new(payer, true),
        AccountMeta::new(sub_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(key, true),
    ]);
}

#[tokio::test]
async fn test_toggle_sub_account_layout() {
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let role = ed25519_role(5, key, Actions::default());
    let (sub_account, _) = derive_sub_account_pda(&test_config().program_id, &WALLET_ID, 5);

    let ix = build_one(Operation::ToggleSubAccount { enabled: false }, &role, payer).await;

    let mut expected = vec![9, 0, 0, 0];
    expected.extend_from_slice(&5u32.to_le_bytes());
    expected.extend_from_slice(key.as_ref());
    assert_eq!(ix.data, expected);
    assert_eq!(ix.accounts, vec![
        AccountMeta::new_readonly(role.wallet, false),
        AccountMeta::new(payer, true),
        AccountMeta::new(sub_account, false),
        AccountMeta::new_readonly(key, true),
    ]);
}

#[tokio::test]
async fn test_withdraw_sol_layout() {
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let role = ed25519_role(5, key, Actions::default());
    let (sub_account, _) = derive_sub_account_pda(&test_config().program_id, &WALLET_ID, 5);

    let ix = build_one(Operation::WithdrawSol { amount: 42 }, &role, payer).await;

    let mut expected = vec![7, 0, 0, 0];
    expected.extend_from_slice(&5u32.to_le_bytes());
    expected.extend_from_slice(&42u64.to_le_bytes());
    expected.extend_from_slice(key.as_ref());
    assert_eq!(ix.data, expected);
    assert_eq!(ix.accounts, vec![
        AccountMeta::new(role.wallet, false),
        AccountMeta::new(payer, true),
        AccountMeta::new(sub_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(key, true),
    ]);
}

#[tokio::test]
async fn test_withdraw_token_layout() {
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let role = ed25519_role(5, key, Actions::default());
    let (sub_account, _) = derive_sub_account_pda(&test_config().program_id, &WALLET_ID, 5);

    let ix = build_one(
        Operation::WithdrawToken {
            mint,
            amount: 9,
            token_program: None,
        },
        &role,
        payer,
    )
    .await;

    assert_eq!(&ix.data[0..2], &7u16.to_le_bytes());
    assert_eq!(&ix.data[8..16], &9u64.to_le_bytes());
    assert_eq!(ix.accounts, vec![
        AccountMeta::new(role.wallet, false),
        AccountMeta::new(payer, true),
        AccountMeta::new(sub_account, false),
        AccountMeta::new(
            derive_associated_token_address(&sub_account, &mint, &TOKEN_PROGRAM),
            false
        ),
        AccountMeta::new(
            derive_associated_token_address(&role.wallet, &mint, &TOKEN_PROGRAM),
            false
        ),
        AccountMeta::new_readonly(TOKEN_PROGRAM, false),
        AccountMeta::new_readonly(key, true),
    ]);
}

#[tokio::test]
async fn test_withdraw_token_with_other_token_program() {
    let key = Pubkey::new_unique();
    let payer = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let token_2022 = Pubkey::new_unique();
    let role = ed25519_role(5, key, Actions::default());
    let (sub_account, _) = derive_sub_account_pda(&test_config().program_id, &WALLET_ID, 5);

    let ix = build_one(
        Operation::WithdrawToken {
            mint,
            amount: 9,
            token_program: Some(token_2022),
        },
        &role,
        payer,
    )
    .await;

    assert_eq!(
        ix.accounts[3].pubkey,
        derive_associated_token_address(&sub_account, &mint, &token_2022)
    );
    assert_eq!(
        ix.accounts[4].pubkey,
        derive_associated_token_address(&role.wallet, &mint, &token_2022)
    );
    assert_ne!(
        ix.accounts[3].pubkey,
        derive_associated_token_address(&sub_account, &mint, &TOKEN_PROGRAM)
    );
    assert_eq!(ix.accounts[5], AccountMeta::new_readonly(token_2022, false));
    assert!(!ix.accounts.iter().any(|m| m.pubkey == TOKEN_PROGRAM));
}

#[tokio::test]
async fn test_create_wallet_through_build() {
    let payer = Pubkey::new_unique();
    let owner = Pubkey::new_unique();
    let actions = ActionsBuilder::new().all().build().unwrap();
    let ixs = InstructionAssembler::new(test_config())
        .build(
            &Operation::CreateWallet {
                id: WALLET_ID,
                authority: AuthorityConfig::Ed25519(owner),
                actions: actions.clone(),
            },
            None,
            &BuildArgs::new(payer),
        )
        .await
        .unwrap();

    let (wallet, bump) = derive_wallet_pda(&test_config().program_id, &WALLET_ID);
    let ix = &ixs[0];
    assert_eq!(ix.accounts[0], AccountMeta::new(wallet, false));
    assert_eq!(ix.data.len(), 40 + 32 + actions.bytes().len());
    assert_eq!(ix.data[6], bump);
}

#[tokio::test]
async fn test_role_bound_operation_without_role() {
    let result = InstructionAssembler::new(test_config())
        .build(
            &Operation::WithdrawSol { amount: 1 },
            None,
            &BuildArgs::new(Pubkey::new_unique()),
        )
        .await;
    assert_matches!(result, Err(SdkError::MissingRole(_)));
}

#[tokio::test]
async fn test_custom_program_id() {
    let program_id = Pubkey::new_unique();
    let assembler = InstructionAssembler::new(capwallet_sdk::SdkConfig::new(program_id));
    let role = ed25519_role(0, Pubkey::new_unique(), Actions::default());
    let ixs = assembler
        .build(
            &Operation::ToggleSubAccount { enabled: true },
            Some(&role),
            &BuildArgs::new(Pubkey::new_unique()),
        )
        .await
        .unwrap();
    assert_eq!(ixs[0].program_id, program_id);
    assert_eq!(
        ixs[0].accounts[2].pubkey,
        derive_sub_account_pda(&program_id, &WALLET_ID, 0).0
    );
}
