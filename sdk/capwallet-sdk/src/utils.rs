use capwallet_state::authority::{authority_type_to_length, secp256k1};
use capwallet_state::{Actions, Position, StateError, SubAccount, Transmutable, WalletAccount};
use sha3::{Digest, Keccak256};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::core::connection::ChainAccess;
use crate::core::constants::ASSOCIATED_TOKEN_PROGRAM_ID;
use crate::error::{Result, SdkError};
use crate::types::{Authority, Role, WalletInfo};

//=============================================================================
// PDA Derivation Helpers
//=============================================================================

/// Derive the wallet PDA from program ID and wallet ID
pub fn derive_wallet_pda(program_id: &Pubkey, wallet_id: &[u8; 32]) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[WalletAccount::PREFIX_SEED, wallet_id], program_id)
}

/// Derive the sub-account PDA of one role
pub fn derive_sub_account_pda(
    program_id: &Pubkey,
    wallet_id: &[u8; 32],
    role_id: u32,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[SubAccount::PREFIX_SEED, wallet_id, &role_id.to_le_bytes()],
        program_id,
    )
}

/// Associated token account of `owner` for `mint`
pub fn derive_associated_token_address(
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// Ethereum address of a compressed secp256k1 key: the last 20 bytes of
/// keccak256 over the uncompressed point.
pub fn secp256k1_address(compressed: &[u8; 33]) -> Result<[u8; 20]> {
    let uncompressed = secp256k1::decompress(compressed)?;
    let hash = Keccak256::digest(uncompressed);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Ok(address)
}

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

/// Fetch raw account data from the chain
pub async fn fetch_account_data(chain: &dyn ChainAccess, address: &Pubkey) -> Result<Vec<u8>> {
    let account = chain
        .get_account(address)
        .await
        .map_err(|e| SdkError::Connection(e.to_string()))?
        .ok_or(SdkError::AccountNotFound(*address))?;

    Ok(account.data)
}

/// Fetch and parse a wallet account
pub async fn fetch_wallet_account(chain: &dyn ChainAccess, address: &Pubkey) -> Result<WalletInfo> {
    let data = fetch_account_data(chain, address).await?;
    parse_wallet(address, &data)
}

/// Fetch and parse a sub-account
pub async fn fetch_sub_account(chain: &dyn ChainAccess, address: &Pubkey) -> Result<SubAccount> {
    let data = fetch_account_data(chain, address).await?;
    Ok(SubAccount::parse(&data)?)
}

/// Parse the wallet header and every role that follows it
pub fn parse_wallet(address: &Pubkey, data: &[u8]) -> Result<WalletInfo> {
    let (header, _) = WalletAccount::split(data)?;
    let roles = parse_roles(address, data)?;

    Ok(WalletInfo {
        address: *address,
        id: header.id,
        bump: header.bump,
        role_counter: header.role_counter,
        roles,
    })
}

/// Parse all roles from wallet account data
pub fn parse_roles(address: &Pubkey, data: &[u8]) -> Result<Vec<Role>> {
    let (header, buffer) = WalletAccount::split(data)?;
    let mut roles = Vec::with_capacity(header.roles as usize);
    let mut cursor = 0usize;

    for _ in 0..header.roles {
        let position =
            Position::load_prefix(&buffer[cursor..]).map_err(|e| relocate(e, cursor))?;

        let authority_type = position.authority_type()?;
        let expected = authority_type_to_length(&authority_type);
        if position.authority_length as usize != expected {
            return Err(StateError::InvalidAuthorityData(format!(
                "role {} declares {} authority bytes, {:?} stores {}",
                position.id, position.authority_length, authority_type, expected
            ))
            .into());
        }

        let auth_start = cursor + Position::LEN;
        let auth_end = auth_start + position.authority_length as usize;
        let boundary = position.boundary as usize;
        if boundary < auth_end || boundary > buffer.len() {
            return Err(StateError::InvalidBoundary {
                offset: cursor,
                boundary,
            }
            .into());
        }

        let authority = Authority::from_stored(authority_type, &buffer[auth_start..auth_end])?;
        let actions = Actions::decode(&buffer[auth_end..boundary], position.num_actions as usize)?;

        roles.push(Role {
            id: position.id,
            wallet: *address,
            wallet_id: header.id,
            authority,
            actions,
        });
        cursor = boundary;
    }

    debug!(wallet = %address, roles = roles.len(), "parsed wallet roles");
    Ok(roles)
}

fn relocate(error: StateError, offset: usize) -> StateError {
    match error {
        StateError::Truncated {
            needed, available, ..
        } => StateError::Truncated {
            offset,
            needed,
            available,
        },
        other => other,
    }
}

/// Find a specific role by ID
pub fn find_role(roles: &[Role], role_id: u32) -> Option<&Role> {
    roles.iter().find(|r| r.id == role_id)
}

/// Every role whose authority accepts `signer`
pub fn find_roles_by_signer<'a>(roles: &'a [Role], signer: &[u8]) -> Vec<&'a Role> {
    roles.iter().filter(|r| r.matches_signer(signer)).collect()
}
