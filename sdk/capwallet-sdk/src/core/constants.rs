use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

// Mainnet deployment of the wallet program
pub const DEFAULT_PROGRAM_ID: Pubkey = pubkey!("swigDk8JezhiAVde8k6NMwxpZfgGm2NNuMe1KYCmUjP");

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Prefix an Ethereum wallet prepends to a 64-character hex message before hashing.
pub const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n64";

/// Number of compact instructions, account indices and table entries are all u8.
pub const MAX_COMPACT_INDEX: usize = u8::MAX as usize;
