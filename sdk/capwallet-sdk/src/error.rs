use capwallet_state::StateError;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// SDK-specific error types for wallet operations
#[derive(Debug, Error)]
pub enum SdkError {
    /// Connection or RPC error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Account not found on-chain
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Malformed or truncated wallet state
    #[error("Invalid account data: {0}")]
    State(#[from] StateError),

    /// Role not found in wallet
    #[error("Role {0} not found in wallet")]
    RoleNotFound(u32),

    /// Secp256k1 authority used without a signing callback
    #[error("Authority {0:?} requires a signing callback")]
    MissingSigner(capwallet_state::AuthorityType),

    /// Secp256k1 payload requested without a way to read the current slot
    #[error("A slot source is required to sign secp256k1 payloads")]
    MissingSlotSource,

    /// Acting role required by an operation was not supplied
    #[error("Operation {0} requires an acting role")]
    MissingRole(&'static str),

    /// Session operation on an authority without sessions
    #[error("Role {0} does not use a session-based authority")]
    NotSessionBased(u32),

    /// Authority creation data has the wrong shape
    #[error("Invalid authority data: {0}")]
    InvalidAuthorityData(String),

    /// Account table or instruction list exceeds u8 indexing
    #[error("Too many {what}: {count} (max 255)")]
    TooManyAccounts { what: &'static str, count: usize },

    /// Variable section exceeds its length prefix
    #[error("{what} too large: {len} bytes (max {max})")]
    PayloadTooLarge {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// Signing callback failed or returned a malformed signature
    #[error("Signing error: {0}")]
    Signing(String),

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Borsh serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] std::io::Error),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
