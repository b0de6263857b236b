use thiserror::Error;

/// Errors raised while decoding or encoding wallet state.
///
/// Every variant is fatal: the bytes either came from chain state that
/// should never be malformed, or from an untrusted source.
#[derive(Debug, Error)]
pub enum StateError {
    /// Grant tag outside the closed permission set
    #[error("Unknown permission tag: {0}")]
    UnknownPermission(u16),

    /// Fixed-size payload did not match its kind
    #[error("Invalid payload length for {kind}: expected {expected}, got {actual}")]
    InvalidPayloadLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Buffer ended before a header or payload was complete
    #[error("Truncated buffer at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Boundary points before its own header or past the buffer
    #[error("Invalid boundary {boundary} at offset {offset}")]
    InvalidBoundary { offset: usize, boundary: usize },

    /// Decoded fewer bytes than the buffer holds
    #[error("Trailing bytes after last grant: consumed {consumed} of {total}")]
    TrailingBytes { consumed: usize, total: usize },

    /// Authority type code outside the supported set
    #[error("Invalid authority type: {0}")]
    InvalidAuthorityType(u16),

    /// Authority data has the wrong shape for its type
    #[error("Invalid authority data: {0}")]
    InvalidAuthorityData(String),

    /// Account discriminator does not match the expected account kind
    #[error("Invalid discriminator: expected {expected}, got {actual}")]
    InvalidDiscriminator { expected: u8, actual: u8 },

    /// Enum field holds an unknown value
    #[error("Invalid {field} value: {value}")]
    InvalidEnumValue { field: &'static str, value: u64 },

    /// Secp256k1 key could not be parsed
    #[error("Invalid secp256k1 public key")]
    InvalidSecp256k1Key,

    /// Borsh serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] std::io::Error),
}

/// Result type alias for state operations
pub type Result<T> = std::result::Result<T, StateError>;
