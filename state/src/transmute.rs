use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{Result, StateError};

/// Fixed-size layout read from and written to raw account or instruction bytes.
///
/// Implementors are plain borsh structs made only of scalars and fixed
/// arrays, so their encoding carries no length prefixes and is exactly
/// `LEN` bytes long.
pub trait Transmutable: BorshSerialize + BorshDeserialize + Sized {
    /// The length of the type in bytes.
    const LEN: usize;

    /// Decodes `Self` from exactly `LEN` bytes.
    fn load(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(StateError::InvalidPayloadLength {
                kind: std::any::type_name::<Self>(),
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self::try_from_slice(bytes)?)
    }

    /// Decodes `Self` from the first `LEN` bytes of a longer buffer.
    fn load_prefix(bytes: &[u8]) -> Result<Self> {
        let head = bytes.get(..Self::LEN).ok_or(StateError::Truncated {
            offset: 0,
            needed: Self::LEN,
            available: bytes.len(),
        })?;
        Self::load(head)
    }
}

/// Trait for types that can be converted into their byte representation.
pub trait IntoBytes {
    /// Converts the implementing type into bytes.
    fn into_bytes(&self) -> Result<Vec<u8>>;
}

impl<T: Transmutable> IntoBytes for T {
    fn into_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(T::LEN);
        self.serialize(&mut bytes)?;
        Ok(bytes)
    }
}
