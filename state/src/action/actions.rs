use super::{decode_actions, Action};
use crate::error::{Result, StateError};

/// Ordered grant collection of one role.
///
/// Keeps the exact source buffer next to the decoded grants; the buffer is
/// never re-encoded, so bytes read from chain state go back out unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Actions {
    actions: Vec<Action>,
    bytes: Vec<u8>,
}

impl Actions {
    /// Decodes exactly `count` grants that together fill `buffer`.
    pub fn decode(buffer: &[u8], count: usize) -> Result<Self> {
        let (actions, consumed) = decode_actions(buffer, count)?;
        if consumed != buffer.len() {
            return Err(StateError::TrailingBytes {
                consumed,
                total: buffer.len(),
            });
        }
        Ok(Self {
            actions,
            bytes: buffer.to_vec(),
        })
    }

    /// Encodes a fresh grant buffer.
    pub fn from_actions(actions: Vec<Action>) -> Result<Self> {
        let mut bytes = Vec::new();
        for action in actions.iter() {
            let encoded = action.encode(bytes.len())?;
            bytes.extend_from_slice(&encoded);
        }
        Ok(Self { actions, bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<'a> IntoIterator for &'a Actions {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
