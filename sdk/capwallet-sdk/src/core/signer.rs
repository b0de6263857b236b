use async_trait::async_trait;
use capwallet_state::authority::secp256k1::compress;
use sha3::{Digest, Keccak256};

use crate::core::constants::ETH_MESSAGE_PREFIX;
use crate::error::{Result, SdkError};

/// Signature returned by a secp256k1 signing callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResponse {
    /// 64-byte compact signature, optionally followed by a recovery byte
    pub signature: Vec<u8>,
    /// Bytes the signer prepended before hashing, sent along so the
    /// verifier can rebuild the digest
    pub prefix: Option<Vec<u8>>,
}

/// Signing callback for secp256k1 authorities.
///
/// Abstracts any external signer:
/// 1. Local keys (tests, backends)
/// 2. Browser or hardware wallets that only sign prefixed messages
/// 3. Remote signing services
///
/// A call is a single request/response; retries are up to the caller.
#[async_trait]
pub trait Secp256k1Signer: Send + Sync {
    /// Signs the SHA-256 hash of an authorization message.
    async fn sign(&self, message_hash: &[u8; 32]) -> std::result::Result<SignatureResponse, String>;
}

/// Digest an Ethereum wallet signs for a 32-byte hash: keccak256(prefix ++ hex(hash)).
pub fn eth_signed_digest(message_hash: &[u8; 32], prefix: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(prefix);
    hasher.update(hex::encode(message_hash).as_bytes());
    hasher.finalize().into()
}

/// In-process secp256k1 signer producing Ethereum-style signatures.
pub struct LocalSecp256k1Signer {
    secret: libsecp256k1::SecretKey,
}

impl LocalSecp256k1Signer {
    pub fn new(secret: &[u8; 32]) -> Result<Self> {
        let secret = libsecp256k1::SecretKey::parse(secret)
            .map_err(|e| SdkError::Signing(format!("invalid secret key: {e:?}")))?;
        Ok(Self { secret })
    }

    /// Uncompressed public key without the 0x04 tag.
    pub fn public_key(&self) -> [u8; 64] {
        let full = libsecp256k1::PublicKey::from_secret_key(&self.secret).serialize();
        let mut key = [0u8; 64];
        key.copy_from_slice(&full[1..]);
        key
    }

    pub fn compressed_public_key(&self) -> [u8; 33] {
        compress(&self.public_key())
    }
}

#[async_trait]
impl Secp256k1Signer for LocalSecp256k1Signer {
    async fn sign(&self, message_hash: &[u8; 32]) -> std::result::Result<SignatureResponse, String> {
        let digest = eth_signed_digest(message_hash, ETH_MESSAGE_PREFIX);
        let message = libsecp256k1::Message::parse(&digest);
        let (signature, recovery_id) = libsecp256k1::sign(&message, &self.secret);

        let mut bytes = signature.serialize().to_vec();
        bytes.push(27 + recovery_id.serialize());

        Ok(SignatureResponse {
            signature: bytes,
            prefix: Some(ETH_MESSAGE_PREFIX.to_vec()),
        })
    }
}
