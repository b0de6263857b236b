use capwallet_state::authority::ed25519::{
    CreateEd25519SessionAuthority, ED25519Authority, Ed25519SessionAuthority,
};
use capwallet_state::authority::secp256k1::{
    self, CreateSecp256k1SessionAuthority, Secp256k1Authority, Secp256k1SessionAuthority,
};
use capwallet_state::{Actions, AuthorityInfo, AuthorityType, IntoBytes, SessionInfo, Transmutable};
use solana_sdk::pubkey::Pubkey;

use crate::error::{Result, SdkError};
use crate::permissions::Permissions;
use crate::utils::{derive_sub_account_pda, secp256k1_address};

/// Authorities whose key signs every operation directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAuthority {
    Ed25519(ED25519Authority),
    Secp256k1(Secp256k1Authority),
}

/// Authorities with a root key and a rotating session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAuthority {
    Ed25519(Ed25519SessionAuthority),
    Secp256k1(Secp256k1SessionAuthority),
}

/// Authentication method of a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    Token(TokenAuthority),
    Session(SessionAuthority),
}

impl TokenAuthority {
    fn inner(&self) -> &dyn AuthorityInfo {
        match self {
            TokenAuthority::Ed25519(a) => a,
            TokenAuthority::Secp256k1(a) => a,
        }
    }
}

impl SessionAuthority {
    fn inner(&self) -> &dyn SessionInfo {
        match self {
            SessionAuthority::Ed25519(a) => a,
            SessionAuthority::Secp256k1(a) => a,
        }
    }

    /// Whether opening a session must be proven with a secp256k1 signature.
    pub fn root_is_secp256k1(&self) -> bool {
        matches!(self, SessionAuthority::Secp256k1(_))
    }
}

impl AuthorityInfo for TokenAuthority {
    fn authority_type(&self) -> AuthorityType {
        self.inner().authority_type()
    }

    fn session_based(&self) -> bool {
        false
    }

    fn identity(&self) -> &[u8] {
        self.inner().identity()
    }

    fn signer(&self) -> &[u8] {
        self.inner().signer()
    }

    fn signature_odometer(&self) -> Option<u32> {
        self.inner().signature_odometer()
    }
}

impl AuthorityInfo for SessionAuthority {
    fn authority_type(&self) -> AuthorityType {
        self.inner().authority_type()
    }

    fn session_based(&self) -> bool {
        true
    }

    fn identity(&self) -> &[u8] {
        self.inner().identity()
    }

    fn signer(&self) -> &[u8] {
        self.inner().signer()
    }

    fn signature_odometer(&self) -> Option<u32> {
        self.inner().signature_odometer()
    }
}

impl SessionInfo for SessionAuthority {
    fn session_key(&self) -> [u8; 32] {
        self.inner().session_key()
    }

    fn max_session_length(&self) -> u64 {
        self.inner().max_session_length()
    }

    fn current_session_expiration(&self) -> u64 {
        self.inner().current_session_expiration()
    }
}

impl Authority {
    /// Decodes stored authority data of the given type.
    pub fn from_stored(authority_type: AuthorityType, data: &[u8]) -> Result<Self> {
        let authority = match authority_type {
            AuthorityType::Ed25519 => {
                Authority::Token(TokenAuthority::Ed25519(ED25519Authority::load(data)?))
            },
            AuthorityType::Secp256k1 => {
                Authority::Token(TokenAuthority::Secp256k1(Secp256k1Authority::load(data)?))
            },
            AuthorityType::Ed25519Session => Authority::Session(SessionAuthority::Ed25519(
                Ed25519SessionAuthority::load(data)?,
            )),
            AuthorityType::Secp256k1Session => Authority::Session(SessionAuthority::Secp256k1(
                Secp256k1SessionAuthority::load(data)?,
            )),
        };
        Ok(authority)
    }

    pub fn as_session(&self) -> Option<&SessionAuthority> {
        match self {
            Authority::Session(session) => Some(session),
            Authority::Token(_) => None,
        }
    }

    fn inner(&self) -> &dyn AuthorityInfo {
        match self {
            Authority::Token(a) => a,
            Authority::Session(a) => a,
        }
    }
}

impl AuthorityInfo for Authority {
    fn authority_type(&self) -> AuthorityType {
        self.inner().authority_type()
    }

    fn session_based(&self) -> bool {
        self.as_session().is_some()
    }

    fn identity(&self) -> &[u8] {
        self.inner().identity()
    }

    fn signer(&self) -> &[u8] {
        self.inner().signer()
    }

    fn signature_odometer(&self) -> Option<u32> {
        self.inner().signature_odometer()
    }
}

/// Authority to install when creating a wallet or adding/replacing a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityConfig {
    Ed25519(Pubkey),
    Ed25519Session {
        public_key: Pubkey,
        session_key: Pubkey,
        max_session_length: u64,
    },
    Secp256k1 {
        /// Uncompressed key without the 0x04 tag
        public_key: [u8; 64],
    },
    Secp256k1Session {
        public_key: [u8; 64],
        session_key: Pubkey,
        max_session_length: u64,
    },
}

impl AuthorityConfig {
    /// Accepts a compressed (33), raw uncompressed (64) or tagged (65) key.
    pub fn secp256k1(public_key: &[u8]) -> Result<Self> {
        Ok(AuthorityConfig::Secp256k1 {
            public_key: uncompressed_key(public_key)?,
        })
    }

    pub fn secp256k1_session(
        public_key: &[u8],
        session_key: Pubkey,
        max_session_length: u64,
    ) -> Result<Self> {
        Ok(AuthorityConfig::Secp256k1Session {
            public_key: uncompressed_key(public_key)?,
            session_key,
            max_session_length,
        })
    }

    pub fn authority_type(&self) -> AuthorityType {
        match self {
            AuthorityConfig::Ed25519(_) => AuthorityType::Ed25519,
            AuthorityConfig::Ed25519Session { .. } => AuthorityType::Ed25519Session,
            AuthorityConfig::Secp256k1 { .. } => AuthorityType::Secp256k1,
            AuthorityConfig::Secp256k1Session { .. } => AuthorityType::Secp256k1Session,
        }
    }

    /// Creation bytes as the wallet program expects them.
    pub fn create_data(&self) -> Result<Vec<u8>> {
        let data = match self {
            AuthorityConfig::Ed25519(key) => key.to_bytes().to_vec(),
            AuthorityConfig::Ed25519Session {
                public_key,
                session_key,
                max_session_length,
            } => CreateEd25519SessionAuthority::new(
                public_key.to_bytes(),
                session_key.to_bytes(),
                *max_session_length,
            )
            .into_bytes()?,
            AuthorityConfig::Secp256k1 { public_key } => public_key.to_vec(),
            AuthorityConfig::Secp256k1Session {
                public_key,
                session_key,
                max_session_length,
            } => CreateSecp256k1SessionAuthority::new(
                *public_key,
                session_key.to_bytes(),
                *max_session_length,
            )
            .into_bytes()?,
        };
        Ok(data)
    }
}

fn uncompressed_key(bytes: &[u8]) -> Result<[u8; 64]> {
    let compressed = secp256k1::compressed_key_from_slice(bytes)
        .map_err(|e| SdkError::InvalidAuthorityData(e.to_string()))?;
    Ok(secp256k1::decompress(&compressed)?)
}

/// Read-only snapshot of one role, as of the last fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Role id assigned by the wallet program
    pub id: u32,
    /// Wallet account the role lives in
    pub wallet: Pubkey,
    /// Wallet id; seeds the role's sub-account
    pub wallet_id: [u8; 32],
    pub authority: Authority,
    pub actions: Actions,
}

impl Role {
    pub fn permissions(&self) -> Permissions<'_> {
        Permissions::new(&self.actions)
    }

    pub fn authority_type(&self) -> AuthorityType {
        self.authority.authority_type()
    }

    pub fn is_session_based(&self) -> bool {
        self.authority.session_based()
    }

    /// Sub-account address of this role under `program_id`.
    pub fn sub_account(&self, program_id: &Pubkey) -> Pubkey {
        derive_sub_account_pda(program_id, &self.wallet_id, self.id).0
    }

    /// Whether `signer` is the key that signs for this role.
    ///
    /// Secp256k1 roles match on their 20-byte Ethereum address; every other
    /// authority matches on its signer bytes, the session key for session
    /// roles.
    pub fn matches_signer(&self, signer: &[u8]) -> bool {
        match &self.authority {
            Authority::Token(TokenAuthority::Secp256k1(a)) => {
                secp256k1_address(&a.public_key).is_ok_and(|address| address[..] == *signer)
            },
            authority => authority.signer() == signer,
        }
    }
}

/// Parsed wallet account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletInfo {
    pub address: Pubkey,
    pub id: [u8; 32],
    pub bump: u8,
    /// Total roles ever created; the id the next role receives
    pub role_counter: u32,
    pub roles: Vec<Role>,
}
