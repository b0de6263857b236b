use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::error::Error;

use crate::core::config::SdkConfig;
use crate::error::Result as SdkResult;

/// RPC adapter for `url` that reads at the config's commitment.
pub fn rpc_client(url: impl ToString, config: &SdkConfig) -> SdkResult<RpcClient> {
    Ok(RpcClient::new_with_commitment(
        url.to_string(),
        config.commitment_config()?,
    ))
}

/// Read-only view of chain state used to refresh roles and to date signatures.
#[async_trait]
pub trait ChainAccess: Send + Sync {
    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>>;

    /// Current slot, used as the freshness bound of secp256k1 payloads.
    async fn get_slot(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl ChainAccess for RpcClient {
    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>> {
        let response = self
            .get_account_with_commitment(pubkey, self.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_slot(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        Ok(self.get_slot_with_commitment(self.commitment()).await?)
    }
}
