//! In-process chain hosting one governance contract.
//!
//! Queries share a read lock and run concurrently; execute calls take the
//! write lock, so state changes are serialized and never overlap a query.

use super::{ChainClient, ClientError, ClientResult};
use crate::actions::ExecutionEnvironment;
use crate::contract::{execute_json, query_json};
use crate::governance::{BlockInfo, Governance, GovernanceResult, Receipt};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Seconds per block when advancing the local chain.
pub const BLOCK_TIME_SECS: u64 = 5;

pub struct LocalChain<E> {
    contract: String,
    state: Arc<RwLock<Governance<E>>>,
    block: Arc<RwLock<BlockInfo>>,
}

impl<E> Clone for LocalChain<E> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            state: Arc::clone(&self.state),
            block: Arc::clone(&self.block),
        }
    }
}

impl<E: ExecutionEnvironment> LocalChain<E> {
    pub fn new(contract: impl Into<String>, governance: Governance<E>, block: BlockInfo) -> Self {
        Self {
            contract: contract.into(),
            state: Arc::new(RwLock::new(governance)),
            block: Arc::new(RwLock::new(block)),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub async fn block(&self) -> BlockInfo {
        *self.block.read().await
    }

    /// Move the chain forward by `blocks`.
    pub async fn advance(&self, blocks: u64) -> BlockInfo {
        let mut block = self.block.write().await;
        block.height = block.height.saturating_add(blocks);
        block.time = block
            .time
            .saturating_add(blocks.saturating_mul(BLOCK_TIME_SECS));
        debug!(height = block.height, time = block.time, "chain advanced");
        *block
    }

    /// Run `f` against the engine under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&Governance<E>) -> R) -> R {
        let gov = self.state.read().await;
        f(&gov)
    }

    /// Run `f` against the engine under the write lock.
    pub async fn write<R>(&self, f: impl FnOnce(&mut Governance<E>) -> R) -> R {
        let mut gov = self.state.write().await;
        f(&mut gov)
    }

    fn check_contract(&self, contract: &str) -> ClientResult<()> {
        if contract == self.contract {
            Ok(())
        } else {
            Err(ClientError::UnknownContract(contract.to_string()))
        }
    }
}

impl<E: ExecutionEnvironment + Serialize + DeserializeOwned> LocalChain<E> {
    /// CBOR snapshot of the hosted engine.
    pub async fn snapshot(&self) -> GovernanceResult<Vec<u8>> {
        self.state.read().await.to_bytes()
    }
}

#[async_trait]
impl<E> ChainClient for LocalChain<E>
where
    E: ExecutionEnvironment + Send + Sync,
{
    async fn query_smart(&self, contract: &str, msg: &[u8]) -> ClientResult<Vec<u8>> {
        self.check_contract(contract)?;
        let block = self.block().await;
        let gov = self.state.read().await;
        Ok(query_json(&gov, &block, msg)?)
    }

    async fn execute(&self, sender: &str, contract: &str, msg: &[u8]) -> ClientResult<Receipt> {
        self.check_contract(contract)?;
        let block = self.block().await;
        let mut gov = self.state.write().await;
        Ok(execute_json(&mut gov, &block, sender, msg)?)
    }
}
