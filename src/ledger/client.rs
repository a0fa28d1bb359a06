//! Ledger node REST client routed through a per-account proxy.
//!
//! # Responsibilities
//! - Submit signed transactions
//! - Read transactions by hash, distinguishing "not indexed yet" from errors
//! - Read ledger info, account sequence numbers and coin balances
//! - Surface status >= 400 as `LedgerError::Api` with the body text

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::NodeConfig;
use crate::ledger::proxy::ProxyDescriptor;
use crate::ledger::types::{
    AccountAddress, AccountInfo, CoinStoreResource, LedgerError, LedgerInfo, LedgerResult,
    Lookup, SubmittedTransaction, TransactionRecord,
};

/// Content type the node expects for BCS-encoded submissions.
pub const SIGNED_TRANSACTION_CONTENT_TYPE: &str = "application/x.aptos.signed_transaction+bcs";

/// Resource path of the native coin store, with `<` and `>` escaped.
const APT_COIN_STORE: &str = "0x1::coin::CoinStore%3C0x1::aptos_coin::AptosCoin%3E";

/// Operations the engine needs from a ledger node.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// POST a signed transaction.
    async fn submit(&self, signed: &[u8]) -> LedgerResult<SubmittedTransaction>;

    /// GET a transaction by hash. 404 is `Lookup::NotFound`, not an error.
    async fn fetch_by_hash(&self, hash: &str) -> LedgerResult<Lookup>;

    async fn ledger_info(&self) -> LedgerResult<LedgerInfo>;

    async fn account(&self, address: AccountAddress) -> LedgerResult<AccountInfo>;

    /// Native coin balance in octas.
    async fn coin_balance(&self, address: AccountAddress) -> LedgerResult<u64>;
}

/// REST client bound to one node and one proxy.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    proxy: ProxyDescriptor,
}

impl NodeClient {
    /// Create a client that sends every request through `proxy`.
    pub fn new(config: &NodeConfig, proxy: &ProxyDescriptor) -> LedgerResult<Self> {
        let route = reqwest::Proxy::all(proxy.as_str())
            .map_err(|_| LedgerError::InvalidProxy(proxy.redacted()))?;

        let http = reqwest::Client::builder()
            .proxy(route)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.rpc_url.trim_end_matches('/').to_string(),
            proxy: proxy.clone(),
        })
    }

    pub fn proxy(&self) -> &ProxyDescriptor {
        &self.proxy
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> LedgerResult<T> {
        let response = self.http.get(self.url(path)).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl NodeTransport for NodeClient {
    async fn submit(&self, signed: &[u8]) -> LedgerResult<SubmittedTransaction> {
        let response = self
            .http
            .post(self.url("/transactions"))
            .header(CONTENT_TYPE, SIGNED_TRANSACTION_CONTENT_TYPE)
            .body(signed.to_vec())
            .send()
            .await?;

        tracing::debug!(status = %response.status(), "Submission answered");
        read_json(response).await
    }

    async fn fetch_by_hash(&self, hash: &str) -> LedgerResult<Lookup> {
        let response = self
            .http
            .get(self.url(&format!("/transactions/by_hash/{}", hash)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Lookup::NotFound);
        }

        let record: TransactionRecord = read_json(response).await?;
        Ok(Lookup::Found(record))
    }

    async fn ledger_info(&self) -> LedgerResult<LedgerInfo> {
        self.get_json("").await
    }

    async fn account(&self, address: AccountAddress) -> LedgerResult<AccountInfo> {
        self.get_json(&format!("/accounts/{}", address)).await
    }

    async fn coin_balance(&self, address: AccountAddress) -> LedgerResult<u64> {
        let resource: CoinStoreResource = self
            .get_json(&format!("/accounts/{}/resource/{}", address, APT_COIN_STORE))
            .await?;
        Ok(resource.data.coin.value)
    }
}

/// Classify the status, then decode a success body.
async fn read_json<T: DeserializeOwned>(response: Response) -> LedgerResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.as_u16() >= 400 {
        return Err(LedgerError::Api {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| LedgerError::Decode(format!("{} (status {}): {}", e, status, body)))
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .finish()
    }
}
