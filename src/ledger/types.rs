//! Ledger node types and error definitions.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Record type the node reports for a transaction still in the mempool.
pub const PENDING_TRANSACTION_TYPE: &str = "pending_transaction";

/// Errors that can occur while talking to the ledger node.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Connection-level failure reaching the node through the proxy.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a status >= 400.
    #[error("ApiError: {body}, Status Code: {status}")]
    Api { status: u16, body: String },

    /// Polling ceiling reached without a terminal state.
    #[error("Transaction {hash} timed out after {attempts} polls")]
    PollTimeout { hash: String, attempts: u32 },

    /// The transaction was committed but did not execute successfully.
    #[error("{vm_status} - {hash}")]
    ExecutionFailure { hash: String, vm_status: String },

    /// A success response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request signing or encoding failed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Private key or address could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Proxy URI could not be used.
    #[error("Invalid proxy '{0}'")]
    InvalidProxy(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error body returned by the node for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl LedgerError {
    /// Human-readable summary for logs.
    ///
    /// API bodies are usually JSON with a `message` field; anything else is
    /// reported verbatim. Never used for control flow.
    pub fn describe(&self) -> String {
        match self {
            LedgerError::Api { body, .. } => extract_message(body),
            other => extract_message(&other.to_string()),
        }
    }

    /// True when the node reports that the requested resource does not exist.
    pub fn is_resource_not_found(&self) -> bool {
        match self {
            LedgerError::Api { status: 404, body } => {
                match serde_json::from_str::<ApiErrorBody>(body) {
                    Ok(parsed) => {
                        parsed.error_code.as_deref() == Some("resource_not_found")
                            || parsed.message.contains("Resource not found")
                    }
                    Err(_) => false,
                }
            }
            _ => false,
        }
    }
}

/// Pull the `message` field out of a JSON-encoded error, else return it raw.
pub fn extract_message(raw: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(raw) {
        Ok(body) => body.message,
        Err(_) => raw.to_string(),
    }
}

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountAddress(pub [u8; 32]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    /// Address of the framework's `0x1` account.
    pub const ONE: Self = Self::from_short(1);

    /// Address of the token module's `0x3` account.
    pub const THREE: Self = Self::from_short(3);

    const fn from_short(value: u8) -> Self {
        let mut bytes = [0u8; 32];
        bytes[31] = value;
        Self(bytes)
    }

    /// Parse from hex, with or without `0x`. Short forms are left-padded.
    pub fn from_hex(value: &str) -> LedgerResult<Self> {
        let digits = value.strip_prefix("0x").unwrap_or(value);
        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            return Err(LedgerError::InvalidKey(format!(
                "address '{}' has invalid length",
                value
            )));
        }

        let padded = format!("{:0>64}", digits);
        let decoded = hex::decode(&padded)
            .map_err(|e| LedgerError::InvalidKey(format!("address '{}': {}", value, e)))?;

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountAddress {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self.to_hex_literal())
    }
}

impl serde::Serialize for AccountAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Fixed-size: no length prefix in BCS.
        serde::Serialize::serialize(&self.0, serializer)
    }
}

/// Response to a successful submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedTransaction {
    pub hash: String,
}

/// A transaction as reported by `GET /transactions/by_hash/{hash}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl TransactionRecord {
    pub fn is_pending(&self) -> bool {
        self.kind.as_deref() == Some(PENDING_TRANSACTION_TYPE)
    }

    /// Diagnostic text for failures.
    pub fn diagnostic(&self) -> String {
        self.vm_status
            .clone()
            .unwrap_or_else(|| "no vm_status reported".to_string())
    }
}

/// Outcome of a by-hash read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The node has not indexed the transaction yet.
    NotFound,
    Found(TransactionRecord),
}

/// Subset of `GET /` the request builder needs.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
}

/// Subset of `GET /accounts/{address}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    #[serde(deserialize_with = "u64_from_string")]
    pub sequence_number: u64,
}

/// `0x1::coin::CoinStore<AptosCoin>` resource.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CoinStoreResource {
    pub data: CoinStoreData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CoinStoreData {
    pub coin: CoinValue,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CoinValue {
    #[serde(deserialize_with = "u64_from_string")]
    pub value: u64,
}

/// The node encodes u64 values as JSON strings.
fn u64_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Octas per APT.
pub const OCTAS_PER_APT: u64 = 100_000_000;

/// Render an octa amount as a decimal APT string.
pub fn format_apt(octas: u64) -> String {
    let whole = octas / OCTAS_PER_APT;
    let fraction = octas % OCTAS_PER_APT;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:08}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
