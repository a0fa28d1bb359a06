//! Transaction building and BCS wire encoding.
//!
//! # Responsibilities
//! - Describe entry-function payloads
//! - Build raw transactions with a randomized gas ceiling
//! - Produce the signing message and the signed wire bytes

use rand::Rng;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::GasConfig;
use crate::ledger::client::NodeTransport;
use crate::ledger::types::{AccountAddress, LedgerError, LedgerResult};

/// Domain separator prepended (hashed) to every signed raw transaction.
const RAW_TRANSACTION_SALT: &[u8] = b"APTOS::RawTransaction";

/// Type tags, declared in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
    pub type_args: Vec<TypeTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: String,
}

/// A call to a public entry function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFunction {
    pub module: ModuleId,
    pub function: String,
    pub ty_args: Vec<TypeTag>,
    /// Each argument BCS-encoded on its own.
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    /// Parse `address::module::function`.
    pub fn new(function_id: &str) -> LedgerResult<Self> {
        let parts: Vec<&str> = function_id.split("::").collect();
        let [address, module, function] = parts.as_slice() else {
            return Err(LedgerError::Signing(format!(
                "function id '{}' must be address::module::function",
                function_id
            )));
        };

        if module.is_empty() || function.is_empty() {
            return Err(LedgerError::Signing(format!(
                "function id '{}' has an empty segment",
                function_id
            )));
        }

        Ok(Self {
            module: ModuleId {
                address: AccountAddress::from_hex(address)?,
                name: module.to_string(),
            },
            function: function.to_string(),
            ty_args: Vec::new(),
            args: Vec::new(),
        })
    }

    pub fn type_arg(mut self, tag: TypeTag) -> Self {
        self.ty_args.push(tag);
        self
    }

    /// Append a call argument.
    pub fn arg<T: Serialize>(mut self, value: &T) -> LedgerResult<Self> {
        let encoded = bcs::to_bytes(value)
            .map_err(|e| LedgerError::Signing(format!("argument encoding failed: {}", e)))?;
        self.args.push(encoded);
        Ok(self)
    }

    pub fn function_id(&self) -> String {
        format!(
            "{}::{}::{}",
            self.module.address, self.module.name, self.function
        )
    }
}

/// Transaction payload. Only entry functions are submitted by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
    EntryFunction(EntryFunction),
}

impl Serialize for TransactionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Variants 0 (script) and 1 (module bundle) are never produced.
            TransactionPayload::EntryFunction(entry) => serializer.serialize_newtype_variant(
                "TransactionPayload",
                2,
                "EntryFunction",
                entry,
            ),
        }
    }
}

impl TransactionPayload {
    pub fn describe(&self) -> String {
        match self {
            TransactionPayload::EntryFunction(entry) => entry.function_id(),
        }
    }
}

/// An unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

impl RawTransaction {
    /// Bytes the sender signs.
    pub fn signing_message(&self) -> LedgerResult<Vec<u8>> {
        let mut message = Sha3_256::digest(RAW_TRANSACTION_SALT).to_vec();
        let encoded = bcs::to_bytes(self)
            .map_err(|e| LedgerError::Signing(format!("raw transaction encoding failed: {}", e)))?;
        message.extend_from_slice(&encoded);
        Ok(message)
    }
}

/// Ed25519 authenticator attached to a raw transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Authenticator {
    pub public_key: [u8; 32],
    pub signature: [u8; 64],
}

impl Serialize for Ed25519Authenticator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // TransactionAuthenticator::Ed25519 is variant 0; keys and signatures
        // are length-prefixed byte strings on the wire.
        struct Body<'a>(&'a Ed25519Authenticator);

        impl Serialize for Body<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut state = serializer.serialize_struct("Ed25519", 2)?;
                state.serialize_field("public_key", &self.0.public_key.to_vec())?;
                state.serialize_field("signature", &self.0.signature.to_vec())?;
                state.end()
            }
        }

        serializer.serialize_newtype_variant("TransactionAuthenticator", 0, "Ed25519", &Body(self))
    }
}

/// A raw transaction plus its authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: Ed25519Authenticator,
}

impl SignedTransaction {
    /// Wire bytes for `POST /transactions`.
    pub fn to_bytes(&self) -> LedgerResult<Vec<u8>> {
        bcs::to_bytes(self)
            .map_err(|e| LedgerError::Signing(format!("signed transaction encoding failed: {}", e)))
    }
}

/// Builds raw transactions against the live node state.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    gas: GasConfig,
}

impl TxBuilder {
    pub fn new(gas: GasConfig) -> Self {
        Self { gas }
    }

    /// Draw a fresh gas ceiling from the configured range.
    pub fn draw_max_gas(&self) -> LedgerResult<u64> {
        if self.gas.min_max_gas > self.gas.max_max_gas {
            return Err(LedgerError::Signing(format!(
                "gas range {}..={} is empty",
                self.gas.min_max_gas, self.gas.max_max_gas
            )));
        }
        Ok(rand::thread_rng().gen_range(self.gas.min_max_gas..=self.gas.max_max_gas))
    }

    /// Build a transaction for `sender`, reading its sequence number and the
    /// chain id from the node.
    pub async fn build<T: NodeTransport + ?Sized>(
        &self,
        transport: &T,
        sender: AccountAddress,
        payload: TransactionPayload,
    ) -> LedgerResult<RawTransaction> {
        let account = transport.account(sender).await?;
        let ledger = transport.ledger_info().await?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        let expiration_timestamp_secs = now
            .as_secs()
            .checked_add(self.gas.expiration_secs)
            .ok_or_else(|| {
                LedgerError::Signing(format!(
                    "expiration of {}s overflows the timestamp",
                    self.gas.expiration_secs
                ))
            })?;

        Ok(RawTransaction {
            sender,
            sequence_number: account.sequence_number,
            payload,
            max_gas_amount: self.draw_max_gas()?,
            gas_unit_price: self.gas.gas_unit_price,
            expiration_timestamp_secs,
            chain_id: ledger.chain_id,
        })
    }
}
