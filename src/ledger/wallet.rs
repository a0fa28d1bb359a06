//! Account keys and transaction signing.
//!
//! # Security
//! - Private keys come only from the wallets file
//! - Keys are never logged or serialized

use ed25519_dalek::{Signer as _, SigningKey};
use sha3::{Digest, Sha3_256};

use crate::ledger::transaction::{Ed25519Authenticator, RawTransaction, SignedTransaction};
use crate::ledger::types::{AccountAddress, LedgerError, LedgerResult};

/// Authentication-key scheme byte for single Ed25519 keys.
const ED25519_SCHEME: u8 = 0x00;

/// Capability to sign transactions on behalf of one account.
pub trait Signer {
    /// Address the signer authorizes for. Doubles as the retry identity.
    fn address(&self) -> AccountAddress;

    fn sign(&self, raw: RawTransaction) -> LedgerResult<SignedTransaction>;
}

/// An account backed by an in-memory Ed25519 key.
pub struct LocalAccount {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl LocalAccount {
    /// Create an account from a hex-encoded private key.
    ///
    /// # Arguments
    /// * `private_key_hex` - 64 hex characters, with or without `0x`
    pub fn from_private_key(private_key_hex: &str) -> LedgerResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let bytes = hex::decode(key_hex)
            .map_err(|e| LedgerError::InvalidKey(format!("Invalid private key format: {}", e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            LedgerError::InvalidKey(format!(
                "Invalid private key format: expected 32 bytes, got {}",
                v.len()
            ))
        })?;

        let signing_key = SigningKey::from_bytes(&bytes);
        let address = derive_address(&signing_key.verifying_key().to_bytes());

        tracing::debug!(address = %address, "Account loaded");

        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl Signer for LocalAccount {
    fn address(&self) -> AccountAddress {
        self.address
    }

    fn sign(&self, raw: RawTransaction) -> LedgerResult<SignedTransaction> {
        let message = raw.signing_message()?;
        let signature = self.signing_key.sign(&message);

        Ok(SignedTransaction {
            raw_txn: raw,
            authenticator: Ed25519Authenticator {
                public_key: self.public_key(),
                signature: signature.to_bytes(),
            },
        })
    }
}

impl std::fmt::Debug for LocalAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAccount")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Address of a fresh single-key account: SHA3-256(public key || scheme).
pub fn derive_address(public_key: &[u8; 32]) -> AccountAddress {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key);
    hasher.update([ED25519_SCHEME]);
    AccountAddress(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::{EntryFunction, TransactionPayload};
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    const TEST_PRIVATE_KEY: &str =
        "9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

    fn raw_for(sender: AccountAddress) -> RawTransaction {
        let entry = EntryFunction::new("0x3::token::opt_in_direct_transfer")
            .unwrap()
            .arg(&true)
            .unwrap();
        RawTransaction {
            sender,
            sequence_number: 0,
            payload: TransactionPayload::EntryFunction(entry),
            max_gas_amount: 900,
            gas_unit_price: 100,
            expiration_timestamp_secs: 1_700_000_000,
            chain_id: 1,
        }
    }

    #[test]
    fn test_account_from_private_key() {
        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let prefixed = LocalAccount::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(account.address(), prefixed.address());
        assert_eq!(account.address(), derive_address(&account.public_key()));
    }

    #[test]
    fn test_invalid_private_key() {
        let result = LocalAccount::from_private_key("invalid_key");
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));

        let result = LocalAccount::from_private_key("abcd");
        assert!(result.unwrap_err().to_string().contains("expected 32 bytes"));
    }

    #[test]
    fn test_signature_verifies() {
        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let raw = raw_for(account.address());
        let message = raw.signing_message().unwrap();

        let signed = account.sign(raw).unwrap();
        let key = VerifyingKey::from_bytes(&signed.authenticator.public_key).unwrap();
        let signature = Signature::from_bytes(&signed.authenticator.signature);
        assert!(key.verify(&message, &signature).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let account = LocalAccount::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let rendered = format!("{:?}", account);
        assert!(!rendered.contains(TEST_PRIVATE_KEY));
        assert!(rendered.contains("address"));
    }
}
