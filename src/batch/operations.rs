//! Payloads the batch can run.

use crate::ledger::transaction::{EntryFunction, TransactionPayload};
use crate::ledger::types::LedgerResult;

/// Token module entry point toggling direct NFT transfers for the sender.
pub const OPT_IN_DIRECT_TRANSFER: &str = "0x3::token::opt_in_direct_transfer";

/// Allow (or refuse) tokens to be sent to the account without a claim step.
pub fn opt_in_direct_transfer(enabled: bool) -> LedgerResult<TransactionPayload> {
    let entry = EntryFunction::new(OPT_IN_DIRECT_TRANSFER)?.arg(&enabled)?;
    Ok(TransactionPayload::EntryFunction(entry))
}
