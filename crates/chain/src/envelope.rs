//! Transaction envelope inspection for the wallet-history view. Decoding is
//! delegated to the `stellar-xdr` crate; this module only walks the decoded
//! object model to find invoke-host-function operations and the first invoked
//! contract.

use stellar_xdr::curr::{
    FeeBumpTransactionInnerTx, HostFunction, Limits, Operation, OperationBody, ReadXdr,
    ScAddress, TransactionEnvelope,
};

use crate::ChainError;

#[derive(Clone, Debug, PartialEq)]
pub struct ContractInvocation {
    /// Contract id as lowercase hex.
    pub contract_address: Option<String>,
    pub method: String,
}

#[derive(Clone, Debug, Default)]
pub struct EnvelopeSummary {
    pub has_invoke_host_function: bool,
    /// First contract invocation found, when any operation invokes one.
    pub invocation: Option<ContractInvocation>,
}

/// Decodes a base64 envelope and reports its contract-invocation content.
/// Handles the plain, v0, and fee-bump outer types; a fee-bump wrapping
/// anything but a v1 transaction carries no operations to inspect.
pub fn inspect(envelope_xdr: &str) -> Result<EnvelopeSummary, ChainError> {
    let envelope = TransactionEnvelope::from_xdr_base64(envelope_xdr, Limits::none())
        .map_err(|e| ChainError::Xdr(e.to_string()))?;

    let mut summary = EnvelopeSummary::default();
    for op in operations(&envelope) {
        let OperationBody::InvokeHostFunction(invoke) = &op.body else {
            continue;
        };
        summary.has_invoke_host_function = true;

        if summary.invocation.is_none() {
            if let HostFunction::InvokeContract(args) = &invoke.host_function {
                let contract_address = match &args.contract_address {
                    ScAddress::Contract(hash) => Some(hex::encode(hash.0)),
                    ScAddress::Account(_) => None,
                };
                summary.invocation = Some(ContractInvocation {
                    contract_address,
                    method: args.function_name.to_utf8_string_lossy(),
                });
            }
        }
    }

    Ok(summary)
}

fn operations(envelope: &TransactionEnvelope) -> &[Operation] {
    match envelope {
        TransactionEnvelope::TxV0(e) => e.tx.operations.as_slice(),
        TransactionEnvelope::Tx(e) => e.tx.operations.as_slice(),
        TransactionEnvelope::TxFeeBump(e) => match &e.tx.inner_tx {
            FeeBumpTransactionInnerTx::Tx(inner) => inner.tx.operations.as_slice(),
        },
    }
}
