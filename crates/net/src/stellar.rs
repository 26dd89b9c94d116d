use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ratezilla_chain::envelope::inspect;
use ratezilla_chain::horizon::{HorizonClient, TransactionRecord, MAINNET, TESTNET};
use ratezilla_database::basic_db::SafeDatabase;

use crate::error::ApiError;
use crate::state::AppState;

const HISTORY_LIMIT: u32 = 100;

#[derive(Deserialize)]
pub struct WalletHistoryQuery {
    pub account: Option<String>,
    pub network: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: String,
    pub created_at: String,
    pub source_account: String,
    pub successful: bool,
    pub has_invoke_host_function: bool,
    pub contract_address: Option<String>,
    pub method_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractActivity {
    pub address: String,
    pub method_name: String,
    pub interactions: u64,
    pub last_interaction: String,
}

#[derive(Serialize)]
pub struct WalletHistoryResponse {
    pub transactions: Vec<WalletTransaction>,
    pub contracts: Vec<ContractActivity>,
}

/// Recent account activity with per-contract invocation totals. Envelopes
/// that fail to decode are reported as plain transactions.
pub async fn wallet_history<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<WalletHistoryQuery>,
) -> Result<Json<WalletHistoryResponse>, ApiError> {
    let account = query
        .account
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Account is required".to_string()))?;

    let base_url = match &state.horizon_override {
        Some(url) => url.clone(),
        None => match query.network.as_deref() {
            Some("testnet") => TESTNET.to_string(),
            _ => MAINNET.to_string(),
        },
    };

    let horizon = HorizonClient::new(base_url);
    let records = horizon.account_transactions(&account, HISTORY_LIMIT).await?;

    Ok(Json(summarize(&records)))
}

/// Walks the records once: each becomes a transaction row, and every decoded
/// contract invocation is aggregated by contract address. Records are newest
/// first, so the first timestamp seen per contract is its latest interaction.
fn summarize(records: &[TransactionRecord]) -> WalletHistoryResponse {
    let mut transactions = Vec::with_capacity(records.len());
    let mut by_contract: HashMap<String, ContractActivity> = HashMap::new();

    for record in records {
        let summary = match inspect(&record.envelope_xdr) {
            Ok(summary) => summary,
            Err(e) => {
                debug!("Skipping undecodable envelope {}: {e}", record.id);
                Default::default()
            }
        };

        let invocation = summary.invocation;
        let (contract_address, method_name) = match &invocation {
            Some(inv) => (inv.contract_address.clone(), Some(inv.method.clone())),
            None => (None, None),
        };

        if let Some(inv) = invocation {
            if let Some(address) = inv.contract_address {
                let entry = by_contract
                    .entry(address.clone())
                    .or_insert_with(|| ContractActivity {
                        address,
                        method_name: inv.method,
                        interactions: 0,
                        last_interaction: record.created_at.clone(),
                    });
                entry.interactions += 1;
            }
        }

        transactions.push(WalletTransaction {
            id: record.id.clone(),
            created_at: record.created_at.clone(),
            source_account: record.source_account.clone(),
            successful: record.successful,
            has_invoke_host_function: summary.has_invoke_host_function,
            contract_address,
            method_name,
        });
    }

    let mut contracts: Vec<ContractActivity> = by_contract.into_values().collect();
    contracts.sort_by(|a, b| b.interactions.cmp(&a.interactions));

    WalletHistoryResponse {
        transactions,
        contracts,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{
        Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Limits, Memo, MuxedAccount,
        Operation, OperationBody, Preconditions, ScAddress, ScSymbol, SequenceNumber, Transaction,
        TransactionEnvelope, TransactionExt, TransactionV1Envelope, Uint256, WriteXdr,
    };

    fn invoke_envelope(contract: [u8; 32], method: &str) -> String {
        let op = Operation {
            source_account: None,
            body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
                host_function: HostFunction::InvokeContract(InvokeContractArgs {
                    contract_address: ScAddress::Contract(Hash(contract)),
                    function_name: ScSymbol(method.try_into().unwrap()),
                    args: Default::default(),
                }),
                auth: Default::default(),
            }),
        };
        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: Transaction {
                source_account: MuxedAccount::Ed25519(Uint256([0; 32])),
                fee: 100,
                seq_num: SequenceNumber(1),
                cond: Preconditions::None,
                memo: Memo::None,
                operations: vec![op].try_into().unwrap(),
                ext: TransactionExt::V0,
            },
            signatures: Default::default(),
        });
        envelope.to_xdr_base64(Limits::none()).unwrap()
    }

    fn record(id: &str, created_at: &str, envelope_xdr: String) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            created_at: created_at.to_string(),
            source_account: "GSOURCE".to_string(),
            envelope_xdr,
            successful: true,
        }
    }

    #[test]
    fn aggregates_invocations_by_contract() {
        let records = vec![
            record("1", "2024-05-03T00:00:00Z", invoke_envelope([7; 32], "swap")),
            record("2", "2024-05-02T00:00:00Z", invoke_envelope([7; 32], "swap")),
            record("3", "2024-05-01T00:00:00Z", invoke_envelope([9; 32], "deposit")),
        ];

        let response = summarize(&records);
        assert_eq!(response.transactions.len(), 3);
        assert!(response.transactions[0].has_invoke_host_function);
        assert_eq!(
            response.transactions[0].method_name.as_deref(),
            Some("swap")
        );

        assert_eq!(response.contracts.len(), 2);
        // Busiest contract first.
        assert_eq!(response.contracts[0].address, hex::encode([7u8; 32]));
        assert_eq!(response.contracts[0].interactions, 2);
        // Newest-first input, so the first record seen sets the timestamp.
        assert_eq!(response.contracts[0].last_interaction, "2024-05-03T00:00:00Z");
        assert_eq!(response.contracts[1].interactions, 1);
    }

    #[test]
    fn undecodable_envelopes_become_plain_transactions() {
        let records = vec![record("1", "2024-05-01T00:00:00Z", "garbage".to_string())];

        let response = summarize(&records);
        assert_eq!(response.transactions.len(), 1);
        assert!(!response.transactions[0].has_invoke_host_function);
        assert!(response.transactions[0].contract_address.is_none());
        assert!(response.contracts.is_empty());
    }
}
