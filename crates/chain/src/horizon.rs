//! Read-only Horizon client: account transaction history for the
//! wallet-history view.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::ChainError;

pub const MAINNET: &str = "https://horizon.stellar.org";
pub const TESTNET: &str = "https://horizon-testnet.stellar.org";

#[derive(Clone, Debug, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub created_at: String,
    pub source_account: String,
    pub envelope_xdr: String,
    #[serde(default)]
    pub successful: bool,
}

#[derive(Deserialize)]
struct TransactionsPage {
    #[serde(rename = "_embedded")]
    embedded: EmbeddedRecords,
}

#[derive(Deserialize)]
struct EmbeddedRecords {
    records: Vec<TransactionRecord>,
}

#[derive(Clone)]
pub struct HorizonClient {
    http: Client,
    base_url: String,
}

impl HorizonClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(MAINNET)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET)
    }

    /// Most recent transactions for an account, newest first.
    pub async fn account_transactions(
        &self,
        account: &str,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>, ChainError> {
        let url = format!(
            "{}/accounts/{account}/transactions?limit={limit}&order=desc",
            self.base_url
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ChainError::Upstream(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChainError::NotFound("Account not found".to_string()));
        }
        if !response.status().is_success() {
            return Err(ChainError::Upstream(format!(
                "Horizon returned {}",
                response.status()
            )));
        }

        let page: TransactionsPage = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))?;
        Ok(page.embedded.records)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_horizon_transaction_page() {
        let body = r#"{
            "_embedded": {
                "records": [
                    {
                        "id": "abc123",
                        "created_at": "2024-05-01T12:00:00Z",
                        "source_account": "GSOURCE",
                        "envelope_xdr": "AAAA",
                        "successful": true,
                        "fee_charged": "100"
                    }
                ]
            }
        }"#;

        let page: TransactionsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.embedded.records.len(), 1);
        let record = &page.embedded.records[0];
        assert_eq!(record.id, "abc123");
        assert!(record.successful);
    }

    #[test]
    fn missing_successful_flag_defaults_to_false() {
        let body = r#"{"_embedded":{"records":[{
            "id":"x","created_at":"t","source_account":"g","envelope_xdr":"e"
        }]}}"#;
        let page: TransactionsPage = serde_json::from_str(body).unwrap();
        assert!(!page.embedded.records[0].successful);
    }
}
