pub mod envelope;
pub mod horizon;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("XDR decode error: {0}")]
    Xdr(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Horizon error: {0}")]
    Upstream(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}
