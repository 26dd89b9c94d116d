pub mod github;
pub mod rate;
pub mod twitter;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("{0}")]
    NotFound(String),
    #[error("Upstream API error: {0}")]
    Upstream(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}
