pub mod category;
pub mod config;
pub mod contract;
pub mod error;
pub mod github;
pub mod metrics;
pub mod project;
pub mod router;
pub mod server;
pub mod state;
pub mod stellar;
pub mod twitter;
pub mod upload;
pub mod vote;
