use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub db_path: String,
    pub github_token: Option<String>,
    pub twitter_bearer: Option<String>,
    /// Overrides the Horizon base URL picked by the `network` query parameter.
    pub horizon_url: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RATEZILLA_PORT", "8080"),
            db_path: try_load("RATEZILLA_DB_PATH", "./ratezilla-data"),
            github_token: secret("GITHUB_TOKEN"),
            twitter_bearer: secret("TWITTER_BEARER_TOKEN"),
            horizon_url: env::var("RATEZILLA_HORIZON_URL").ok(),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn secret(key: &str) -> Option<String> {
    let value = env::var(key).ok().filter(|v| !v.is_empty());
    if value.is_none() {
        warn!("{key} not set, upstream requests will be unauthenticated");
    }
    value
}
