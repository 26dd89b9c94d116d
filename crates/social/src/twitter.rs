//! Twitter/X client. Every outbound call goes through the [`RateGate`]; a 429
//! gets one wait-and-retry before giving up.

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::warn;

use crate::rate::RateGate;
use crate::SocialError;

const API_BASE: &str = "https://api.x.com/2";
const USER_AGENT: &str = "RateZilla-App";
const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(2);
const RATE_LIMIT_WAIT: Duration = Duration::from_secs(5);
const ACTIVE_WINDOW_DAYS: i64 = 90;

#[derive(Clone, Debug)]
pub struct TwitterUserData {
    pub id: String,
    pub username: String,
    pub followers: u64,
    pub tweet_count: u64,
    pub last_update: Option<String>,
    /// Tweeted within the last three months.
    pub is_active: bool,
}

#[derive(Deserialize)]
struct UserResponse {
    data: Option<UserObject>,
}

#[derive(Deserialize)]
struct UserObject {
    id: String,
    username: String,
    created_at: Option<String>,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Deserialize)]
struct PublicMetrics {
    followers_count: u64,
    tweet_count: u64,
}

#[derive(Deserialize)]
struct TweetsResponse {
    data: Option<Vec<Tweet>>,
}

#[derive(Deserialize)]
struct Tweet {
    created_at: Option<String>,
}

pub struct TwitterClient {
    http: Client,
    bearer: Option<String>,
    gate: RateGate,
}

impl TwitterClient {
    pub fn new(bearer: Option<String>) -> Self {
        Self::with_min_delay(bearer, DEFAULT_MIN_DELAY)
    }

    pub fn with_min_delay(bearer: Option<String>, min_delay: Duration) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            bearer,
            gate: RateGate::new(min_delay),
        }
    }

    /// Follower count and most recent tweet for a username (leading `@`
    /// accepted).
    pub async fn user_metrics(&self, username: &str) -> Result<TwitterUserData, SocialError> {
        let username = username.strip_prefix('@').unwrap_or(username);

        let response = self.get_with_retry(&user_lookup_url(username)).await?;
        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| SocialError::Decode(e.to_string()))?;
        let user = user
            .data
            .ok_or_else(|| SocialError::NotFound("User not found".to_string()))?;

        let tweets_response = self.get_with_retry(&tweets_url(&user.id)).await?;
        let tweets: TweetsResponse = tweets_response
            .json()
            .await
            .map_err(|e| SocialError::Decode(e.to_string()))?;

        let last_tweet = tweets
            .data
            .as_ref()
            .and_then(|tweets| tweets.first())
            .and_then(|tweet| tweet.created_at.clone());
        let last_update = last_tweet.clone().or(user.created_at);

        let metrics = user.public_metrics.unwrap_or(PublicMetrics {
            followers_count: 0,
            tweet_count: 0,
        });

        Ok(TwitterUserData {
            id: user.id,
            username: user.username,
            followers: metrics.followers_count,
            tweet_count: metrics.tweet_count,
            is_active: is_recent(last_tweet.as_deref()),
            last_update,
        })
    }

    async fn get_with_retry(&self, url: &str) -> Result<Response, SocialError> {
        self.gate.acquire().await;
        let response = self.send(url).await?;
        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return Self::check(response).await;
        }

        warn!("Twitter rate limit hit, retrying after {RATE_LIMIT_WAIT:?}");
        sleep(RATE_LIMIT_WAIT).await;
        self.gate.acquire().await;
        let response = self.send(url).await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(SocialError::Upstream(
                "Twitter rate limit exceeded".to_string(),
            ));
        }
        Self::check(response).await
    }

    async fn send(&self, url: &str) -> Result<Response, SocialError> {
        let mut request = self.http.get(url);
        if let Some(bearer) = &self.bearer {
            request = request.bearer_auth(bearer);
        }
        request
            .send()
            .await
            .map_err(|e| SocialError::Upstream(e.to_string()))
    }

    async fn check(response: Response) -> Result<Response, SocialError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SocialError::NotFound("User not found".to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Twitter API error ({status}): {body}");
            return Err(SocialError::Upstream(format!("Twitter API error: {status}")));
        }
        Ok(response)
    }
}

fn user_lookup_url(username: &str) -> String {
    format!("{API_BASE}/users/by/username/{username}?user.fields=public_metrics,created_at")
}

fn tweets_url(user_id: &str) -> String {
    format!("{API_BASE}/users/{user_id}/tweets?max_results=5&tweet.fields=created_at")
}

fn is_recent(timestamp: Option<&str>) -> bool {
    let Some(timestamp) = timestamp else {
        return false;
    };
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(date) => date.with_timezone(&Utc) > Utc::now() - ChronoDuration::days(ACTIVE_WINDOW_DAYS),
        Err(_) => false,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SecondsFormat;

    #[test]
    fn both_endpoints_share_one_api_host() {
        assert!(user_lookup_url("kaleonstellar").starts_with(API_BASE));
        assert!(tweets_url("12345").starts_with(API_BASE));
        assert_eq!(
            user_lookup_url("kaleonstellar"),
            "https://api.x.com/2/users/by/username/kaleonstellar?user.fields=public_metrics,created_at"
        );
    }

    #[test]
    fn recent_tweets_mark_the_account_active() {
        let yesterday = (Utc::now() - ChronoDuration::days(1))
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let last_year = (Utc::now() - ChronoDuration::days(365))
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        assert!(is_recent(Some(&yesterday)));
        assert!(!is_recent(Some(&last_year)));
        assert!(!is_recent(None));
        assert!(!is_recent(Some("garbage")));
    }
}
