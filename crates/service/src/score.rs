//! Project freshness: a 0-1 activity score blending GitHub and Twitter
//! signals. GitHub contributes 70%, Twitter 30%. Missing inputs contribute
//! nothing.

const SECONDS_PER_DAY: f64 = 86_400.0;

const GITHUB_DECAY_DAYS: f64 = 30.0;
const TWITTER_DECAY_DAYS: f64 = 7.0;

const STARS_CAP: f64 = 1_000.0;
const FORKS_CAP: f64 = 500.0;
const COMMITS_CAP: f64 = 1_000.0;
const FOLLOWERS_CAP: f64 = 10_000.0;

#[derive(Clone, Default)]
pub struct FreshnessInput {
    pub github_stars: u64,
    pub github_forks: u64,
    pub commit_count: u64,
    pub github_last_update: Option<u64>,
    pub twitter_followers: u64,
    pub twitter_last_update: Option<u64>,
}

fn days_since(now: u64, then: u64) -> f64 {
    now.saturating_sub(then) as f64 / SECONDS_PER_DAY
}

fn capped(count: u64, cap: f64) -> f64 {
    (count as f64 / cap).min(1.0)
}

pub fn project_freshness(input: &FreshnessInput, now: u64) -> f64 {
    let mut freshness = 0.0;

    if let Some(last_update) = input.github_last_update {
        let recency = (1.0 - days_since(now, last_update) / GITHUB_DECAY_DAYS).max(0.0);
        let stars = capped(input.github_stars, STARS_CAP);
        let forks = capped(input.github_forks, FORKS_CAP);
        let commits = capped(input.commit_count, COMMITS_CAP);

        freshness += (recency * 0.4 + stars * 0.2 + forks * 0.2 + commits * 0.2) * 0.7;
    }

    if let Some(last_tweet) = input.twitter_last_update {
        let recency = (1.0 - days_since(now, last_tweet) / TWITTER_DECAY_DAYS).max(0.0);
        let followers = capped(input.twitter_followers, FOLLOWERS_CAP);

        freshness += (recency * 0.7 + followers * 0.3) * 0.3;
    }

    freshness.min(1.0)
}


#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;
    const DAY: u64 = 86_400;

    fn active_input() -> FreshnessInput {
        FreshnessInput {
            github_stars: 500,
            github_forks: 250,
            commit_count: 500,
            github_last_update: Some(NOW),
            twitter_followers: 5_000,
            twitter_last_update: Some(NOW),
        }
    }

    #[test]
    fn score_is_monotonically_non_increasing_with_age() {
        let mut previous = f64::MAX;
        for days in 0..60 {
            let mut input = active_input();
            input.github_last_update = Some(NOW - days * DAY);
            input.twitter_last_update = Some(NOW - days * DAY);
            let score = project_freshness(&input, NOW);
            assert!(
                score <= previous,
                "score rose from {previous} to {score} at {days} days"
            );
            previous = score;
        }
    }

    #[test]
    fn missing_inputs_contribute_zero() {
        assert_eq!(project_freshness(&FreshnessInput::default(), NOW), 0.0);

        // Twitter-only input is capped by the 30% twitter weight.
        let input = FreshnessInput {
            twitter_followers: 1_000_000,
            twitter_last_update: Some(NOW),
            ..FreshnessInput::default()
        };
        let score = project_freshness(&input, NOW);
        assert!(score > 0.0 && score <= 0.3 + 1e-9);
    }

    #[test]
    fn count_metrics_are_capped() {
        let capped_at_limits = FreshnessInput {
            github_stars: 1_000,
            github_forks: 500,
            commit_count: 1_000,
            github_last_update: Some(NOW),
            twitter_followers: 10_000,
            twitter_last_update: Some(NOW),
        };
        let overflowing = FreshnessInput {
            github_stars: 1_000_000,
            github_forks: 1_000_000,
            commit_count: 1_000_000,
            github_last_update: Some(NOW),
            twitter_followers: 1_000_000,
            twitter_last_update: Some(NOW),
        };

        let a = project_freshness(&capped_at_limits, NOW);
        let b = project_freshness(&overflowing, NOW);
        assert!((a - b).abs() < 1e-9);
        assert!(a <= 1.0);
    }

    #[test]
    fn recency_floors_at_zero_past_the_window() {
        let mut input = active_input();
        input.github_last_update = Some(NOW - 31 * DAY);
        input.twitter_last_update = Some(NOW - 8 * DAY);
        let stale = project_freshness(&input, NOW);

        input.github_last_update = Some(NOW - 365 * DAY);
        input.twitter_last_update = Some(NOW - 365 * DAY);
        let ancient = project_freshness(&input, NOW);

        // Once past the decay windows only the count terms remain.
        assert!((stale - ancient).abs() < 1e-9);
        assert!(ancient > 0.0);
    }

    #[test]
    fn future_timestamps_score_as_current() {
        let mut input = active_input();
        let current = project_freshness(&input, NOW);
        input.github_last_update = Some(NOW + DAY);
        input.twitter_last_update = Some(NOW + DAY);
        assert_eq!(project_freshness(&input, NOW), current);
    }
}
