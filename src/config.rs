use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STATS_BASE_URL: &str = "https://stats.nba.com/stats";
pub const DEFAULT_SHOT_SEASON: &str = "2023-24";
pub const DEFAULT_PLAYER: &str = "Stephen Curry";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DELAY_MS: u64 = 600;

#[derive(Debug, Clone)]
pub struct Config {
    pub stats_base_url: String,
    pub shot_season: String,
    pub default_player: String,
    pub request_timeout: Duration,
    /// Pause before every uncached remote call.
    pub request_delay: Duration,
    /// `None` keeps memoized results for the whole session.
    pub cache_ttl: Option<Duration>,
    pub roster_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            shot_season: DEFAULT_SHOT_SEASON.to_string(),
            default_player: DEFAULT_PLAYER.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            cache_ttl: None,
            roster_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout_secs = lookup("NBA_REQUEST_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let delay_ms = lookup("NBA_REQUEST_DELAY_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_DELAY_MS)
            .min(10_000);
        let cache_ttl = lookup("NBA_CACHE_TTL_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let roster_file = lookup("NBA_ROSTER_FILE")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .map(PathBuf::from);

        Self {
            stats_base_url: text("NBA_STATS_BASE_URL", DEFAULT_STATS_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            shot_season: text("NBA_SHOT_SEASON", DEFAULT_SHOT_SEASON),
            default_player: text("NBA_DEFAULT_PLAYER", DEFAULT_PLAYER),
            request_timeout: Duration::from_secs(timeout_secs),
            request_delay: Duration::from_millis(delay_ms),
            cache_ttl,
            roster_file,
        }
    }
}
