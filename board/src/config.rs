use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::app::PollIntervals;
use crate::error::ConfigError;
use crate::render::TimeMode;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Base URL of the feed backend, without a trailing slash
    pub api_url: String,
    /// Poll interval while the backend is scanning
    pub fast_poll: Duration,
    pub slow_poll: Duration,
    /// Delay before the full re-fetch that follows a single-feed refresh
    pub refetch_delay: Duration,
    /// Next-scan changes within this window keep the running countdown
    pub countdown_tolerance: Duration,
    /// Upper bound for each feed API request; a scheduled poll still pending
    /// after this long no longer holds up the next one
    pub request_timeout: Duration,
    pub time_mode: TimeMode,
    /// Where downloaded CSV files are written
    pub download_dir: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let intervals = PollIntervals::default();
        Self {
            api_url: "http://localhost:5000".to_string(),
            fast_poll: intervals.fast,
            slow_poll: intervals.slow,
            refetch_delay: Duration::from_secs(1),
            countdown_tolerance: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            time_mode: TimeMode::Relative,
            download_dir: PathBuf::from("."),
        }
    }
}

impl BoardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or blank variables keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_url: get("FEEDBOARD_API_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            fast_poll: parse_millis("FEEDBOARD_FAST_POLL_MS", get("FEEDBOARD_FAST_POLL_MS"))?
                .unwrap_or(defaults.fast_poll),
            slow_poll: parse_millis("FEEDBOARD_SLOW_POLL_MS", get("FEEDBOARD_SLOW_POLL_MS"))?
                .unwrap_or(defaults.slow_poll),
            refetch_delay: parse_millis(
                "FEEDBOARD_REFETCH_DELAY_MS",
                get("FEEDBOARD_REFETCH_DELAY_MS"),
            )?
            .unwrap_or(defaults.refetch_delay),
            countdown_tolerance: parse_secs(
                "FEEDBOARD_COUNTDOWN_TOLERANCE_SECS",
                get("FEEDBOARD_COUNTDOWN_TOLERANCE_SECS"),
            )?
            .unwrap_or(defaults.countdown_tolerance),
            request_timeout: parse_millis(
                "FEEDBOARD_REQUEST_TIMEOUT_MS",
                get("FEEDBOARD_REQUEST_TIMEOUT_MS"),
            )?
            .unwrap_or(defaults.request_timeout),
            time_mode: match get("FEEDBOARD_TIME_MODE") {
                Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                    var: "FEEDBOARD_TIME_MODE",
                    value,
                    reason,
                })?,
                None => defaults.time_mode,
            },
            download_dir: get("FEEDBOARD_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
        })
    }

    pub fn poll_intervals(&self) -> PollIntervals {
        PollIntervals {
            fast: self.fast_poll,
            slow: self.slow_poll,
        }
    }
}

fn parse_u64(var: &'static str, value: String, unit: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
        var,
        value,
        reason: format!("expected a whole number of {}", unit),
    })
}

fn parse_millis(var: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|v| {
            let millis = parse_u64(var, v.clone(), "milliseconds")?;
            if millis == 0 {
                return Err(ConfigError::Invalid {
                    var,
                    value: v,
                    reason: "must be greater than zero".to_string(),
                });
            }
            Ok(Duration::from_millis(millis))
        })
        .transpose()
}

fn parse_secs(var: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|v| parse_u64(var, v, "seconds").map(Duration::from_secs))
        .transpose()
}
