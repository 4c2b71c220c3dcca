use std::time::Duration;
use thiserror::Error;

pub const TARGET_URL_VAR: &str = "ROUSE_TARGET_URL";
pub const SETTLE_DELAY_VAR: &str = "ROUSE_SETTLE_DELAY_SECS";
pub const POST_ACTION_DELAY_VAR: &str = "ROUSE_POST_ACTION_DELAY_SECS";
pub const POLL_INTERVAL_VAR: &str = "ROUSE_POLL_INTERVAL_SECS";
pub const MAX_POLL_ROUNDS_VAR: &str = "ROUSE_MAX_POLL_ROUNDS";

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(15);
const DEFAULT_POST_ACTION_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_POLL_ROUNDS: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{TARGET_URL_VAR} is not set")]
    MissingTargetUrl,

    #[error("Invalid target URL '{url}': {source}")]
    InvalidTargetUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid value '{value}' for {var}")]
    InvalidOverride { var: &'static str, value: String },
}

/// Timing policy and target of one protocol run. Built once before the
/// session is acquired; the controller never reads the environment itself.
#[derive(Debug, Clone)]
pub struct WakeConfig {
    /// Page to wake. Required, validated as a parseable URL.
    pub target_url: String,
    /// Fixed wait after navigation, letting initial page scripts settle.
    pub settle_delay: Duration,
    /// Fixed wait after a trigger fired and again after the refresh,
    /// covering the asynchronous wake request.
    pub post_action_delay: Duration,
    /// Spacing between verification rounds.
    pub poll_interval: Duration,
    /// Number of verification rounds before declaring the outcome
    /// unconfirmed.
    pub max_poll_rounds: u32,
}

impl WakeConfig {
    /// Build a configuration with default timing for the given target.
    pub fn new(target_url: impl Into<String>) -> Result<Self, ConfigError> {
        let target_url = target_url.into();
        validate_target(&target_url)?;
        Ok(Self {
            target_url,
            settle_delay: DEFAULT_SETTLE_DELAY,
            post_action_delay: DEFAULT_POST_ACTION_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_rounds: DEFAULT_MAX_POLL_ROUNDS,
        })
    }

    /// Build a configuration from the environment. The target URL is
    /// required unless an override is supplied (e.g. from a CLI flag);
    /// timing values fall back to defaults.
    pub fn resolve(target_override: Option<String>) -> Result<Self, ConfigError> {
        let target_url = match target_override {
            Some(url) if !url.is_empty() => url,
            _ => non_empty_env(TARGET_URL_VAR).ok_or(ConfigError::MissingTargetUrl)?,
        };

        let mut config = Self::new(target_url)?;
        if let Some(secs) = env_u64(SETTLE_DELAY_VAR)? {
            config.settle_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64(POST_ACTION_DELAY_VAR)? {
            config.post_action_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64(POLL_INTERVAL_VAR)? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(rounds) = env_u64(MAX_POLL_ROUNDS_VAR)? {
            config.max_poll_rounds =
                u32::try_from(rounds).map_err(|_| ConfigError::InvalidOverride {
                    var: MAX_POLL_ROUNDS_VAR,
                    value: rounds.to_string(),
                })?;
        }
        Ok(config)
    }

    /// Equivalent to `resolve(None)`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None)
    }
}

fn validate_target(target_url: &str) -> Result<(), ConfigError> {
    if target_url.is_empty() {
        return Err(ConfigError::MissingTargetUrl);
    }
    url::Url::parse(target_url).map_err(|source| ConfigError::InvalidTargetUrl {
        url: target_url.to_string(),
        source,
    })?;
    Ok(())
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn env_u64(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match non_empty_env(var) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidOverride { var, value: raw }),
    }
}
