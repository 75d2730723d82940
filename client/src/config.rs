//! Client configuration and its validation

use crate::projection::ArcTrack;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:3000/ws";
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
/// Control units per second while a movement key is held.
pub const DEFAULT_PADDLE_SPEED: f32 = 10.0;
pub const DEFAULT_DISPLAY_RADIUS: f32 = 150.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("server url must start with ws:// or wss://, got {0}")]
    UnsupportedScheme(String),
    #[error("sample interval must be greater than zero")]
    ZeroSampleInterval,
    #[error("display radius must be finite and positive, got {0}")]
    InvalidDisplayRadius(f32),
    #[error("paddle speed must be finite, got {0}")]
    InvalidPaddleSpeed(f32),
    #[error("paddle track needs distinct, finite position bounds")]
    DegenerateTrack,
    #[error("reconnect delays must be non-zero with initial <= max")]
    InvalidReconnect,
}

/// Exponential backoff used by the transport between connection attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl ReconnectPolicy {
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max).max(self.initial)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub sample_interval: Duration,
    pub paddle_speed: f32,
    pub display_radius: f32,
    pub track: ArcTrack,
    pub reconnect: ReconnectPolicy,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(ConfigError::UnsupportedScheme(self.server_url.clone()));
        }
        if self.sample_interval.is_zero() {
            return Err(ConfigError::ZeroSampleInterval);
        }
        if !self.display_radius.is_finite() || self.display_radius <= 0.0 {
            return Err(ConfigError::InvalidDisplayRadius(self.display_radius));
        }
        if !self.paddle_speed.is_finite() {
            return Err(ConfigError::InvalidPaddleSpeed(self.paddle_speed));
        }
        if self.track.is_degenerate() {
            return Err(ConfigError::DegenerateTrack);
        }
        if self.reconnect.initial.is_zero() || self.reconnect.initial > self.reconnect.max {
            return Err(ConfigError::InvalidReconnect);
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            paddle_speed: DEFAULT_PADDLE_SPEED,
            display_radius: DEFAULT_DISPLAY_RADIUS,
            track: ArcTrack::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ClientConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_non_websocket_url() {
        let config = ClientConfig {
            server_url: "http://127.0.0.1:3000/ws".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let zero_interval = ClientConfig {
            sample_interval: Duration::ZERO,
            ..ClientConfig::default()
        };
        assert_eq!(zero_interval.validate(), Err(ConfigError::ZeroSampleInterval));

        let nan_radius = ClientConfig {
            display_radius: f32::NAN,
            ..ClientConfig::default()
        };
        assert!(matches!(
            nan_radius.validate(),
            Err(ConfigError::InvalidDisplayRadius(_))
        ));

        let flat_track = ClientConfig {
            track: ArcTrack {
                min_position: 1.0,
                max_position: 1.0,
                ..ArcTrack::default()
            },
            ..ClientConfig::default()
        };
        assert_eq!(flat_track.validate(), Err(ConfigError::DegenerateTrack));
    }

    #[test]
    fn test_reconnect_backoff_doubles_up_to_max() {
        let policy = ReconnectPolicy::default();
        let mut delay = policy.initial;
        let mut seen = Vec::new();
        for _ in 0..8 {
            delay = policy.next_delay(delay);
            seen.push(delay);
        }
        assert_eq!(seen[0], Duration::from_millis(500));
        assert_eq!(seen[1], Duration::from_secs(1));
        assert_eq!(*seen.last().unwrap(), policy.max);
    }
}
