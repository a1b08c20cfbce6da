use log::info;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const APP_VERSION: &str = "v0.1.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("configuration field {field} must be {requirement} (got {got})")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        got: String,
    },
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Smoothing factor for the exponential moving average, in (0, 1].
    /// Lower = slower, steadier baseline; also a longer warm-up.
    pub alpha: f32,

    /// Sample rate in Hz requested from the input device.
    pub sample_rate: u32,

    /// Seconds of audio in each analyzed block.
    pub sample_duration: f32,

    /// Loud-noise trigger: rms > ema * threshold. Must be > 1.
    /// Higher = only sounds far above ambient volume trigger.
    pub threshold: f32,

    /// Absolute rms floor for a trigger, so a silent room's noise floor
    /// cannot inflate the relative test into constant detections.
    pub min_trigger_rms: f32,

    /// Minimum time between delivered notifications.
    pub min_notification_interval_seconds: f32,

    /// Message for an isolated loud-noise alert.
    pub tts_message: String,

    /// Number of notifications inside the window that escalates to a burst
    /// alert, counting the current one.
    pub burst_alert_count: usize,

    /// Trailing window in seconds considered for burst escalation.
    pub burst_alert_window: f32,

    /// Message used when an alert is escalated.
    pub burst_alert_message: String,

    /// Number of rms/ema points kept for the chart.
    pub graph_history_length: usize,

    /// Max entries kept in the event log.
    pub event_log_limit: usize,

    /// Chart Y axis limit.
    pub graph_ylimit: f32,

    /// Optional external command handed each alert message as its single
    /// argument (e.g. a TTS binary). Unset = alerts only go to the log.
    pub notify_command: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            sample_rate: 44_100,
            sample_duration: 0.5,
            threshold: 4.0,
            min_trigger_rms: 0.01,
            min_notification_interval_seconds: 10.0,
            tts_message: "Loud noise detected".to_string(),
            burst_alert_count: 3,
            burst_alert_window: 60.0,
            burst_alert_message: "Multiple loud noises detected".to_string(),
            graph_history_length: 100,
            event_log_limit: 10,
            graph_ylimit: 0.1,
            notify_command: None,
        }
    }
}

impl MonitorConfig {
    /// Load settings from a JSON file, falling back to defaults when the file
    /// does not exist. Out-of-range values abort startup before any audio
    /// resource is acquired.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let config: Self = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            info!("No settings file at {}, using defaults", path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn out_of_range(
            field: &'static str,
            requirement: &'static str,
            got: impl ToString,
        ) -> ConfigError {
            ConfigError::OutOfRange {
                field,
                requirement,
                got: got.to_string(),
            }
        }

        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(out_of_range("alpha", "in (0, 1]", self.alpha));
        }
        if self.sample_rate == 0 {
            return Err(out_of_range("sample_rate", "> 0", self.sample_rate));
        }
        if !(self.sample_duration > 0.0) {
            return Err(out_of_range("sample_duration", "> 0", self.sample_duration));
        }
        if self.block_len() == 0 {
            return Err(out_of_range(
                "sample_duration",
                "long enough for at least one sample per block",
                self.sample_duration,
            ));
        }
        if !(self.threshold > 1.0) {
            return Err(out_of_range("threshold", "> 1", self.threshold));
        }
        if !(self.min_trigger_rms >= 0.0) {
            return Err(out_of_range("min_trigger_rms", ">= 0", self.min_trigger_rms));
        }
        if !(self.min_notification_interval_seconds >= 0.0) {
            return Err(out_of_range(
                "min_notification_interval_seconds",
                ">= 0",
                self.min_notification_interval_seconds,
            ));
        }
        if self.burst_alert_count == 0 {
            return Err(out_of_range("burst_alert_count", ">= 1", self.burst_alert_count));
        }
        if !(self.burst_alert_window >= 0.0) {
            return Err(out_of_range(
                "burst_alert_window",
                ">= 0",
                self.burst_alert_window,
            ));
        }
        if self.graph_history_length == 0 {
            return Err(out_of_range(
                "graph_history_length",
                ">= 1",
                self.graph_history_length,
            ));
        }
        if self.event_log_limit == 0 {
            return Err(out_of_range("event_log_limit", ">= 1", self.event_log_limit));
        }
        if !(self.graph_ylimit > 0.0) {
            return Err(out_of_range("graph_ylimit", "> 0", self.graph_ylimit));
        }

        Ok(())
    }

    /// Samples per analyzed block.
    pub fn block_len(&self) -> usize {
        (self.sample_rate as f32 * self.sample_duration) as usize
    }

    pub fn min_notification_interval(&self) -> Duration {
        Duration::from_secs_f32(self.min_notification_interval_seconds)
    }

    pub fn burst_window(&self) -> Duration {
        Duration::from_secs_f32(self.burst_alert_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MonitorConfig::default().validate().is_ok());
    }

    #[test]
    fn alpha_outside_unit_interval_is_rejected() {
        let mut config = MonitorConfig::default();
        config.alpha = 0.0;
        assert!(config.validate().is_err());
        config.alpha = 1.5;
        assert!(config.validate().is_err());
        config.alpha = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn threshold_at_or_below_one_is_rejected() {
        let mut config = MonitorConfig::default();
        config.threshold = 1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn partial_settings_file_overrides_only_named_fields() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"alpha": 0.03, "burst_alert_count": 5}"#).unwrap();
        assert_eq!(config.alpha, 0.03);
        assert_eq!(config.burst_alert_count, 5);
        assert_eq!(config.threshold, MonitorConfig::default().threshold);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = MonitorConfig::load("definitely-not-here.json").unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn block_len_follows_rate_and_duration() {
        let config = MonitorConfig::default();
        assert_eq!(config.block_len(), 22_050);
    }
}
