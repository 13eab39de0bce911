use crate::error::AppError;
use crate::monitor::MonitorConfig;
use chrono::Duration;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Seconds of continuous presence before an alert may fire.
    pub detection_duration_secs: u64,
    /// Minimum seconds between two alerts.
    pub cooldown_secs: u64,
    /// Seconds of continuous absence before an incident counts as cleared.
    pub clear_period_secs: u64,
    /// A detection counts toward "accident present" only above this confidence.
    pub confidence_threshold: f32,
    /// Frames are downscaled to this square size before inference.
    pub inference_size: u32,
    pub capture_fps: u32,
    pub frame_buffer_size: usize,
    /// Directory the capture source replays frames from.
    pub frame_dir: String,
    pub journal_path: String,
    pub clip_dir: String,
    pub location_link: String,
    pub alert_message: String,
    pub twilio: Option<TwilioConfig>,
    /// Command spawned to play the audible alarm, e.g. ["aplay", "alarm.wav"].
    pub alarm_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            detection_duration_secs: 5,
            cooldown_secs: 300,
            clear_period_secs: 30,
            confidence_threshold: 0.3,
            inference_size: 256,
            capture_fps: 30,
            frame_buffer_size: 60,
            frame_dir: "frames".to_string(),
            journal_path: "accident_log.csv".to_string(),
            clip_dir: "output_frames".to_string(),
            location_link: String::new(),
            alert_message: "Accident detected! Immediate attention required!".to_string(),
            twilio: None,
            alarm_command: None,
        }
    }
}

impl Configuration {
    /// Layers an optional config file under `CRASHWATCH_*` environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("CRASHWATCH").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            min_sustained_presence: Duration::seconds(self.detection_duration_secs as i64),
            alert_cooldown: Duration::seconds(self.cooldown_secs as i64),
            clear_period: Duration::seconds(self.clear_period_secs as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let configuration = Configuration::default();
        assert_eq!(configuration.detection_duration_secs, 5);
        assert_eq!(configuration.cooldown_secs, 300);
        assert_eq!(configuration.clear_period_secs, 30);
        assert_eq!(configuration.confidence_threshold, 0.3);
        assert!(configuration.twilio.is_none());
    }

    #[test]
    fn monitor_config_converts_durations() {
        let monitor_config = Configuration::default().monitor_config();
        assert_eq!(monitor_config.min_sustained_presence, Duration::seconds(5));
        assert_eq!(monitor_config.alert_cooldown, Duration::minutes(5));
        assert_eq!(monitor_config.clear_period, Duration::seconds(30));
    }
}
