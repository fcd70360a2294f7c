use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::geometry::Resolution;
use crate::window::{Key, WindowStyleState};

/// Shortest rotation interval the player honours.
pub const MIN_ROTATION_INTERVAL_SECS: f64 = 0.1;
/// Longest rotation interval accepted from the config file (one day).
pub const MAX_ROTATION_INTERVAL_SECS: f64 = 86_400.0;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub pulse: PulseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Width of the resolution the content was authored at
    #[serde(default = "default_width")]
    pub width: i32,
    /// Height of the resolution the content was authored at
    #[serde(default = "default_height")]
    pub height: i32,
    /// When false the geometry pass is skipped; resolution is still tracked
    #[serde(default = "default_true")]
    pub enable_scaling: bool,
    /// Initial window chrome: "bordered" or "borderless"
    #[serde(default = "default_chrome")]
    pub chrome: WindowStyleState,
    #[serde(default)]
    pub force_fullscreen: bool,
    /// Hide and lock the cursor at startup
    #[serde(default = "default_true")]
    pub lock_cursor: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            enable_scaling: true,
            chrome: default_chrome(),
            force_fullscreen: false,
            lock_cursor: true,
        }
    }
}

impl DisplayConfig {
    pub fn target(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_toggle_key")]
    pub toggle_chrome_key: Key,
    #[serde(default = "default_quit_key")]
    pub quit_key: Key,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            toggle_chrome_key: default_toggle_key(),
            quit_key: default_quit_key(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ticks per second of the main loop
    #[serde(default = "default_frame_rate")]
    pub target_frame_rate: u32,
    #[serde(default = "default_memory_threshold")]
    pub memory_threshold_mb: f64,
    #[serde(default = "default_memory_interval")]
    pub memory_sample_interval_ticks: u64,
    #[serde(default = "default_fps_interval")]
    pub fps_sample_interval_ticks: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_frame_rate: default_frame_rate(),
            memory_threshold_mb: default_memory_threshold(),
            memory_sample_interval_ticks: default_memory_interval(),
            fps_sample_interval_ticks: default_fps_interval(),
        }
    }
}

impl PerformanceConfig {
    /// Duration of one tick at the target frame rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_frame_rate.max(1)))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RotationConfig {
    /// Content objects, cycled in order
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,
    #[serde(default = "default_true")]
    pub auto_start: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            interval_secs: default_interval_secs(),
            auto_start: true,
        }
    }
}

impl RotationConfig {
    /// Interval clamped to the supported range. Values that are not a
    /// number fall back to the default interval.
    pub fn interval(&self) -> Duration {
        let secs = self
            .interval_secs
            .clamp(MIN_ROTATION_INTERVAL_SECS, MAX_ROTATION_INTERVAL_SECS);
        Duration::try_from_secs_f64(secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_interval_secs()))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PulseConfig {
    /// Ping-pong cycles per second
    #[serde(default = "default_pulse_speed")]
    pub speed: f64,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            speed: default_pulse_speed(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
        }
    }
}

/// A problem found while validating a loaded config.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub message: String,
    /// Errors reject the whole file; warnings are only reported.
    pub is_error: bool,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_error { "error" } else { "warning" };
        write!(f, "{}: {}", kind, self.message)
    }
}

impl Config {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let display = &self.display;
        if display.width <= 0 || display.height <= 0 {
            issues.push(ValidationIssue::error(format!(
                "display size must be positive, got {}x{}",
                display.width, display.height
            )));
        }

        if self.performance.target_frame_rate == 0 {
            issues.push(ValidationIssue::error(
                "performance.target_frame_rate must be greater than zero",
            ));
        }

        for (name, value) in [
            ("pulse.speed", self.pulse.speed),
            ("pulse.min_scale", self.pulse.min_scale),
            ("pulse.max_scale", self.pulse.max_scale),
            ("performance.memory_threshold_mb", self.performance.memory_threshold_mb),
        ] {
            if !value.is_finite() {
                issues.push(ValidationIssue::error(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        for (name, key) in [
            ("input.toggle_chrome_key", &self.input.toggle_chrome_key),
            ("input.quit_key", &self.input.quit_key),
        ] {
            if !key.is_supported() {
                issues.push(ValidationIssue::error(format!(
                    "{} \"{}\" is not a key the player can detect",
                    name, key
                )));
            }
        }

        if self.pulse.min_scale > self.pulse.max_scale {
            issues.push(ValidationIssue::error(format!(
                "pulse.min_scale ({}) is larger than pulse.max_scale ({})",
                self.pulse.min_scale, self.pulse.max_scale
            )));
        }

        let rotation = &self.rotation;
        if !rotation.interval_secs.is_finite()
            || rotation.interval_secs > MAX_ROTATION_INTERVAL_SECS
        {
            issues.push(ValidationIssue::error(format!(
                "rotation.interval_secs must be a number of seconds up to {}, got {}",
                MAX_ROTATION_INTERVAL_SECS, rotation.interval_secs
            )));
        } else if rotation.interval_secs < MIN_ROTATION_INTERVAL_SECS {
            issues.push(ValidationIssue::warning(format!(
                "rotation.interval_secs {} is below {}s and will be clamped",
                rotation.interval_secs, MIN_ROTATION_INTERVAL_SECS
            )));
        }
        if rotation.auto_start && rotation.items.len() < 2 {
            issues.push(ValidationIssue::warning(format!(
                "rotation.auto_start needs at least two items, found {}",
                rotation.items.len()
            )));
        }

        issues
    }
}

fn default_true() -> bool {
    true
}

fn default_width() -> i32 {
    1920
}

fn default_height() -> i32 {
    1080
}

fn default_chrome() -> WindowStyleState {
    WindowStyleState::Borderless
}

fn default_toggle_key() -> Key {
    Key::F11
}

fn default_quit_key() -> Key {
    Key::Escape
}

fn default_frame_rate() -> u32 {
    30
}

fn default_memory_threshold() -> f64 {
    150.0
}

fn default_memory_interval() -> u64 {
    600
}

fn default_fps_interval() -> u64 {
    300
}

fn default_interval_secs() -> f64 {
    2.0
}

fn default_pulse_speed() -> f64 {
    2.0
}

fn default_min_scale() -> f64 {
    0.8
}

fn default_max_scale() -> f64 {
    1.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.display.target(), Resolution::new(1920, 1080));
        assert!(config.display.enable_scaling);
        assert_eq!(config.display.chrome, WindowStyleState::Borderless);
        assert_eq!(config.input.toggle_chrome_key, Key::F11);
        assert_eq!(config.input.quit_key, Key::Escape);
        assert_eq!(config.performance.target_frame_rate, 30);
        assert_eq!(config.rotation.interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [display]
            width = 1280
            chrome = "bordered"

            [rotation]
            items = ["welcome", "menu", "promo"]
            interval_secs = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.display.target(), Resolution::new(1280, 1080));
        assert_eq!(config.display.chrome, WindowStyleState::Bordered);
        assert_eq!(config.rotation.items.len(), 3);
        assert_eq!(config.rotation.interval(), Duration::from_secs(5));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_custom_keys() {
        let config: Config = toml::from_str(
            r#"
            [input]
            toggle_chrome_key = "f11"
            quit_key = "Q"
            "#,
        )
        .unwrap();
        assert_eq!(config.input.toggle_chrome_key, Key::F11);
        assert_eq!(config.input.quit_key, Key::Other("Q".to_string()));
        assert!(config.validate().iter().all(|i| !i.is_error));
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [input]
            quit_key = "hyper"
            "#,
        )
        .unwrap();
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| i.is_error && i.message.contains("input.quit_key")));
    }

    #[test]
    fn test_unbounded_interval_is_rejected_without_panicking() {
        for raw in ["inf", "-inf", "nan", "1e300"] {
            let config: Config = toml::from_str(&format!(
                "[rotation]\nitems = [\"a\", \"b\"]\ninterval_secs = {}\n",
                raw
            ))
            .unwrap();

            let issues = config.validate();
            assert!(
                issues
                    .iter()
                    .any(|i| i.is_error && i.message.contains("rotation.interval_secs")),
                "{} was accepted",
                raw
            );
            let interval = config.rotation.interval();
            assert!(interval >= Duration::from_millis(100));
            assert!(interval <= Duration::from_secs(86_400));
        }
    }

    #[test]
    fn test_non_finite_pulse_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [pulse]
            speed = inf
            max_scale = nan
            "#,
        )
        .unwrap();
        let errors: Vec<_> = config
            .validate()
            .into_iter()
            .filter(|i| i.is_error)
            .collect();
        assert!(errors.iter().any(|i| i.message.contains("pulse.speed")));
        assert!(errors.iter().any(|i| i.message.contains("pulse.max_scale")));
    }

    #[test]
    fn test_short_interval_is_clamped_with_warning() {
        let mut config = Config::default();
        config.rotation.items = vec!["a".into(), "b".into()];
        config.rotation.interval_secs = 0.01;

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error);
        assert_eq!(config.rotation.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.rotation.auto_start = false;
        config.display.width = 0;
        config.performance.target_frame_rate = 0;
        config.pulse.min_scale = 2.0;

        let issues = config.validate();
        assert_eq!(issues.iter().filter(|i| i.is_error).count(), 3);
    }

    #[test]
    fn test_auto_start_with_single_item_warns() {
        let mut config = Config::default();
        config.rotation.items = vec!["only".into()];
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("at least two"));
    }

    #[test]
    fn test_frame_interval() {
        let perf = PerformanceConfig {
            target_frame_rate: 50,
            ..PerformanceConfig::default()
        };
        assert_eq!(perf.frame_interval(), Duration::from_millis(20));
    }
}
