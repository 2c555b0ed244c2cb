use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::core::frame_pipeline::PipelineSettings;
use crate::core::navigation::{NavigationSettings, DEFAULT_LOOK_SENSITIVITY, DEFAULT_MOVE_SPEED};
use crate::scenes::SCENE_NAMES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown scene `{0}` (expected one of: {names})", names = SCENE_NAMES.join(", "))]
    UnknownScene(String),

    #[error("{0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PresentModeSetting {
    Fifo,
    Mailbox,
    Immediate,
    AutoVsync,
    AutoNoVsync,
}

impl From<PresentModeSetting> for wgpu::PresentMode {
    fn from(mode: PresentModeSetting) -> Self {
        match mode {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

/// Viewer settings: command line over config file over defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub scene: String,
    pub width: u32,
    pub height: u32,
    pub move_speed: f32,
    pub look_sensitivity: f32,
    pub present_mode: PresentModeSetting,
    pub stats_interval_secs: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scene: "showcase".to_string(),
            width: 800,
            height: 600,
            move_speed: DEFAULT_MOVE_SPEED,
            look_sensitivity: DEFAULT_LOOK_SENSITIVITY,
            present_mode: PresentModeSetting::AutoVsync,
            stats_interval_secs: 2.0,
        }
    }
}

impl ViewerConfig {
    /// Defaults, then the `--config` file if given, then the flags
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        let config = base.with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(scene) = &cli.scene {
            self.scene = scene.clone();
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(speed) = cli.speed {
            self.move_speed = speed;
        }
        if let Some(sensitivity) = cli.sensitivity {
            self.look_sensitivity = sensitivity;
        }
        if let Some(mode) = cli.present_mode {
            self.present_mode = mode;
        }
        if let Some(interval) = cli.stats_interval {
            self.stats_interval_secs = interval;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SCENE_NAMES.contains(&self.scene.as_str()) {
            return Err(ConfigError::UnknownScene(self.scene.clone()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero"));
        }
        if !self.move_speed.is_finite() || self.move_speed < 0.0 {
            return Err(ConfigError::Invalid("move speed must be finite and non-negative"));
        }
        if !self.look_sensitivity.is_finite() || self.look_sensitivity <= 0.0 {
            return Err(ConfigError::Invalid("look sensitivity must be positive"));
        }
        if !self.stats_interval_secs.is_finite() || self.stats_interval_secs < 0.0 {
            return Err(ConfigError::Invalid("stats interval must be non-negative"));
        }
        Ok(())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            navigation: NavigationSettings {
                move_speed: self.move_speed,
                look_sensitivity: self.look_sensitivity,
            },
            stats_interval: Duration::from_secs_f32(self.stats_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.move_speed, 0.25);
        assert_eq!(config.look_sensitivity, 250.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(r#"{ "scene": "single-sphere", "width": 320 }"#).unwrap();

        assert_eq!(config.scene, "single-sphere");
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 600);
        assert_eq!(config.present_mode, PresentModeSetting::AutoVsync);
    }

    #[test]
    fn test_unknown_scene_message_lists_presets() {
        let message = ConfigError::UnknownScene("fractal".into()).to_string();

        assert!(message.starts_with("unknown scene `fractal`"));
        for name in SCENE_NAMES {
            assert!(message.contains(name), "{}", message);
        }
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "fov": 90 }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = ViewerConfig::from_json(r#"{ "move_speed": 1.0, "height": 200 }"#).unwrap();
        let cli = Cli {
            speed: Some(0.5),
            present_mode: Some(PresentModeSetting::Immediate),
            ..Default::default()
        };

        let config = file.with_cli(&cli);
        assert_eq!(config.move_speed, 0.5);
        assert_eq!(config.height, 200);
        assert_eq!(config.present_mode, PresentModeSetting::Immediate);
    }

    #[test]
    fn test_validation_errors() {
        let config = ViewerConfig {
            scene: "fractal".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::UnknownScene(_))));

        let config = ViewerConfig {
            look_sensitivity: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ViewerConfig {
            width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/ray-viewer.json")),
            ..Default::default()
        };
        assert!(matches!(ViewerConfig::resolve(&cli), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_pipeline_settings() {
        let config = ViewerConfig {
            move_speed: 0.1,
            stats_interval_secs: 0.0,
            ..Default::default()
        };
        let settings = config.pipeline_settings();
        assert_eq!(settings.navigation.move_speed, 0.1);
        assert!(settings.stats_interval.is_zero());
    }

    #[test]
    fn test_present_mode_json_names() {
        let config = ViewerConfig::from_json(r#"{ "present_mode": "auto-no-vsync" }"#).unwrap();
        assert_eq!(config.present_mode, PresentModeSetting::AutoNoVsync);
        assert_eq!(wgpu::PresentMode::from(config.present_mode), wgpu::PresentMode::AutoNoVsync);
    }
}
