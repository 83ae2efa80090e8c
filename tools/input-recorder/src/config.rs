use crate::errors::RecorderError;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub no_structural_capture: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub playback: PlaybackConfig,
    pub capture: CaptureConfig,
    pub presentation: PresentationConfig,
    pub field: FieldConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureConfig {
    pub structural_watcher: bool,
    pub dedupe_across_sources: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresentationConfig {
    pub enabled_opacity: f32,
    pub disabled_opacity: f32,
    pub playback_enabled_initially: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldConfig {
    pub initial_value: String,
    pub insert_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig { interval_ms: 200 },
            capture: CaptureConfig {
                structural_watcher: true,
                dedupe_across_sources: true,
            },
            presentation: PresentationConfig {
                enabled_opacity: 1.0,
                disabled_opacity: 0.5,
                playback_enabled_initially: false,
            },
            field: FieldConfig {
                initial_value: String::new(),
                insert_text: "lorem ipsum".to_string(),
            },
            logging: LoggingConfig {
                path: None,
                max_payload_bytes: crate::logging::DEFAULT_MAX_PAYLOAD_BYTES,
            },
        }
    }
}

impl AppConfig {
    pub fn playback_interval(&self) -> Duration {
        Duration::from_millis(self.playback.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialAppConfig {
    playback: Option<PartialPlaybackConfig>,
    capture: Option<PartialCaptureConfig>,
    presentation: Option<PartialPresentationConfig>,
    field: Option<PartialFieldConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialPlaybackConfig {
    interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialCaptureConfig {
    structural_watcher: Option<bool>,
    dedupe_across_sources: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialPresentationConfig {
    enabled_opacity: Option<f32>,
    disabled_opacity: Option<f32>,
    playback_enabled_initially: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialFieldConfig {
    initial_value: Option<String>,
    insert_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialLoggingConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
}

pub fn load_config(
    overrides: &CliOverrides,
    fs: &dyn FileSystem,
) -> Result<AppConfig, RecorderError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| RecorderError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(playback) = partial.playback {
        if let Some(value) = playback.interval_ms {
            cfg.playback.interval_ms = value;
        }
    }

    if let Some(capture) = partial.capture {
        if let Some(value) = capture.structural_watcher {
            cfg.capture.structural_watcher = value;
        }
        if let Some(value) = capture.dedupe_across_sources {
            cfg.capture.dedupe_across_sources = value;
        }
    }

    if let Some(presentation) = partial.presentation {
        if let Some(value) = presentation.enabled_opacity {
            cfg.presentation.enabled_opacity = value;
        }
        if let Some(value) = presentation.disabled_opacity {
            cfg.presentation.disabled_opacity = value;
        }
        if let Some(value) = presentation.playback_enabled_initially {
            cfg.presentation.playback_enabled_initially = value;
        }
    }

    if let Some(field) = partial.field {
        if let Some(value) = field.initial_value {
            cfg.field.initial_value = value;
        }
        if let Some(value) = field.insert_text {
            cfg.field.insert_text = value;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(path) = logging.path {
            cfg.logging.path = Some(path);
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(interval_ms) = overrides.interval_ms {
        cfg.playback.interval_ms = interval_ms;
    }
    if let Some(path) = &overrides.log_file {
        cfg.logging.path = Some(path.clone());
    }
    if overrides.no_structural_capture {
        cfg.capture.structural_watcher = false;
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), RecorderError> {
    if cfg.playback.interval_ms == 0 {
        return Err(RecorderError::InvalidConfig(
            "playback.interval_ms must be greater than zero".to_string(),
        ));
    }

    let presentation = &cfg.presentation;
    for (name, value) in [
        ("presentation.enabled_opacity", presentation.enabled_opacity),
        ("presentation.disabled_opacity", presentation.disabled_opacity),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(RecorderError::InvalidConfig(format!(
                "{name} must be within 0.0..=1.0"
            )));
        }
    }
    if presentation.disabled_opacity >= presentation.enabled_opacity {
        return Err(RecorderError::InvalidConfig(
            "presentation.disabled_opacity must be lower than enabled_opacity".to_string(),
        ));
    }

    if cfg.logging.max_payload_bytes == 0 {
        return Err(RecorderError::InvalidConfig(
            "logging.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
