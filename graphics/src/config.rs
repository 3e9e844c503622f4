//! Animator configuration.
//!
//! Every knob has a device default, so an empty TOML document is a valid
//! configuration. Values are validated once at load time.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AnimatorError, Result};

/// Number of render wakes a full transition takes.
pub const DEFAULT_STEPS: u32 = 40;
/// Horizontal gap between neighbouring windows in overview.
pub const DEFAULT_PAGE_SPACING: u32 = 24;
/// First row of the reflection band.
pub const DEFAULT_REFLECTION_LINE: i32 = 400;
/// Height of the reflection band (and of the mirrored strip above it).
pub const DEFAULT_REFLECTION_HEIGHT: u32 = 80;
/// Fade toward black applied to the first reflected row, out of 255.
pub const DEFAULT_REFLECTION_FADE: u8 = 128;
/// Caption marking the decoration window.
pub const DEFAULT_DECORATION_CAPTION: &str = "decoration";
/// Round-robin priority used while animating.
pub const DEFAULT_REALTIME_PRIORITY: i32 = 10;

/// Top-level animator configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimatorConfig {
    /// Interpolation steps per transition.
    pub steps: u32,
    /// Overview scale numerator.
    pub shrink_numerator: u32,
    /// Overview scale denominator.
    pub shrink_denominator: u32,
    /// Gap between paged windows in overview, in pixels.
    pub page_spacing: u32,
    /// Row the bottom edge of every overview window is pinned to. Defaults
    /// to the reflection line.
    pub baseline: Option<i32>,
    /// Caption identifying decoration windows.
    pub decoration_caption: String,
    pub reflection: ReflectionConfig,
    pub render: RenderConfig,
    /// Unix socket the reservation listener binds, if any.
    pub socket_path: Option<PathBuf>,
}

/// Reflection band below a fixed screen row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReflectionConfig {
    /// First row below the mirror line.
    pub line: i32,
    /// Band height in rows. Zero disables reflections.
    pub height: u32,
    /// Fade toward black at the mirror line; grows to full black at the
    /// bottom of the band.
    pub base_fade: u8,
}

/// Render thread tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// `SCHED_RR` priority requested while an animation runs.
    pub realtime_priority: i32,
    /// Pause between animation frames with the lock released, in ms.
    pub frame_interval_ms: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        AnimatorConfig {
            steps: DEFAULT_STEPS,
            shrink_numerator: 9,
            shrink_denominator: 12,
            page_spacing: DEFAULT_PAGE_SPACING,
            baseline: None,
            decoration_caption: String::from(DEFAULT_DECORATION_CAPTION),
            reflection: ReflectionConfig::default(),
            render: RenderConfig::default(),
            socket_path: None,
        }
    }
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        ReflectionConfig {
            line: DEFAULT_REFLECTION_LINE,
            height: DEFAULT_REFLECTION_HEIGHT,
            base_fade: DEFAULT_REFLECTION_FADE,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            realtime_priority: DEFAULT_REALTIME_PRIORITY,
            frame_interval_ms: 0,
        }
    }
}

impl AnimatorConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnimatorConfig = toml::from_str(content)
            .map_err(|e| AnimatorError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AnimatorError::Config(format!("config file not found: {}", path.display()))
            } else {
                AnimatorError::Io(e)
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(AnimatorError::Config("steps must be at least 1".into()));
        }
        if self.shrink_denominator == 0 || self.shrink_numerator == 0 {
            return Err(AnimatorError::Config("shrink ratio terms must be non-zero".into()));
        }
        if self.shrink_numerator >= self.shrink_denominator {
            return Err(AnimatorError::Config(format!(
                "shrink ratio {}/{} does not shrink",
                self.shrink_numerator, self.shrink_denominator
            )));
        }
        Ok(())
    }

    /// Row overview windows stand on.
    pub fn baseline(&self) -> i32 {
        self.baseline.unwrap_or(self.reflection.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = AnimatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnimatorConfig::default());
        assert_eq!(config.steps, 40);
        assert_eq!(config.baseline(), DEFAULT_REFLECTION_LINE);
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = AnimatorConfig::from_toml_str(
            r#"
            steps = 10
            decoration_caption = "statusbar"

            [reflection]
            line = 300

            [render]
            frame_interval_ms = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.steps, 10);
        assert_eq!(config.decoration_caption, "statusbar");
        assert_eq!(config.reflection.line, 300);
        assert_eq!(config.reflection.height, DEFAULT_REFLECTION_HEIGHT);
        assert_eq!(config.render.frame_interval_ms, 16);
        assert_eq!(config.baseline(), 300);
    }

    #[test]
    fn test_rejects_non_shrinking_ratio() {
        let err = AnimatorConfig::from_toml_str("shrink_numerator = 13").unwrap_err();
        assert!(matches!(err, AnimatorError::Config(_)));
        assert!(AnimatorConfig::from_toml_str("shrink_numerator = 12").is_err());
    }

    #[test]
    fn test_rejects_zero_steps_and_unknown_keys() {
        assert!(AnimatorConfig::from_toml_str("steps = 0").is_err());
        assert!(AnimatorConfig::from_toml_str("stepz = 3").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnimatorConfig::load(Path::new("/nonexistent/coverflow.toml")).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
