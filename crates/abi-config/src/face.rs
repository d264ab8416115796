use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "ABI_CONFIG";

/// Largest accepted frame width or height.
pub const MAX_FRAME_SIDE: u32 = 8192;

/// Full face configuration, loaded from TOML once at startup.
///
/// Every section and field is optional in the file; missing values take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FaceConfig {
    pub frame: FrameConfig,
    pub eyes: EyesConfig,
    pub mouth: MouthConfig,
    pub palette: PaletteConfig,
    pub jitter: JitterConfig,
    pub timing: TimingConfig,
    pub bloom: BloomConfig,
}

/// Destination frame the features are composited onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: [0, 0, 0],
        }
    }
}

/// Both eyes share radii and steps; only their anchors differ.
///
/// The left eye (on screen) is drawn unmirrored, the right eye mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EyesConfig {
    pub radius: u32,
    pub pupil_radius: u32,
    pub left_center: [i32; 2],
    pub right_center: [i32; 2],
    /// Screen units moved per tick while a direction key is held.
    pub move_step: i32,
    /// Progress added per active animation tick.
    pub progress_step: u32,
}

impl Default for EyesConfig {
    fn default() -> Self {
        Self {
            radius: 240,
            pupil_radius: 120,
            left_center: [480, 540],
            right_center: [1440, 540],
            move_step: 8,
            progress_step: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MouthConfig {
    pub radius: u32,
    pub center: [i32; 2],
    pub progress_step: u32,
}

impl Default for MouthConfig {
    fn default() -> Self {
        Self {
            radius: 80,
            center: [960, 840],
            progress_step: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PaletteConfig {
    pub iris: [u8; 3],
    pub pupil: [u8; 3],
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            iris: [171, 235, 255],
            pupil: [230, 249, 255],
        }
    }
}

/// Cosmetic idle flicker.
///
/// With `max_drift` unset the flicker is an unbounded random walk; with it
/// set, each axis stays within `max_drift` of the feature's home position,
/// which moves along with deliberate arrow-key movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct JitterConfig {
    pub enabled: bool,
    pub max_drift: Option<u32>,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_drift: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TimingConfig {
    /// Interval between animation ticks.
    pub tick_interval_ms: u64,
    /// Longest wait for input per rendered frame.
    pub poll_interval_ms: u64,
    /// How long a key counts as held after its last auto-repeat.
    pub hold_ms: u64,
    /// How long a key counts as held after its first press, before the
    /// terminal starts auto-repeating. Should exceed the keyboard's repeat
    /// delay (commonly 250 to 600 ms), or held keys stutter on terminals
    /// that never report releases.
    pub repeat_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            poll_interval_ms: 16,
            hold_ms: 150,
            repeat_delay_ms: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BloomConfig {
    pub enabled: bool,
    /// Gaussian sigma in output pixels.
    pub sigma: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sigma: 1.5,
        }
    }
}

impl FaceConfig {
    /// Parse and validate config TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse face config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read face config at {}", path.display()))?;

        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid face config at {}", path.display()))
    }

    /// Load from the file named by `ABI_CONFIG`, or fall back to defaults.
    ///
    /// Returns the config and the path it came from, if any.
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        match std::env::var_os(CONFIG_ENV) {
            Some(raw) if !raw.is_empty() => {
                let path = PathBuf::from(raw);
                let config = Self::from_path(&path)?;
                Ok((config, Some(path)))
            }
            _ => Ok((Self::default(), None)),
        }
    }

    /// Check geometric and timing constraints.
    pub fn validate(&self) -> Result<()> {
        validate_positive("frame.width", self.frame.width)?;
        validate_positive("frame.height", self.frame.height)?;

        for (field, value) in [
            ("frame.width", self.frame.width),
            ("frame.height", self.frame.height),
        ] {
            if value > MAX_FRAME_SIDE {
                bail!("{field} ({value}) must not exceed {MAX_FRAME_SIDE}");
            }
        }

        validate_positive("eyes.radius", self.eyes.radius)?;
        self.validate_canvas_fits("eyes.radius", self.eyes.radius)?;
        if self.eyes.pupil_radius >= self.eyes.radius {
            bail!(
                "eyes.pupil_radius ({}) must be smaller than eyes.radius ({})",
                self.eyes.pupil_radius,
                self.eyes.radius
            );
        }
        if self.eyes.move_step < 0 {
            bail!("eyes.move_step must not be negative");
        }
        validate_positive("eyes.progress_step", self.eyes.progress_step)?;

        validate_positive("mouth.radius", self.mouth.radius)?;
        self.validate_canvas_fits("mouth.radius", self.mouth.radius)?;
        validate_positive("mouth.progress_step", self.mouth.progress_step)?;

        if self.timing.tick_interval_ms == 0 {
            bail!("timing.tick_interval_ms must be greater than zero");
        }

        if !self.bloom.sigma.is_finite() || self.bloom.sigma < 0.0 {
            bail!(
                "bloom.sigma must be a finite non-negative number, got {}",
                self.bloom.sigma
            );
        }

        Ok(())
    }

    /// A feature's canvas (`2R` square) must fit within the frame's longer side.
    fn validate_canvas_fits(&self, field: &str, radius: u32) -> Result<()> {
        let limit = self.frame.width.max(self.frame.height);
        if u64::from(radius) * 2 > u64::from(limit) {
            bail!(
                "{field} ({radius}) is too large: its {}-pixel canvas must fit within {limit} pixels",
                u64::from(radius) * 2
            );
        }
        Ok(())
    }
}

fn validate_positive(field: &str, value: u32) -> Result<()> {
    if value == 0 {
        bail!("{field} must be greater than zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[frame]
width = 1280
height = 720

[eyes]
radius = 350
pupil_radius = 150
left_center = [320, 360]
right_center = [960, 360]

[jitter]
max_drift = 4

[bloom]
enabled = false
"#;

    #[test]
    fn defaults_are_valid() {
        FaceConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = FaceConfig::from_toml_str("").unwrap();
        assert_eq!(config, FaceConfig::default());
    }

    #[test]
    fn parses_partial_sections() {
        let config = FaceConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.frame.width, 1280);
        assert_eq!(config.frame.background, [0, 0, 0]);
        assert_eq!(config.eyes.radius, 350);
        assert_eq!(config.eyes.progress_step, 100);
        assert_eq!(config.jitter.max_drift, Some(4));
        assert!(config.jitter.enabled);
        assert!(!config.bloom.enabled);
        assert_eq!(config.mouth, MouthConfig::default());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = FaceConfig::from_toml_str("[eyes]\nradious = 3\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("failed to parse face config TOML"));
    }

    #[test]
    fn pupil_must_be_smaller_than_iris() {
        let raw = "[eyes]\nradius = 100\npupil_radius = 100\n";
        let err = FaceConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("eyes.pupil_radius"), "{err}");
    }

    #[test]
    fn radius_too_large_is_rejected() {
        let raw = "[eyes]\nradius = 3000000000\npupil_radius = 1\n";
        let err = FaceConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("eyes.radius (3000000000) is too large"), "{err}");

        let raw = "[mouth]\nradius = 50000\n";
        let err = FaceConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("mouth.radius (50000) is too large"), "{err}");

        // Exactly filling the longer side is fine.
        let raw = "[frame]\nwidth = 400\nheight = 300\n[eyes]\nradius = 200\npupil_radius = 10\n[mouth]\nradius = 20\n";
        FaceConfig::from_toml_str(raw).unwrap();
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let raw = "[frame]\nwidth = 100000\n";
        let err = FaceConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("frame.width (100000) must not exceed 8192"), "{err}");
    }

    #[test]
    fn zero_progress_step_is_rejected() {
        let raw = "[mouth]\nprogress_step = 0\n";
        let err = FaceConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("mouth.progress_step must be greater than zero"));
    }

    #[test]
    fn negative_sigma_is_rejected() {
        let raw = "[bloom]\nsigma = -1.0\n";
        let err = FaceConfig::from_toml_str(raw).unwrap_err().to_string();
        assert!(err.contains("bloom.sigma"));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = FaceConfig::from_path(Path::new("/nonexistent/abi.toml"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("failed to read face config"));
    }
}
