//! Scene settings
//!
//! Loaded from an optional JSON file; every field has a default so partial
//! files work.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::emitter::EmitterConfig;
use crate::sim::field::{ColorClass, FieldConfig, FieldDomain, FieldError};
use crate::sim::lifecycle::LightProfile;

/// Settings loading errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid star field: {0}")]
    Field(#[from] FieldError),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Real-time point cloud around the sphere
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarCloudSettings {
    pub domain: FieldDomain,
    pub classes: Vec<FieldConfig>,
}

impl Default for StarCloudSettings {
    fn default() -> Self {
        Self {
            domain: FieldDomain::Shell {
                min_radius: STAR_CLOUD_MIN_RADIUS,
                max_radius: STAR_CLOUD_MAX_RADIUS,
            },
            classes: vec![FieldConfig::new(
                "cloud",
                STAR_CLOUD_COUNT,
                [STAR_CLOUD_POINT_SIZE, STAR_CLOUD_POINT_SIZE],
                [1.0, 1.0],
                ColorClass::White,
            )],
        }
    }
}

/// Static link-preview image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OgpSettings {
    pub width: u32,
    pub height: u32,
    pub band_count: u32,
    /// Star classes, drawn in this order
    pub classes: Vec<FieldConfig>,
    pub caption: String,
    pub font_family: String,
    pub font_url: String,
    pub svg_file: String,
    pub png_file: String,
    /// Headless browser used to rasterize the SVG
    pub browser: String,
    /// Wait for web fonts before capture (milliseconds)
    pub settle_ms: u64,
    /// Give up on the rasterizer after this long (milliseconds)
    pub raster_timeout_ms: u64,
}

impl Default for OgpSettings {
    fn default() -> Self {
        Self {
            width: OGP_WIDTH,
            height: OGP_HEIGHT,
            band_count: OGP_BAND_COUNT,
            classes: vec![
                FieldConfig::new("bright_o", 5, [2.0, 2.2], [0.6, 1.0], ColorClass::Blue),
                FieldConfig::new("bright", 100, [1.2, 1.8], [0.6, 1.0], ColorClass::White),
                FieldConfig::new("medium", 500, [1.0, 1.2], [0.5, 0.7], ColorClass::White),
                FieldConfig::new("small", 1200, [0.7, 0.9], [0.2, 0.5], ColorClass::White),
            ],
            caption: "tropical-362827".to_string(),
            font_family: "'Source Code Pro', monospace".to_string(),
            font_url: "https://fonts.googleapis.com/css2?family=Source+Code+Pro:ital,wght@0,200;1,200&display=swap"
                .to_string(),
            svg_file: "ogp-image-generated.svg".to_string(),
            png_file: "ogp-image.png".to_string(),
            browser: "chromium".to_string(),
            settle_ms: 2000,
            raster_timeout_ms: 30_000,
        }
    }
}

impl OgpSettings {
    /// Canvas as a field domain
    pub fn domain(&self) -> FieldDomain {
        FieldDomain::Rect {
            width: self.width as f32,
            height: self.height as f32,
        }
    }

    /// Total star count across classes
    pub fn star_count(&self) -> usize {
        self.classes.iter().map(|c| c.count).sum()
    }
}

/// All scene settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Streak slots; a spawn with every slot busy is skipped
    pub pool_capacity: usize,
    pub streaks: EmitterConfig,
    pub light: LightProfile,
    /// Per-tick rotation step [x, y, z] radians
    pub rotation_step: [f32; 3],
    pub sphere_detail: u32,
    pub star_cloud: StarCloudSettings,
    pub ogp: OgpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pool_capacity: STREAK_POOL_CAPACITY,
            streaks: EmitterConfig::default(),
            light: LightProfile::default(),
            rotation_step: ROTATION_STEP,
            sphere_detail: SPHERE_DETAIL,
            star_cloud: StarCloudSettings::default(),
            ogp: OgpSettings::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file and validate
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse JSON (missing fields use defaults) and validate
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the generators would otherwise have to clamp
    pub fn validate(&self) -> Result<(), SettingsError> {
        for config in self.star_cloud.classes.iter().chain(&self.ogp.classes) {
            config.validate()?;
        }

        let s = &self.streaks;
        for (name, [min, max]) in [("spawn_interval", s.spawn_interval), ("duration", s.duration)] {
            if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
                return Err(SettingsError::Invalid(format!(
                    "streaks.{name} [{min}, {max}] must satisfy 0 <= min <= max"
                )));
            }
        }
        if !positive(s.duration[0]) {
            return Err(SettingsError::Invalid("streaks.duration must be positive".into()));
        }
        if !(positive(s.radius) && positive(s.tube_radius)) || s.segments == 0 {
            return Err(SettingsError::Invalid(
                "streaks.radius, tube_radius and segments must be positive".into(),
            ));
        }
        if !(s.jitter.is_finite() && s.jitter >= 0.0) {
            return Err(SettingsError::Invalid(format!("streaks.jitter {} must be >= 0", s.jitter)));
        }
        let stretch = self.light.trail_stretch;
        if !(positive(self.light.sigma) && stretch.is_finite() && stretch >= 1.0) {
            return Err(SettingsError::Invalid(format!(
                "light sigma {} must be > 0 and trail_stretch {} >= 1",
                self.light.sigma, self.light.trail_stretch
            )));
        }
        if !self.rotation_step.iter().all(|v| v.is_finite()) {
            return Err(SettingsError::Invalid("rotation_step must be finite".into()));
        }
        if self.ogp.width == 0 || self.ogp.height == 0 || self.ogp.band_count == 0 {
            return Err(SettingsError::Invalid("ogp canvas and band count must be non-zero".into()));
        }
        Ok(())
    }
}

/// Finite and > 0 (rejects NaN)
fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::new();
        assert_eq!(settings.rotation_step, [0.001, 0.002, 0.0005]);
        assert_eq!(settings.pool_capacity, 35);
        assert_eq!(settings.ogp.star_count(), 1805);
        assert_eq!(settings.star_cloud.classes[0].count, 3000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"pool_capacity": 4}"#).unwrap();
        assert_eq!(settings.pool_capacity, 4);
        assert_eq!(settings.streaks.spawn_interval, [0.2, 0.8]);
        assert_eq!(settings.ogp.width, 1200);
        assert_eq!(settings.rotation_step, ROTATION_STEP);
        assert_eq!(settings.sphere_detail, 4);
    }

    #[test]
    fn test_round_trip_json() {
        let settings = Settings::new();
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.rotation_step, settings.rotation_step);
        assert_eq!(back.ogp.classes, settings.ogp.classes);
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        let err = Settings::from_json(r#"{"streaks": {"duration": [2.0, 1.0]}}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json(
            r#"{"ogp": {"classes": [{"name": "x", "count": 1, "size": [3, 1], "opacity": [0, 1]}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Field(FieldError::InvertedRange { .. })));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(Settings::from_json("{"), Err(SettingsError::Parse(_))));
        assert!(matches!(
            Settings::load(Path::new("/definitely/not/here.json")),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let mut settings = Settings::new();
        settings.light.sigma = f32::NAN;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = Settings::new();
        settings.streaks.radius = f32::NAN;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = Settings::new();
        settings.light.trail_stretch = f32::NAN;
        assert!(settings.validate().is_err());

        let mut settings = Settings::new();
        settings.streaks.duration = [f32::NAN, 2.0];
        assert!(settings.validate().is_err());
    }
}
