//! Procedural star field generation
//!
//! A field is built from an ordered list of `FieldConfig` classes drawn against
//! one shared `SeededSequence`. Per element the draw order is fixed:
//! position coordinate(s), then size, then opacity. Changing that order (or
//! the class order) changes every element after it.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sequence::SeededSequence;
use crate::spherical_to_cartesian;

/// Colour class of a generated element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorClass {
    #[default]
    White,
    Blue,
    /// Index into `NEON_PALETTE`
    Neon(u8),
}

impl ColorClass {
    /// SVG/CSS colour string
    pub fn css(&self) -> &'static str {
        match self {
            ColorClass::White => "white",
            ColorClass::Blue => "blue",
            ColorClass::Neon(i) => crate::NEON_PALETTE[*i as usize % crate::NEON_PALETTE.len()],
        }
    }

    /// RGB in 0-1
    pub fn rgb(&self) -> [f32; 3] {
        match self {
            ColorClass::White => [1.0, 1.0, 1.0],
            ColorClass::Blue => [0.0, 0.0, 1.0],
            ColorClass::Neon(_) => crate::hex_to_rgb(self.css()).unwrap_or([1.0, 1.0, 1.0]),
        }
    }
}

/// Spatial domain elements are scattered over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDomain {
    /// Axis-aligned rectangle [0, width) x [0, height), z = 0
    Rect { width: f32, height: f32 },
    /// Spherical shell, area-uniform direction, radius uniform in [min, max]
    Shell { min_radius: f32, max_radius: f32 },
}

impl FieldDomain {
    /// Unit square, mostly useful for tests
    pub const UNIT_SQUARE: FieldDomain = FieldDomain::Rect {
        width: 1.0,
        height: 1.0,
    };

    fn validate(&self) -> Result<(), FieldError> {
        match *self {
            FieldDomain::Rect { width, height } => {
                if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
                    return Err(FieldError::DegenerateDomain(format!(
                        "rect {width}x{height} must have positive finite extent"
                    )));
                }
            }
            FieldDomain::Shell {
                min_radius,
                max_radius,
            } => {
                if !(min_radius.is_finite() && max_radius.is_finite())
                    || min_radius < 0.0
                    || min_radius > max_radius
                {
                    return Err(FieldError::DegenerateDomain(format!(
                        "shell radii [{min_radius}, {max_radius}] must satisfy 0 <= min <= max"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draw one position; consumes 2 (rect) or 3 (shell) values
    fn sample(&self, seq: &mut SeededSequence) -> Vec3 {
        match *self {
            FieldDomain::Rect { width, height } => {
                let x = seq.next_f32() * width;
                let y = seq.next_f32() * height;
                Vec3::new(x, y, 0.0)
            }
            FieldDomain::Shell {
                min_radius,
                max_radius,
            } => {
                let r = lerp(min_radius, max_radius, seq.next_f32());
                let azimuth = seq.next_f32() * TAU;
                // acos of uniform [-1, 1] keeps the density even at the poles
                let polar = (2.0 * seq.next_f32() - 1.0).clamp(-1.0, 1.0).acos();
                spherical_to_cartesian(r, azimuth, polar)
            }
        }
    }
}

/// One class of stars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub count: usize,
    /// [min, max] radius / point size
    pub size: [f32; 2],
    /// [min, max] opacity
    pub opacity: [f32; 2],
    #[serde(default)]
    pub color: ColorClass,
}

impl FieldConfig {
    pub fn new(name: &str, count: usize, size: [f32; 2], opacity: [f32; 2], color: ColorClass) -> Self {
        Self {
            name: name.to_string(),
            count,
            size,
            opacity,
            color,
        }
    }

    /// Reject ranges that would otherwise need clamping
    pub fn validate(&self) -> Result<(), FieldError> {
        check_range(&self.name, "size", self.size)?;
        check_range(&self.name, "opacity", self.opacity)?;
        Ok(())
    }
}

/// A generated star
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldElement {
    /// z is always 0 for rect domains
    pub position: Vec3,
    pub size: f32,
    pub opacity: f32,
    pub color: ColorClass,
}

/// Field configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("config `{config}`: {field} range [{min}, {max}] has min > max")]
    InvertedRange {
        config: String,
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("config `{config}`: {field} range contains a non-finite bound")]
    NonFinite { config: String, field: &'static str },

    #[error("degenerate domain: {0}")]
    DegenerateDomain(String),
}

fn check_range(config: &str, field: &'static str, range: [f32; 2]) -> Result<(), FieldError> {
    let [min, max] = range;
    if !(min.is_finite() && max.is_finite()) {
        return Err(FieldError::NonFinite {
            config: config.to_string(),
            field,
        });
    }
    if min > max {
        return Err(FieldError::InvertedRange {
            config: config.to_string(),
            field,
            min,
            max,
        });
    }
    Ok(())
}

#[inline]
fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + t * (max - min)
}

/// Generate `config.count` elements over `domain`.
///
/// Validation happens before any draw, so a rejected config leaves `seq`
/// untouched. A zero count draws nothing.
pub fn generate(
    config: &FieldConfig,
    domain: &FieldDomain,
    seq: &mut SeededSequence,
) -> Result<Vec<FieldElement>, FieldError> {
    config.validate()?;
    domain.validate()?;

    let mut elements = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let position = domain.sample(seq);
        let size = lerp(config.size[0], config.size[1], seq.next_f32());
        let opacity = lerp(config.opacity[0], config.opacity[1], seq.next_f32());
        elements.push(FieldElement {
            position,
            size,
            opacity,
            color: config.color,
        });
    }
    Ok(elements)
}

/// Generate every class in order against one shared sequence.
///
/// All configs are validated up front; on error nothing is drawn.
pub fn generate_all(
    configs: &[FieldConfig],
    domain: &FieldDomain,
    seq: &mut SeededSequence,
) -> Result<Vec<FieldElement>, FieldError> {
    for config in configs {
        config.validate()?;
    }
    domain.validate()?;

    let total = configs.iter().map(|c| c.count).sum();
    let mut elements = Vec::with_capacity(total);
    for config in configs {
        let batch = generate(config, domain, seq)?;
        log::debug!("Generated {} `{}` elements", batch.len(), config.name);
        elements.extend(batch);
    }
    Ok(elements)
}
