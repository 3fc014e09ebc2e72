//! Streakfield - seeded starfields and animated light streaks
//!
//! Core modules:
//! - `sim`: Field generation, streak lifecycle and rotation sync (no rendering deps)
//! - `renderer`: Fixed vertex/shader contract and per-frame buffer assembly
//! - `ogp`: Static link-preview image (SVG document + external rasterizer)
//! - `settings`: Data-driven scene configuration

pub mod ogp;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec3;

/// Scene configuration constants
pub mod consts {
    /// Seed token used when no explicit or environment token is available
    pub const DEFAULT_SEED_TOKEN: &str = "dev";
    /// Seed tokens are cut down to this many characters
    pub const SEED_TOKEN_LEN: usize = 7;

    /// Wireframe sphere radius (streak endpoints lie on this sphere)
    pub const SPHERE_RADIUS: f32 = 2.0;
    /// Icosphere subdivision detail
    pub const SPHERE_DETAIL: u32 = 4;

    /// Streak pool capacity
    pub const STREAK_POOL_CAPACITY: usize = 35;
    /// Spawn interval range (seconds)
    pub const STREAK_SPAWN_INTERVAL: [f32; 2] = [0.2, 0.8];
    /// Streak lifetime range (seconds)
    pub const STREAK_DURATION: [f32; 2] = [1.5, 2.0];
    /// Curve samples per streak (sample points = segments + 1)
    pub const STREAK_SEGMENTS: u32 = 64;
    /// Tube radius around the curve
    pub const STREAK_TUBE_RADIUS: f32 = 0.02;
    /// Vertices around each tube ring
    pub const STREAK_RADIAL_SEGMENTS: u32 = 8;
    /// Gaussian width of the moving light
    pub const STREAK_SIGMA: f32 = 0.2;
    /// Tail lengthening factor behind the light
    pub const STREAK_TRAIL_STRETCH: f32 = 2.0;

    /// Per-tick sphere rotation (radians, not time-scaled)
    pub const ROTATION_STEP: [f32; 3] = [0.001, 0.002, 0.0005];

    /// Real-time star cloud
    pub const STAR_CLOUD_COUNT: usize = 3000;
    pub const STAR_CLOUD_MIN_RADIUS: f32 = 15.0;
    pub const STAR_CLOUD_MAX_RADIUS: f32 = 50.0;
    pub const STAR_CLOUD_POINT_SIZE: f32 = 0.1;

    /// OGP canvas
    pub const OGP_WIDTH: u32 = 1200;
    pub const OGP_HEIGHT: u32 = 630;
    pub const OGP_BAND_COUNT: u32 = 12;
}

/// Neon palette for streaks (sRGB hex)
pub const NEON_PALETTE: [&str; 12] = [
    "#ff0080", "#00ff80", "#8000ff", "#ff8000", "#0080ff", "#ff4080", "#80ff00", "#ff0040",
    "#40ff80", "#8040ff", "#ff8040", "#4080ff",
];

/// Convert spherical (r, azimuth, polar) to cartesian
#[inline]
pub fn spherical_to_cartesian(r: f32, azimuth: f32, polar: f32) -> Vec3 {
    let sin_polar = polar.sin();
    Vec3::new(
        r * sin_polar * azimuth.cos(),
        r * sin_polar * azimuth.sin(),
        r * polar.cos(),
    )
}

/// Parse `#rrggbb` into linear-ish 0-1 RGB (no gamma conversion)
pub fn hex_to_rgb(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// HSL (all components 0-1) to RGB
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spherical_poles() {
        let north = spherical_to_cartesian(2.0, 0.0, 0.0);
        assert!((north - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-6);
        let equator = spherical_to_cartesian(1.0, std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
        assert!((equator - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff0080"), Some([1.0, 0.0, 128.0 / 255.0]));
        assert_eq!(hex_to_rgb("ff0080"), None);
        assert_eq!(hex_to_rgb("#ff00"), None);
    }

    #[test]
    fn test_hsl_primary() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6 && red[2].abs() < 1e-6);
        assert_eq!(hsl_to_rgb(0.3, 0.0, 0.25), [0.25, 0.25, 0.25]);
    }
}
