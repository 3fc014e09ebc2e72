//! Static link-preview (OGP) image
//!
//! Pipeline: resolve seed token -> generate SVG -> write SVG -> rasterize PNG.
//! A failed rasterization never removes the SVG already on disk.

pub mod raster;
pub mod seed;
pub mod svg;

use std::path::{Path, PathBuf};

pub use raster::{ChromiumRasterizer, RasterError, Rasterizer, rasterize_or_report};
pub use seed::{SeedSource, SeedToken, normalize_token, resolve_seed, resolve_seed_with};
pub use svg::OgpDocument;

use crate::settings::OgpSettings;
use crate::sim::FieldError;

/// What an export run produced
#[derive(Debug, Clone)]
pub struct OgpReport {
    pub svg_path: PathBuf,
    pub png_path: PathBuf,
    /// False when rasterization failed or was skipped
    pub png_written: bool,
    pub star_count: usize,
    pub width: u32,
    pub height: u32,
    pub token: String,
}

/// Export errors that stop the run before anything usable exists
#[derive(Debug, thiserror::Error)]
pub enum OgpError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Generate and write the SVG, then rasterize it if a rasterizer is given
pub fn export(
    settings: &OgpSettings,
    token: &str,
    out_dir: &Path,
    rasterizer: Option<&dyn Rasterizer>,
) -> Result<OgpReport, OgpError> {
    let document = OgpDocument::generate(settings, token)?;
    let svg_path = out_dir.join(&settings.svg_file);
    let png_path = out_dir.join(&settings.png_file);

    std::fs::write(&svg_path, document.render()).map_err(|source| OgpError::Write {
        path: svg_path.clone(),
        source,
    })?;
    log::info!("Wrote {}", svg_path.display());

    let png_written = match rasterizer {
        Some(r) => rasterize_or_report(r, &svg_path, &png_path, settings.width, settings.height),
        None => false,
    };

    Ok(OgpReport {
        svg_path,
        png_path,
        png_written,
        star_count: document.stars.len(),
        width: settings.width,
        height: settings.height,
        token: token.to_string(),
    })
}
