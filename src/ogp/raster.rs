//! SVG to PNG through an external headless browser
//!
//! The SVG is wrapped in a bare HTML page, loaded in a viewport the size of
//! the canvas, given a settle budget for web fonts, then captured.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::settings::OgpSettings;

/// Distinguishes wrapper pages of concurrent captures
static WRAPPER_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Rasterization failures
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch `{browser}`: {source}")]
    Launch {
        browser: String,
        source: std::io::Error,
    },

    #[error("rasterizer exited with {0}")]
    Exit(std::process::ExitStatus),

    #[error("rasterizer timed out after {0:?}")]
    Timeout(Duration),

    #[error("rasterizer reported success but {0} was not written")]
    MissingOutput(PathBuf),
}

/// Turns an SVG file into a PNG of the given size
pub trait Rasterizer {
    fn rasterize(&self, svg: &Path, png: &Path, width: u32, height: u32) -> Result<(), RasterError>;
}

/// Wrap SVG markup in a margin-free HTML page
pub fn html_wrapper(svg: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <style>\n        body {{ margin: 0; padding: 0; background: black; }}\n        svg {{ display: block; }}\n    </style>\n</head>\n<body>\n{svg}\n</body>\n</html>\n"
    )
}

/// Headless Chromium (or compatible) screenshot
#[derive(Debug, Clone)]
pub struct ChromiumRasterizer {
    pub browser: String,
    /// Virtual time granted before capture
    pub settle: Duration,
    pub timeout: Duration,
}

impl ChromiumRasterizer {
    pub fn from_settings(settings: &OgpSettings) -> Self {
        Self {
            browser: settings.browser.clone(),
            settle: Duration::from_millis(settings.settle_ms),
            timeout: Duration::from_millis(settings.raster_timeout_ms),
        }
    }

    /// Browser arguments for one capture
    pub fn args(&self, html: &Path, png: &Path, width: u32, height: u32) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            format!("--window-size={width},{height}"),
            format!("--virtual-time-budget={}", self.settle.as_millis()),
            format!("--screenshot={}", png.display()),
            format!("file://{}", html.display()),
        ]
    }

    fn wait(&self, child: &mut std::process::Child) -> Result<(), RasterError> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return if status.success() {
                    Ok(())
                } else {
                    Err(RasterError::Exit(status))
                };
            }
            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RasterError::Timeout(self.timeout));
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Rasterizer for ChromiumRasterizer {
    fn rasterize(&self, svg: &Path, png: &Path, width: u32, height: u32) -> Result<(), RasterError> {
        let markup = std::fs::read_to_string(svg)?;
        let n = WRAPPER_COUNTER.fetch_add(1, Ordering::Relaxed);
        let html = std::env::temp_dir().join(format!("streakfield-ogp-{}-{n}.html", std::process::id()));
        std::fs::write(&html, html_wrapper(&markup))?;

        let html_abs = std::fs::canonicalize(&html)?;
        let png_abs = std::path::absolute(png)?;
        // A leftover PNG would hide a browser that exits cleanly without writing
        match std::fs::remove_file(&png_abs) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                let _ = std::fs::remove_file(&html);
                return Err(e.into());
            }
            _ => {}
        }
        log::info!("Launching {} to rasterize {}", self.browser, svg.display());

        let result = Command::new(&self.browser)
            .args(self.args(&html_abs, &png_abs, width, height))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RasterError::Launch {
                browser: self.browser.clone(),
                source,
            })
            .and_then(|mut child| self.wait(&mut child));

        let _ = std::fs::remove_file(&html);
        result?;

        if !png_abs.exists() {
            return Err(RasterError::MissingOutput(png_abs));
        }
        Ok(())
    }
}

/// Run a rasterizer, logging the cause on failure.
///
/// The SVG is left in place either way.
pub fn rasterize_or_report(rasterizer: &dyn Rasterizer, svg: &Path, png: &Path, width: u32, height: u32) -> bool {
    match rasterizer.rasterize(svg, png, width, height) {
        Ok(()) => {
            log::info!("Wrote {}", png.display());
            true
        }
        Err(e) => {
            log::error!("PNG conversion failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Rasterizer for Failing {
        fn rasterize(&self, _: &Path, _: &Path, _: u32, _: u32) -> Result<(), RasterError> {
            Err(RasterError::Timeout(Duration::from_secs(1)))
        }
    }

    #[test]
    fn test_wrapper_embeds_svg() {
        let html = html_wrapper("<svg></svg>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<body>\n<svg></svg>\n</body>"));
        assert!(html.contains("margin: 0"));
    }

    #[test]
    fn test_args_size_viewport_and_settle() {
        let r = ChromiumRasterizer::from_settings(&OgpSettings::default());
        let args = r.args(Path::new("/tmp/a.html"), Path::new("/tmp/a.png"), 1200, 630);
        assert!(args.contains(&"--window-size=1200,630".to_string()));
        assert!(args.contains(&"--virtual-time-budget=2000".to_string()));
        assert!(args.contains(&"--screenshot=/tmp/a.png".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("file:///tmp/a.html"));
    }

    #[test]
    fn test_failure_reported_and_svg_kept() {
        let dir = std::env::temp_dir().join(format!("streakfield-raster-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let svg = dir.join("x.svg");
        std::fs::write(&svg, "<svg/>").unwrap();

        assert!(!rasterize_or_report(&Failing, &svg, &dir.join("x.png"), 10, 10));
        assert!(svg.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_browser_is_launch_error() {
        let dir = std::env::temp_dir().join(format!("streakfield-launch-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let svg = dir.join("x.svg");
        std::fs::write(&svg, "<svg/>").unwrap();

        let r = ChromiumRasterizer {
            browser: "streakfield-no-such-browser".to_string(),
            settle: Duration::from_millis(0),
            timeout: Duration::from_secs(1),
        };
        let err = r.rasterize(&svg, &dir.join("x.png"), 10, 10).unwrap_err();
        assert!(matches!(err, RasterError::Launch { .. }));
        assert!(svg.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_stale_png_is_not_success() {
        let dir = std::env::temp_dir().join(format!("streakfield-stale-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let svg = dir.join("x.svg");
        let png = dir.join("x.png");
        std::fs::write(&svg, "<svg/>").unwrap();
        std::fs::write(&png, "old run").unwrap();

        // `true` exits 0 without writing a screenshot
        let r = ChromiumRasterizer {
            browser: "true".to_string(),
            settle: Duration::from_millis(0),
            timeout: Duration::from_secs(5),
        };
        let err = r.rasterize(&svg, &png, 10, 10).unwrap_err();
        assert!(matches!(err, RasterError::MissingOutput(_)));
        assert!(!png.exists());
        assert!(svg.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
