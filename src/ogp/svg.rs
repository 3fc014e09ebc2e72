//! OGP SVG document
//!
//! Fixed layout: hue bands, the seeded star field, a translucent footer, the
//! site caption and the seed token label.

use std::fmt::Write;

use crate::settings::OgpSettings;
use crate::sim::{FieldElement, FieldError, SeededSequence, generate_all};

/// Footer and label styling
const FOOTER_FILL: &str = "#2a2b2e";
const FOOTER_OPACITY: f32 = 0.8;
const CAPTION_FONT_SIZE: u32 = 90;
const CAPTION_OPACITY: f32 = 0.9;
const CAPTION_MARGIN: u32 = 50;
const TOKEN_FONT_SIZE: u32 = 24;
const TOKEN_COLOR: &str = "#888888";
const TOKEN_OPACITY: f32 = 0.7;
/// Label is placed this far from the right edge
const TOKEN_INSET: u32 = 220;
const TOKEN_LABEL: &str = "commit: ";
const BAND_SATURATION: u32 = 60;
const BAND_LIGHTNESS: u32 = 20;

/// Escape text for XML content and attributes
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generated preview image, ready to serialize
#[derive(Debug, Clone)]
pub struct OgpDocument {
    pub settings: OgpSettings,
    pub token: String,
    pub stars: Vec<FieldElement>,
}

impl OgpDocument {
    /// Generate the star field for `token` (already normalized)
    pub fn generate(settings: &OgpSettings, token: &str) -> Result<Self, FieldError> {
        let mut seq = SeededSequence::from_token(token);
        let stars = generate_all(&settings.classes, &settings.domain(), &mut seq)?;
        Ok(Self {
            settings: settings.clone(),
            token: token.to_string(),
            stars,
        })
    }

    /// Hue of band `i`, evenly spread over 360 degrees
    pub fn band_hue(&self, i: u32) -> f32 {
        360.0 / self.settings.band_count as f32 * i as f32
    }

    /// Serialize to SVG
    pub fn render(&self) -> String {
        let s = &self.settings;
        let (w, h) = (s.width, s.height);
        let mut svg = String::with_capacity(96 * (self.stars.len() + s.band_count as usize) + 2048);

        // Writing to a String cannot fail
        let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            svg,
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#
        );
        let _ = writeln!(svg, "  <defs>");
        let _ = writeln!(svg, "    <style>");
        let _ = writeln!(svg, "      @import url('{}');", escape_xml(&s.font_url));
        let _ = writeln!(svg, "    </style>");
        let _ = writeln!(svg, r#"    <filter id="glow">"#);
        let _ = writeln!(svg, r#"      <feGaussianBlur stdDeviation="3" result="coloredBlur"/>"#);
        let _ = writeln!(svg, "      <feMerge>");
        let _ = writeln!(svg, r#"        <feMergeNode in="coloredBlur"/>"#);
        let _ = writeln!(svg, r#"        <feMergeNode in="SourceGraphic"/>"#);
        let _ = writeln!(svg, "      </feMerge>");
        let _ = writeln!(svg, "    </filter>");
        let _ = writeln!(svg, "  </defs>");

        let band_width = w as f32 / s.band_count as f32;
        for i in 0..s.band_count {
            let _ = writeln!(
                svg,
                r#"  <rect x="{}" y="0" width="{}" height="{h}" fill="hsl({}, {BAND_SATURATION}%, {BAND_LIGHTNESS}%)" />"#,
                band_width * i as f32,
                band_width,
                self.band_hue(i),
            );
        }

        for star in &self.stars {
            let _ = writeln!(
                svg,
                r#"  <circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" opacity="{:.2}" />"#,
                star.position.x,
                star.position.y,
                star.size,
                star.color.css(),
                star.opacity,
            );
        }

        let footer_height = h as f32 / 4.0;
        let _ = writeln!(
            svg,
            r#"  <rect width="{w}" height="{footer_height}" y="{}" fill="{FOOTER_FILL}" opacity="{FOOTER_OPACITY}" />"#,
            h as f32 - footer_height,
        );

        let font = escape_xml(&s.font_family);
        let _ = writeln!(
            svg,
            r##"  <text x="{}" y="{}" font-family="{font}" font-size="{CAPTION_FONT_SIZE}" fill="#ffffff" stroke="#ffffff" stroke-width="1" opacity="{CAPTION_OPACITY}" text-anchor="end" dominant-baseline="text-bottom">{}</text>"##,
            w.saturating_sub(CAPTION_MARGIN),
            h.saturating_sub(CAPTION_MARGIN),
            escape_xml(&s.caption),
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" font-family="{font}" font-size="{TOKEN_FONT_SIZE}" fill="{TOKEN_COLOR}" opacity="{TOKEN_OPACITY}" text-anchor="start" dominant-baseline="text-bottom">{TOKEN_LABEL}{}</text>"#,
            w.saturating_sub(TOKEN_INSET),
            h.saturating_sub(5),
            escape_xml(&self.token),
        );
        svg.push_str("</svg>\n");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(token: &str) -> OgpDocument {
        OgpDocument::generate(&OgpSettings::default(), token).unwrap()
    }

    #[test]
    fn test_counts_and_layout() {
        let d = doc("abc1234");
        let svg = d.render();
        assert_eq!(d.stars.len(), 1805);
        assert_eq!(svg.matches("<circle ").count(), 1805);
        // 12 bands + footer
        assert_eq!(svg.matches("<rect ").count(), 13);
        assert!(svg.contains(r#"width="1200" height="630" viewBox="0 0 1200 630""#));
        assert!(svg.contains("hsl(330, 60%, 20%)"));
        assert!(svg.contains(">commit: abc1234</text>"));
        assert!(svg.contains(">tropical-362827</text>"));
        assert!(svg.contains("@import url('https://fonts.googleapis.com/css2?family=Source+Code+Pro:ital,wght@0,200;1,200&amp;display=swap')"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_class_order_in_output() {
        let d = doc("abc1234");
        assert!(d.stars[..5].iter().all(|s| s.color.css() == "blue"));
        assert!(d.stars[5..].iter().all(|s| s.color.css() == "white"));
        for star in &d.stars {
            assert!(star.position.x >= 0.0 && star.position.x < 1200.0);
            assert!(star.position.y >= 0.0 && star.position.y < 630.0);
        }
    }

    #[test]
    fn test_same_token_same_document() {
        assert_eq!(doc("abc1234").render(), doc("abc1234").render());
        assert_ne!(doc("abc1234").render(), doc("fff0000").render());
        // Fallback token is itself deterministic
        assert_eq!(doc("dev").render(), doc("dev").render());
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        let mut settings = OgpSettings::default();
        settings.caption = "<b>".to_string();
        settings.classes.clear();
        let svg = OgpDocument::generate(&settings, "dev").unwrap().render();
        assert!(svg.contains(">&lt;b&gt;</text>"));
    }
}
