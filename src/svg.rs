//! SVG drawing surface.
//!
//! The daemon runs headless, so the overlay is rendered into an SVG
//! document next to the spooled JPEG; any static page (or a curious
//! operator) can stack the two. Implements the compositor's [`DrawSurface`]
//! capability.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::overlay::{DrawSurface, Rgb, LABEL_COLOR};

pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    /// Change the reported size. Clears nothing by itself; the next render
    /// clears and redraws at the new size.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// The complete SVG document for the current overlay content.
    pub fn document(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" \
             viewBox=\"0 0 {:.0} {:.0}\">\n{}</svg>\n",
            self.width, self.height, self.width, self.height, self.body
        )
    }

    /// Write the document atomically (temp file + rename) so a reader never
    /// sees a half-written overlay.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("svg.tmp");
        std::fs::write(&tmp, self.document())
            .with_context(|| format!("write overlay to {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("move overlay into place at {}", path.display()))?;
        Ok(())
    }
}

impl DrawSurface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.body.clear();
    }

    fn stroke_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        let mut attr = String::new();
        for (i, (x, y)) in points.iter().enumerate() {
            if i > 0 {
                attr.push(' ');
            }
            let _ = write!(attr, "{:.1},{:.1}", x, y);
        }
        let _ = writeln!(
            self.body,
            "  <polygon points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
            attr,
            color.to_hex()
        );
    }

    fn draw_label(&mut self, text: &str, x: f64, y: f64) {
        let _ = writeln!(
            self.body,
            "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"16\" \
             text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            x,
            y,
            LABEL_COLOR.to_hex(),
            text
        );
    }
}
