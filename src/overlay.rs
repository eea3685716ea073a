//! Overlay compositor.
//!
//! Maps space polygons from detection-space units onto the current display
//! surface and strokes them colored by occupancy, with the space id drawn at
//! each polygon's centroid. The compositor owns the whole drawing surface:
//! every render clears first and redraws everything, so a redraw is
//! idempotent and no stale overlay can persist.
//!
//! Drawing goes through the [`DrawSurface`] capability trait so the
//! compositor has no concrete display binding and tests can record calls.

use crate::snapshot::{Snapshot, SourceDimensions};

/// Stroke/label color, 8-bit RGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Free spaces are stroked green, occupied red.
pub const FREE_COLOR: Rgb = Rgb(0x00, 0xff, 0x00);
pub const OCCUPIED_COLOR: Rgb = Rgb(0xff, 0x00, 0x00);
pub const LABEL_COLOR: Rgb = Rgb(0xff, 0xff, 0xff);

/// Minimal drawing-surface capability. The compositor needs nothing else
/// from the display layer.
pub trait DrawSurface {
    /// Current on-screen size in pixels (width, height).
    fn size(&self) -> (f64, f64);
    /// Erase all prior overlay content.
    fn clear(&mut self);
    /// Stroke a closed path through `points`.
    fn stroke_polygon(&mut self, points: &[(f64, f64)], color: Rgb);
    /// Draw `text` centered at (x, y).
    fn draw_label(&mut self, text: &str, x: f64, y: f64);
}

/// Per-redraw mapping from detection-space units to on-screen pixels.
///
/// Fits the source frame into the surface while preserving its aspect ratio
/// (letterbox/pillarbox, centered). Recomputed on every redraw; never cached
/// across a resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl DisplayTransform {
    /// Compute the transform, or `None` when either the surface or the
    /// source has zero area (avoids dividing by zero).
    pub fn fit(source: SourceDimensions, surface: (f64, f64)) -> Option<Self> {
        let (surface_w, surface_h) = surface;
        if surface_w <= 0.0 || surface_h <= 0.0 || source.width <= 0.0 || source.height <= 0.0 {
            return None;
        }

        let aspect = source.aspect();
        let mut display_w = surface_w;
        let mut display_h = surface_w / aspect;
        if display_h > surface_h {
            display_h = surface_h;
            display_w = surface_h * aspect;
        }

        Some(Self {
            scale_x: display_w / source.width,
            scale_y: display_h / source.height,
            offset_x: (surface_w - display_w) / 2.0,
            offset_y: (surface_h - display_h) / 2.0,
        })
    }

    pub fn apply(&self, point: (f64, f64)) -> (f64, f64) {
        (
            point.0 * self.scale_x + self.offset_x,
            point.1 * self.scale_y + self.offset_y,
        )
    }

    /// Scaled display size of the source frame, for placing the image
    /// element underneath the overlay.
    pub fn display_size(&self, source: SourceDimensions) -> (f64, f64) {
        (source.width * self.scale_x, source.height * self.scale_y)
    }
}

/// Redraws space polygons and labels for a snapshot.
#[derive(Clone, Copy, Debug)]
pub struct OverlayCompositor {
    pub free_color: Rgb,
    pub occupied_color: Rgb,
}

impl Default for OverlayCompositor {
    fn default() -> Self {
        Self {
            free_color: FREE_COLOR,
            occupied_color: OCCUPIED_COLOR,
        }
    }
}

impl OverlayCompositor {
    /// Clear the surface and redraw every polygon in `snapshot`, scaled from
    /// the snapshot's own source dimensions to the surface's current size.
    ///
    /// A snapshot without polygons or dimensions still clears, so prior
    /// overlay content never outlives the data it was drawn from. A surface
    /// with zero area is a no-op.
    pub fn render(&self, snapshot: &Snapshot, surface: &mut dyn DrawSurface) {
        let (surface_w, surface_h) = surface.size();
        if surface_w <= 0.0 || surface_h <= 0.0 {
            return;
        }

        surface.clear();

        let Some(dimensions) = snapshot.dimensions else {
            return;
        };
        let Some(transform) = DisplayTransform::fit(dimensions, (surface_w, surface_h)) else {
            return;
        };

        for (index, polygon) in snapshot.polygons.iter().enumerate() {
            if polygon.points.is_empty() {
                continue;
            }
            let scaled: Vec<(f64, f64)> = polygon
                .points
                .iter()
                .map(|&p| transform.apply(p))
                .collect();

            let color = if snapshot.status_at(index) {
                self.free_color
            } else {
                self.occupied_color
            };
            surface.stroke_polygon(&scaled, color);

            let n = scaled.len() as f64;
            let cx = scaled.iter().map(|p| p.0).sum::<f64>() / n;
            let cy = scaled.iter().map(|p| p.1).sum::<f64>() / n;
            surface.draw_label(&polygon.id.to_string(), cx, cy);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records draw calls for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub size: (f64, f64),
        pub clears: usize,
        pub polygons: Vec<(Vec<(f64, f64)>, Rgb)>,
        pub labels: Vec<(String, f64, f64)>,
    }

    impl RecordingSurface {
        pub fn new(width: f64, height: f64) -> Self {
            Self {
                size: (width, height),
                ..Self::default()
            }
        }
    }

    impl DrawSurface for RecordingSurface {
        fn size(&self) -> (f64, f64) {
            self.size
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.polygons.clear();
            self.labels.clear();
        }

        fn stroke_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
            self.polygons.push((points.to_vec(), color));
        }

        fn draw_label(&mut self, text: &str, x: f64, y: f64) {
            self.labels.push((text.to_string(), x, y));
        }
    }
}
