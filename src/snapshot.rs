//! Snapshot data model.
//!
//! A `Snapshot` is one poll cycle's complete result: the compressed still
//! image (if the service produced a new one this cycle), per-space occupancy
//! statuses, the space polygons in detection-space units, the frame size
//! those polygons were marked against, and the occupancy counters.
//!
//! Snapshots are immutable once received and owned exclusively by whichever
//! buffer slot currently holds them.

use serde::{Deserialize, Serialize};

/// Frame size in detection-space units. Space polygons were marked against
/// this size, independent of whatever size the display surface has now.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDimensions {
    pub width: f64,
    pub height: f64,
}

impl SourceDimensions {
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// One parking space outline in detection-space coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct SpacePolygon {
    pub id: i64,
    pub points: Vec<(f64, f64)>,
}

/// Occupancy counters as reported by the service.
///
/// Displayed verbatim: `available + occupied == total` is the service's
/// invariant to uphold, and we surface whatever it sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceCounters {
    pub total: u32,
    pub available: u32,
    pub occupied: u32,
}

/// One poll cycle's complete result.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Compressed still image bytes (JPEG). `None` means the service had no
    /// new image this cycle; the previously shown image stays up.
    pub image: Option<Vec<u8>>,
    /// Per-space status aligned by index to `polygons`. `true` = free.
    pub statuses: Vec<bool>,
    pub polygons: Vec<SpacePolygon>,
    /// Size the polygons were marked against. `None` disables overlay
    /// geometry for this snapshot (the overlay still clears).
    pub dimensions: Option<SourceDimensions>,
    pub counters: SpaceCounters,
}

impl Snapshot {
    /// Status for the polygon at `index`, defaulting to occupied when the
    /// service sent fewer statuses than polygons.
    pub fn status_at(&self, index: usize) -> bool {
        self.statuses.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio() {
        let dims = SourceDimensions {
            width: 640.0,
            height: 480.0,
        };
        assert!((dims.aspect() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn status_defaults_to_occupied_when_missing() {
        let snap = Snapshot {
            image: None,
            statuses: vec![true],
            polygons: vec![
                SpacePolygon {
                    id: 0,
                    points: vec![],
                },
                SpacePolygon {
                    id: 1,
                    points: vec![],
                },
            ],
            dimensions: None,
            counters: SpaceCounters::default(),
        };
        assert!(snap.status_at(0));
        assert!(!snap.status_at(1));
    }
}
