//! Wire types for the remote detection service.
//!
//! The service speaks JSON over plain HTTP GET:
//! - `/api/start-detection` and `/api/stop-detection` return an opaque
//!   success envelope; we only care about the HTTP status.
//! - `/api/frame` returns the payload modeled by [`FrameResponse`].
//!
//! The `spaces` field is a legacy map some service revisions still emit; it
//! is parsed and ignored in favor of `coordinates_data` + `statuses`.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;

use crate::snapshot::{Snapshot, SourceDimensions, SpaceCounters, SpacePolygon};

/// `GET /api/frame` response payload.
#[derive(Debug, Default, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded JPEG. Absent when the service has no new image this
    /// cycle.
    pub frame: Option<String>,
    /// Legacy per-space status map, superseded by `statuses`.
    #[serde(default)]
    pub spaces: Option<HashMap<String, SpaceEntry>>,
    #[serde(default)]
    pub coordinates_data: Vec<CoordinatesEntry>,
    pub dimensions: Option<WireDimensions>,
    /// Aligned by index to `coordinates_data`. `true` = free.
    #[serde(default)]
    pub statuses: Vec<bool>,
    #[serde(default)]
    pub total_spaces: u32,
    #[serde(default)]
    pub available_spaces: u32,
    #[serde(default)]
    pub occupied_spaces: u32,
}

#[derive(Debug, Deserialize)]
pub struct SpaceEntry {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesEntry {
    pub id: i64,
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub struct WireDimensions {
    pub width: f64,
    pub height: f64,
}

impl FrameResponse {
    /// Convert the wire payload into an owned [`Snapshot`].
    ///
    /// A frame field that fails base64 decoding is a parse failure; the poll
    /// loop treats it like any other transient error and retries.
    pub fn into_snapshot(self) -> Result<Snapshot> {
        let image = match self.frame {
            Some(encoded) => Some(
                BASE64
                    .decode(encoded.trim())
                    .context("decode base64 frame payload")?,
            ),
            None => None,
        };

        let polygons = self
            .coordinates_data
            .into_iter()
            .map(|entry| SpacePolygon {
                id: entry.id,
                points: entry
                    .coordinates
                    .into_iter()
                    .map(|[x, y]| (x, y))
                    .collect(),
            })
            .collect();

        Ok(Snapshot {
            image,
            statuses: self.statuses,
            polygons,
            dimensions: self.dimensions.map(|d| SourceDimensions {
                width: d.width,
                height: d.height,
            }),
            counters: SpaceCounters {
                total: self.total_spaces,
                available: self.available_spaces,
                occupied: self.occupied_spaces,
            },
        })
    }
}
