//! Presentation scheduler.
//!
//! Drains the frame buffer at a rate tied to display refresh. Refresh
//! callbacks can fire faster than the intended 30 fps ceiling; without the
//! rate cap a backlog would drain in one visually jarring burst, so a
//! snapshot is presented only when the minimum inter-presentation interval
//! has elapsed.
//!
//! Presenting a snapshot means: update the shown image (when the snapshot
//! carries one), emit the status callback if the counters changed, trigger
//! the overlay compositor, and cache the snapshot for resize-driven
//! redraws. The throughput estimate recomputed on each presentation is
//! advisory telemetry only.

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::buffer::FrameBuffer;
use crate::overlay::{DrawSurface, OverlayCompositor};
use crate::snapshot::{Snapshot, SpaceCounters};

/// Delay before re-showing the image element after a rendering failure.
const IMAGE_RECOVERY_DELAY: Duration = Duration::from_millis(1000);

/// Where presented frames and status changes go. The surrounding UI chrome
/// consumes only this surface.
pub trait PresentationSink {
    /// Update the shown image. An error here (e.g. an undecodable payload)
    /// is recovered locally by the scheduler; it never tears down the poll
    /// loop.
    fn show_image(&mut self, image: &[u8]) -> Result<()>;
    /// Hide or re-show the image element.
    fn set_image_visible(&mut self, visible: bool);
    /// Invoked on every counter change, verbatim from the service.
    fn status_changed(&mut self, counters: SpaceCounters);
}

pub struct PresentationScheduler {
    min_present_interval: Duration,
    last_present_at: Option<Instant>,
    last_presented: Option<Snapshot>,
    last_counters: Option<SpaceCounters>,
    image_hidden_until: Option<Instant>,
    fps_estimate: u32,
}

impl PresentationScheduler {
    pub fn new(max_fps: u32) -> Self {
        let max_fps = max_fps.max(1);
        Self {
            min_present_interval: Duration::from_secs(1) / max_fps,
            last_present_at: None,
            last_presented: None,
            last_counters: None,
            image_hidden_until: None,
            fps_estimate: 0,
        }
    }

    /// The snapshot shown right now, cached for resize-driven redraws.
    pub fn last_presented(&self) -> Option<&Snapshot> {
        self.last_presented.as_ref()
    }

    /// Frames shown per second, recomputed from inter-presentation time.
    pub fn fps_estimate(&self) -> u32 {
        self.fps_estimate
    }

    /// Run one display-refresh tick. Returns whether to re-arm for the next
    /// refresh callback: `true` while the buffer is non-empty, `false` once
    /// it drains (the next `push` wakes the scheduler again).
    pub fn on_refresh(
        &mut self,
        now: Instant,
        buffer: &mut FrameBuffer,
        compositor: &OverlayCompositor,
        surface: &mut dyn DrawSurface,
        sink: &mut dyn PresentationSink,
    ) -> bool {
        if let Some(reshow_at) = self.image_hidden_until {
            if now >= reshow_at {
                sink.set_image_visible(true);
                self.image_hidden_until = None;
            }
        }

        if buffer.is_empty() {
            return false;
        }
        if let Some(last) = self.last_present_at {
            if now.duration_since(last) < self.min_present_interval {
                return true;
            }
        }

        let Some(snapshot) = buffer.pop_oldest() else {
            return false;
        };

        // Image first, then overlay, so the overlay always sits on top of
        // the frame it was computed from.
        if let Some(image) = snapshot.image.as_deref() {
            if let Err(e) = sink.show_image(image) {
                log::warn!("image update failed, hiding element: {:#}", e);
                sink.set_image_visible(false);
                self.image_hidden_until = Some(now + IMAGE_RECOVERY_DELAY);
            }
        }

        if self.last_counters != Some(snapshot.counters) {
            sink.status_changed(snapshot.counters);
            self.last_counters = Some(snapshot.counters);
        }

        compositor.render(&snapshot, surface);

        if let Some(last) = self.last_present_at {
            let dt_ms = now.duration_since(last).as_secs_f64() * 1000.0;
            if dt_ms > 0.0 {
                self.fps_estimate = (1000.0 / dt_ms).round() as u32;
            }
        }
        self.last_present_at = Some(now);
        self.last_presented = Some(snapshot);

        !buffer.is_empty()
    }
}
