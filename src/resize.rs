//! Resize reactor.
//!
//! The embedder observes size changes of the container holding the display
//! surface and feeds them in here; the core never polls for size itself. On
//! a change, the overlay is redrawn from the most recently presented
//! snapshot at the new size, without waiting for a new snapshot. The poll
//! loop and frame buffer are never touched.

use crate::overlay::{DrawSurface, OverlayCompositor};
use crate::present::PresentationScheduler;

#[derive(Debug, Default)]
pub struct ResizeReactor {
    last_size: Option<(f64, f64)>,
}

impl ResizeReactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a size-change event. `surface` must already report the new
    /// size. A no-op if nothing has ever been presented or the size did not
    /// actually change.
    pub fn on_resize(
        &mut self,
        new_size: (f64, f64),
        scheduler: &PresentationScheduler,
        compositor: &OverlayCompositor,
        surface: &mut dyn DrawSurface,
    ) {
        if self.last_size == Some(new_size) {
            return;
        }
        self.last_size = Some(new_size);

        let Some(snapshot) = scheduler.last_presented() else {
            return;
        };
        compositor.render(snapshot, surface);
    }
}
