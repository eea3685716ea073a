//! lotwatch
//!
//! Live parking-lot monitor client. Polls a remote detection service for
//! frame + occupancy snapshots, decouples the jittery network arrival rate
//! from the display-clocked presentation rate through a bounded drop-oldest
//! buffer, and composites per-space polygon overlays onto a resizable
//! display surface.
//!
//! # Architecture
//!
//! Data flow: polling loop → frame buffer → presentation scheduler →
//! overlay compositor, with the resize reactor re-rendering the overlay
//! from the last presented snapshot when the surface size changes.
//!
//! Everything runs on one logical thread: the poll loop and the scheduler
//! advance via explicit `tick(now)` / `on_refresh(now)` calls from the
//! embedding loop, so there is no shared-state locking and tests control
//! the clock.
//!
//! # Module structure
//!
//! - `snapshot`: the per-poll data model (image, statuses, polygons, counters)
//! - `wire`: the detection service's JSON payloads
//! - `client`: `DetectionService` trait + HTTP implementation
//! - `buffer`: bounded drop-oldest frame buffer
//! - `poll`: poll/backoff/retry state machine
//! - `present`: display-clocked presentation scheduler
//! - `overlay`: coordinate mapping and polygon compositor
//! - `resize`: surface-size change reactor
//! - `printer`: ESC/POS entry-receipt emitter
//! - `svg`: headless `DrawSurface` rendering to SVG

pub mod buffer;
pub mod client;
pub mod config;
pub mod overlay;
pub mod poll;
pub mod present;
pub mod printer;
pub mod resize;
pub mod snapshot;
pub mod svg;
pub mod ui;
pub mod wire;

pub use buffer::{FrameBuffer, DEFAULT_BUFFER_CAPACITY};
pub use client::{DetectionService, HttpDetectionClient};
pub use config::{DisplaySettings, LotwatchdConfig};
pub use overlay::{DisplayTransform, DrawSurface, OverlayCompositor, Rgb};
pub use poll::{PollLoop, PollState, PollTiming};
pub use present::{PresentationScheduler, PresentationSink};
pub use printer::{render_receipt, ReceiptPrinter, TicketRecord};
pub use resize::ResizeReactor;
pub use snapshot::{Snapshot, SourceDimensions, SpaceCounters, SpacePolygon};
pub use svg::SvgSurface;
pub use wire::FrameResponse;
