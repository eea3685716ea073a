//! lotwatchd - live parking-lot monitor daemon
//!
//! This daemon:
//! 1. Starts detection on the remote service and polls it for snapshots
//! 2. Buffers snapshots in a bounded drop-oldest frame buffer
//! 3. Presents frames at a display-clocked cadence (30 fps cap)
//! 4. Spools the latest JPEG and an SVG occupancy overlay to disk
//! 5. Reports occupancy counters and throughput on the terminal
//!
//! Runs headless: the spool directory holds `frame.jpg` and `overlay.svg`,
//! both replaced atomically, so any viewer can stack them.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lotwatch::present::PresentationSink;
use lotwatch::snapshot::SpaceCounters;
use lotwatch::ui::StatusLine;
use lotwatch::{
    FrameBuffer, HttpDetectionClient, LotwatchdConfig, OverlayCompositor, PollLoop,
    PresentationScheduler, SvgSurface,
};

/// Cooperative loop granularity. Small enough that poll deadlines and the
/// 30 fps presentation cadence are hit within a millisecond or two.
const TICK: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = LotwatchdConfig::load()?;
    std::fs::create_dir_all(&cfg.spool_dir)
        .with_context(|| format!("create spool dir {}", cfg.spool_dir.display()))?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("install ctrl-c handler")?;
    }

    let client = HttpDetectionClient::new(&cfg.service_url)?;
    let mut poll = PollLoop::new(client, cfg.poll);
    let mut buffer = FrameBuffer::with_capacity(cfg.buffer_capacity);
    let mut scheduler = PresentationScheduler::new(cfg.display.max_fps);
    let compositor = OverlayCompositor::default();
    let mut surface = SvgSurface::new(cfg.display.surface_width, cfg.display.surface_height);

    let status = StatusLine::from_env(std::io::stderr().is_terminal());
    let mut sink = SpoolSink::new(cfg.spool_dir.join("frame.jpg"));
    let overlay_path = cfg.spool_dir.join("overlay.svg");

    log::info!("lotwatchd polling {}", cfg.service_url);
    log::info!(
        "buffer capacity {} · surface {}x{} · {} fps cap · spool {}",
        cfg.buffer_capacity,
        cfg.display.surface_width,
        cfg.display.surface_height,
        cfg.display.max_fps,
        cfg.spool_dir.display()
    );

    poll.start(Instant::now());

    let mut last_health = Instant::now();
    loop {
        if stop.load(Ordering::SeqCst) {
            poll.stop();
            break;
        }

        let now = Instant::now();
        poll.tick(now, &mut buffer);
        scheduler.on_refresh(now, &mut buffer, &compositor, &mut surface, &mut sink);

        if last_health.elapsed() >= Duration::from_secs(1) {
            if let Err(e) = surface.write_to(&overlay_path) {
                log::warn!("overlay spool failed: {:#}", e);
            }
            status.update(sink.counters, scheduler.fps_estimate(), poll.last_error());
            log::debug!(
                "state={:?} buffer={} shown={} fps={}",
                poll.state(),
                buffer.len(),
                sink.frames_shown,
                scheduler.fps_estimate()
            );
            last_health = Instant::now();
        }

        std::thread::sleep(TICK);
    }

    status.finish();
    log::info!(
        "stopped after {} presented frames (last counters: {}/{} available)",
        sink.frames_shown,
        sink.counters.available,
        sink.counters.total
    );
    Ok(())
}

/// Presents frames by spooling the JPEG to disk. Validates that the payload
/// decodes before replacing the spooled file, so an undecodable frame trips
/// the scheduler's hide/re-show recovery instead of corrupting the spool.
struct SpoolSink {
    frame_path: PathBuf,
    visible: bool,
    counters: SpaceCounters,
    frames_shown: u64,
}

impl SpoolSink {
    fn new(frame_path: PathBuf) -> Self {
        Self {
            frame_path,
            visible: true,
            counters: SpaceCounters::default(),
            frames_shown: 0,
        }
    }
}

impl PresentationSink for SpoolSink {
    fn show_image(&mut self, image: &[u8]) -> Result<()> {
        image::load_from_memory_with_format(image, image::ImageFormat::Jpeg)
            .context("decode frame jpeg")?;
        if self.visible {
            let tmp = self.frame_path.with_extension("jpg.tmp");
            std::fs::write(&tmp, image)
                .with_context(|| format!("write frame to {}", tmp.display()))?;
            std::fs::rename(&tmp, &self.frame_path)
                .with_context(|| format!("move frame into place at {}", self.frame_path.display()))?;
        }
        self.frames_shown += 1;
        Ok(())
    }

    fn set_image_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            log::info!("image element re-shown");
        }
        self.visible = visible;
    }

    fn status_changed(&mut self, counters: SpaceCounters) {
        self.counters = counters;
        log::info!(
            "occupancy: total={} available={} occupied={}",
            counters.total,
            counters.available,
            counters.occupied
        );
    }
}
