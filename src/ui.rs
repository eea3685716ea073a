use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::snapshot::SpaceCounters;

#[derive(Clone, Copy, Debug)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

/// Live terminal status line for the daemon: occupancy counters, measured
/// throughput, and the transient "retrying" indicator.
pub struct StatusLine {
    bar: Option<ProgressBar>,
}

impl StatusLine {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        let use_pretty = match mode {
            UiMode::Pretty => true,
            UiMode::Plain => false,
            UiMode::Auto => is_tty,
        };
        let bar = if use_pretty {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_message("waiting for first frame…");
            Some(spinner)
        } else {
            None
        };
        Self { bar }
    }

    pub fn from_env(is_tty: bool) -> Self {
        let mode = match std::env::var("LOTWATCH_UI").as_deref() {
            Ok("plain") => UiMode::Plain,
            Ok("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    pub fn update(&self, counters: SpaceCounters, fps: u32, error: Option<&str>) {
        let message = match error {
            Some(error) => format!(
                "available {}/{} · occupied {} · {} fps · {}",
                counters.available, counters.total, counters.occupied, fps, error
            ),
            None => format!(
                "available {}/{} · occupied {} · {} fps",
                counters.available, counters.total, counters.occupied, fps
            ),
        };
        match &self.bar {
            Some(bar) => bar.set_message(message),
            None => log::info!("{}", message),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
