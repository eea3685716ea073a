//! Polling loop.
//!
//! Repeatedly requests the latest snapshot from the detection service and
//! pushes results into the frame buffer. Rather than chaining scheduled
//! continuations, the loop is an explicit state machine with exactly one
//! owned pending deadline, so `stop()` can deterministically cancel the one
//! outstanding continuation and guarantee no buffer mutation afterwards.
//!
//! Timing tiers:
//! - steady state: next poll 33 ms after a successful one (~30 req/s)
//! - poll failure: retry 1000 ms later (transient, loop keeps running)
//! - start failure: retry `start_detection` 2000 ms later, indefinitely
//!
//! All failures during normal operation are absorbed here and surfaced as an
//! observable error string; only an explicit `stop()` ends the loop.

use std::time::{Duration, Instant};

use crate::buffer::FrameBuffer;
use crate::client::DetectionService;

/// Process-wide poll lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    /// Not started yet.
    Idle,
    /// `start_detection` failed; waiting to retry it.
    Starting,
    /// Steady-state polling cadence.
    Polling,
    /// A poll failed; waiting out the backoff tier.
    Backoff,
    /// Explicitly stopped; no further transitions.
    Stopped,
}

/// Poll cadence configuration.
#[derive(Clone, Copy, Debug)]
pub struct PollTiming {
    /// Steady-state interval between successful polls.
    pub frame_interval: Duration,
    /// Backoff tier after a failed poll.
    pub retry_interval: Duration,
    /// Backoff tier after a failed `start_detection`.
    pub start_retry_interval: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            retry_interval: Duration::from_millis(1000),
            start_retry_interval: Duration::from_millis(2000),
        }
    }
}

pub struct PollLoop<S: DetectionService> {
    service: S,
    timing: PollTiming,
    state: PollState,
    /// The single outstanding continuation. At most one exists at a time;
    /// `stop()` clears it.
    next_attempt: Option<Instant>,
    last_error: Option<String>,
}

impl<S: DetectionService> PollLoop<S> {
    pub fn new(service: S, timing: PollTiming) -> Self {
        Self {
            service,
            timing,
            state: PollState::Idle,
            next_attempt: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// The transient-error message shown by the presentation layer, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When the next request is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_attempt
    }

    /// Issue the one-time "begin detection" request. On failure the loop
    /// retries the start indefinitely from `tick`.
    pub fn start(&mut self, now: Instant) {
        if self.state != PollState::Idle {
            return;
        }
        self.try_start(now);
    }

    /// Advance the loop if the pending deadline has elapsed. Successful
    /// polls push into `buffer`.
    pub fn tick(&mut self, now: Instant, buffer: &mut FrameBuffer) {
        let Some(deadline) = self.next_attempt else {
            return;
        };
        if now < deadline {
            return;
        }
        // The continuation fires exactly once; whatever happens next
        // schedules its own successor.
        self.next_attempt = None;

        match self.state {
            PollState::Starting => self.try_start(now),
            PollState::Polling | PollState::Backoff => self.try_poll(now, buffer),
            PollState::Idle | PollState::Stopped => {}
        }
    }

    /// Cancel the pending continuation and notify the service, best-effort.
    /// After this returns, no further buffer mutation can occur.
    pub fn stop(&mut self) {
        self.next_attempt = None;
        if self.state != PollState::Idle {
            if let Err(e) = self.service.stop_detection() {
                log::warn!("stop-detection notification failed: {:#}", e);
            }
        }
        self.state = PollState::Stopped;
    }

    fn try_start(&mut self, now: Instant) {
        match self.service.start_detection() {
            Ok(()) => {
                self.state = PollState::Polling;
                self.last_error = None;
                // First poll fires immediately.
                self.next_attempt = Some(now);
            }
            Err(e) => {
                log::warn!("start-detection failed: {:#}", e);
                self.state = PollState::Starting;
                self.last_error = Some("Failed to start detection. Retrying...".to_string());
                self.next_attempt = Some(now + self.timing.start_retry_interval);
            }
        }
    }

    fn try_poll(&mut self, now: Instant, buffer: &mut FrameBuffer) {
        match self.service.fetch_frame() {
            Ok(snapshot) => {
                buffer.push(snapshot);
                self.state = PollState::Polling;
                self.last_error = None;
                self.next_attempt = Some(now + self.timing.frame_interval);
            }
            Err(e) => {
                log::warn!("frame poll failed: {:#}", e);
                self.state = PollState::Backoff;
                self.last_error = Some("Connection error. Retrying...".to_string());
                self.next_attempt = Some(now + self.timing.retry_interval);
            }
        }
    }
}
