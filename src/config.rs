use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::poll::PollTiming;

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;
const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;
const DEFAULT_START_RETRY_INTERVAL_MS: u64 = 2000;
const DEFAULT_BUFFER_CAPACITY: usize = 3;
const DEFAULT_MAX_FPS: u32 = 30;
const DEFAULT_SURFACE_WIDTH: f64 = 1280.0;
const DEFAULT_SURFACE_HEIGHT: f64 = 720.0;
const DEFAULT_SPOOL_DIR: &str = "lotwatch-spool";

#[derive(Debug, Deserialize, Default)]
struct LotwatchdConfigFile {
    service_url: Option<String>,
    poll: Option<PollConfigFile>,
    buffer_capacity: Option<usize>,
    display: Option<DisplayConfigFile>,
    spool_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct PollConfigFile {
    frame_interval_ms: Option<u64>,
    retry_interval_ms: Option<u64>,
    start_retry_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DisplayConfigFile {
    max_fps: Option<u32>,
    surface_width: Option<f64>,
    surface_height: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LotwatchdConfig {
    pub service_url: String,
    pub poll: PollTiming,
    pub buffer_capacity: usize,
    pub display: DisplaySettings,
    pub spool_dir: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct DisplaySettings {
    pub max_fps: u32,
    pub surface_width: f64,
    pub surface_height: f64,
}

impl LotwatchdConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("LOTWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: LotwatchdConfigFile) -> Self {
        let poll = PollTiming {
            frame_interval: Duration::from_millis(
                file.poll
                    .as_ref()
                    .and_then(|p| p.frame_interval_ms)
                    .unwrap_or(DEFAULT_FRAME_INTERVAL_MS),
            ),
            retry_interval: Duration::from_millis(
                file.poll
                    .as_ref()
                    .and_then(|p| p.retry_interval_ms)
                    .unwrap_or(DEFAULT_RETRY_INTERVAL_MS),
            ),
            start_retry_interval: Duration::from_millis(
                file.poll
                    .as_ref()
                    .and_then(|p| p.start_retry_interval_ms)
                    .unwrap_or(DEFAULT_START_RETRY_INTERVAL_MS),
            ),
        };
        let display = DisplaySettings {
            max_fps: file
                .display
                .as_ref()
                .and_then(|d| d.max_fps)
                .unwrap_or(DEFAULT_MAX_FPS),
            surface_width: file
                .display
                .as_ref()
                .and_then(|d| d.surface_width)
                .unwrap_or(DEFAULT_SURFACE_WIDTH),
            surface_height: file
                .display
                .as_ref()
                .and_then(|d| d.surface_height)
                .unwrap_or(DEFAULT_SURFACE_HEIGHT),
        };
        Self {
            service_url: file
                .service_url
                .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string()),
            poll,
            buffer_capacity: file.buffer_capacity.unwrap_or(DEFAULT_BUFFER_CAPACITY),
            display,
            spool_dir: file
                .spool_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SPOOL_DIR)),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("LOTWATCH_SERVICE_URL") {
            if !url.trim().is_empty() {
                self.service_url = url;
            }
        }
        if let Ok(capacity) = std::env::var("LOTWATCH_BUFFER_CAPACITY") {
            self.buffer_capacity = capacity
                .parse()
                .map_err(|_| anyhow!("LOTWATCH_BUFFER_CAPACITY must be an integer"))?;
        }
        if let Ok(fps) = std::env::var("LOTWATCH_MAX_FPS") {
            self.display.max_fps = fps
                .parse()
                .map_err(|_| anyhow!("LOTWATCH_MAX_FPS must be an integer"))?;
        }
        if let Ok(size) = std::env::var("LOTWATCH_SURFACE_SIZE") {
            let (width, height) = parse_surface_size(&size)?;
            self.display.surface_width = width;
            self.display.surface_height = height;
        }
        if let Ok(dir) = std::env::var("LOTWATCH_SPOOL_DIR") {
            if !dir.trim().is_empty() {
                self.spool_dir = PathBuf::from(dir);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.service_url)
            .map_err(|e| anyhow!("invalid service_url '{}': {}", self.service_url, e))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(anyhow!(
                    "service_url scheme must be http(s), got '{}'",
                    other
                ))
            }
        }
        if self.buffer_capacity == 0 {
            return Err(anyhow!("buffer_capacity must be at least 1"));
        }
        if self.poll.frame_interval.is_zero()
            || self.poll.retry_interval.is_zero()
            || self.poll.start_retry_interval.is_zero()
        {
            return Err(anyhow!("poll intervals must be greater than zero"));
        }
        if self.display.max_fps == 0 {
            return Err(anyhow!("display max_fps must be at least 1"));
        }
        if self.display.surface_width <= 0.0 || self.display.surface_height <= 0.0 {
            return Err(anyhow!("display surface size must be positive"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<LotwatchdConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_surface_size(value: &str) -> Result<(f64, f64)> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| anyhow!("LOTWATCH_SURFACE_SIZE must look like 1280x720"))?;
    let width: f64 = w
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid surface width '{}'", w))?;
    let height: f64 = h
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid surface height '{}'", h))?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_parses_width_by_height() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280.0, 720.0));
        assert_eq!(parse_surface_size(" 320 x 480 ").unwrap(), (320.0, 480.0));
        assert!(parse_surface_size("1280").is_err());
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = LotwatchdConfig::from_file(LotwatchdConfigFile::default());
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg.buffer_capacity, 3);
        assert_eq!(cfg.poll.frame_interval, Duration::from_millis(33));
        assert_eq!(cfg.poll.retry_interval, Duration::from_millis(1000));
        assert_eq!(cfg.poll.start_retry_interval, Duration::from_millis(2000));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut cfg = LotwatchdConfig::from_file(LotwatchdConfigFile::default());
        cfg.buffer_capacity = 0;
        assert!(cfg.validate().is_err());
    }
}
