//! Remote detection service client.
//!
//! The poll loop talks to the service through the [`DetectionService`]
//! trait; [`HttpDetectionClient`] is the production implementation over
//! plain HTTP GET. Tests drive the loop with scripted implementations
//! instead of a network.

use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::time::Duration;
use url::Url;

use crate::snapshot::Snapshot;
use crate::wire::FrameResponse;

const MAX_FRAME_RESPONSE_BYTES: u64 = 16 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The remote service surface the core consumes.
pub trait DetectionService {
    /// One-time "begin detection" request.
    fn start_detection(&mut self) -> Result<()>;
    /// Fetch the latest frame+status snapshot.
    fn fetch_frame(&mut self) -> Result<Snapshot>;
    /// Best-effort "end detection" notification.
    fn stop_detection(&mut self) -> Result<()>;
}

/// HTTP implementation of [`DetectionService`].
pub struct HttpDetectionClient {
    base_url: Url,
    agent: ureq::Agent,
}

impl HttpDetectionClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).context("parse detection service url")?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(anyhow!(
                    "unsupported detection service scheme '{}'; expected http(s)",
                    other
                ))
            }
        }
        let agent = ureq::AgentBuilder::new()
            .timeout_read(REQUEST_TIMEOUT)
            .timeout_write(REQUEST_TIMEOUT)
            .build();
        Ok(Self { base_url, agent })
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(&format!("api/{}", name))
            .with_context(|| format!("build endpoint url for {}", name))
    }

    fn get(&self, name: &str) -> Result<ureq::Response> {
        let url = self.endpoint(name)?;
        self.agent
            .get(url.as_str())
            .call()
            .with_context(|| format!("GET {}", url))
    }
}

impl DetectionService for HttpDetectionClient {
    fn start_detection(&mut self) -> Result<()> {
        self.get("start-detection")?;
        Ok(())
    }

    fn fetch_frame(&mut self) -> Result<Snapshot> {
        let response = self.get("frame")?;
        let mut body = String::new();
        response
            .into_reader()
            .take(MAX_FRAME_RESPONSE_BYTES)
            .read_to_string(&mut body)
            .context("read frame response body")?;
        let frame: FrameResponse =
            serde_json::from_str(&body).context("parse frame response json")?;
        frame.into_snapshot()
    }

    fn stop_detection(&mut self) -> Result<()> {
        self.get("stop-detection")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_scheme() {
        assert!(HttpDetectionClient::new("udp://127.0.0.1:5000").is_err());
        assert!(HttpDetectionClient::new("http://127.0.0.1:5000").is_ok());
    }

    #[test]
    fn endpoint_joins_onto_base() {
        let client = HttpDetectionClient::new("http://127.0.0.1:5000/").expect("client");
        let url = client.endpoint("frame").expect("endpoint");
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/frame");
    }
}
