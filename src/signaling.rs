//! HTTP client for the media gateway.
//!
//! The gateway terminates WebRTC signaling for every camera on the farm:
//! one POST carrying the local SDP offer returns the remote answer. The
//! client performs a single request/response exchange and never retries;
//! retry policy belongs to the session supervisors.

use crate::config::GatewayConfig;
use crate::errors::StreamError;
use crate::types::CameraSource;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-Api-Key";
const SDP_CONTENT_TYPE: &str = "application/sdp";

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    enabled: bool,
}

/// One client per gateway; cheap to clone via the inner connection pool.
#[derive(Debug, Clone)]
pub struct SignalingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bearer_token: Option<String>,
}

impl SignalingClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| StreamError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Endpoint for a camera-scoped path, e.g. `camera_url("cam-1", "webrtc")`.
    fn camera_url(&self, camera_id: &str, tail: &str) -> String {
        format!("{}/cameras/{}/{}", self.base_url, camera_id, tail)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(API_KEY_HEADER, &self.api_key);
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Perform the one-shot offer/answer exchange for a camera.
    ///
    /// The offer must already be set as the caller's local description. On
    /// a 200 the body is returned verbatim as the remote answer; any other
    /// outcome is a signaling failure.
    pub async fn negotiate(&self, camera_id: &str, offer_sdp: &str) -> Result<String, StreamError> {
        let url = self.camera_url(camera_id, "webrtc");
        log::debug!("Posting SDP offer for camera {} to {}", camera_id, url);

        let response = self
            .authed(self.http.post(&url))
            .header(reqwest::header::CONTENT_TYPE, SDP_CONTENT_TYPE)
            .body(offer_sdp.to_string())
            .send()
            .await
            .map_err(|e| {
                StreamError::signaling(format!("offer exchange for camera {}: {}", camera_id, e))
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(StreamError::signaling(format!(
                "gateway returned {} for camera {}",
                status.as_u16(),
                camera_id
            )));
        }

        response.text().await.map_err(|e| {
            StreamError::signaling(format!("reading answer for camera {}: {}", camera_id, e))
        })
    }

    /// Fetch all cameras the caller may view.
    pub async fn list_cameras(&self) -> Result<Vec<CameraSource>, StreamError> {
        let url = format!("{}/cameras", self.base_url);

        let response = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| StreamError::gateway(format!("listing cameras: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::gateway(format!(
                "camera list returned {}",
                status.as_u16()
            )));
        }

        response
            .json::<Vec<CameraSource>>()
            .await
            .map_err(|e| StreamError::gateway(format!("decoding camera list: {}", e)))
    }

    /// Flip a camera's enablement flag; returns the updated flag.
    pub async fn toggle_camera(&self, camera_id: &str) -> Result<bool, StreamError> {
        let url = self.camera_url(camera_id, "toggle");
        log::info!("Toggling camera {}", camera_id);

        let response = self
            .authed(self.http.patch(&url))
            .send()
            .await
            .map_err(|e| StreamError::gateway(format!("toggling camera {}: {}", camera_id, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::gateway(format!(
                "toggle for camera {} returned {}",
                camera_id,
                status.as_u16()
            )));
        }

        let toggled: ToggleResponse = response
            .json()
            .await
            .map_err(|e| StreamError::gateway(format!("decoding toggle response: {}", e)))?;
        Ok(toggled.enabled)
    }

    /// Fetch a still frame for a camera; backs the picture-in-picture player.
    pub async fn fetch_snapshot(&self, camera_id: &str) -> Result<Bytes, StreamError> {
        let url = self.camera_url(camera_id, "snapshot");

        let response = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| StreamError::gateway(format!("snapshot for camera {}: {}", camera_id, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::gateway(format!(
                "snapshot for camera {} returned {}",
                camera_id,
                status.as_u16()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| StreamError::gateway(format!("reading snapshot body: {}", e)))
    }
}
