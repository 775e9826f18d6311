//! Camera-control API client.
//!
//! [`CameraApi`] is the seam the panel view-model talks to; [`HttpCameraClient`]
//! implements it against the camera service's REST endpoints.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::models::{
    CameraStatus, FocusConfig, FocusElement, FocusMode, FocusStatus, MotorStatus, MotorType,
    ObjectConfig, PhotoFile, PhotoReceipt, PhotoRequest,
};
use crate::config::ApiConfig;
use crate::error::{CameraError, CameraResult};

/// Operations offered by the remote camera-control service.
#[async_trait]
pub trait CameraApi: Send + Sync {
    async fn camera_status(&self) -> CameraResult<CameraStatus>;
    async fn focus_status(&self) -> CameraResult<FocusStatus>;
    async fn set_focus_mode(&self, mode: FocusMode) -> CameraResult<FocusStatus>;
    async fn focus_frame(&self) -> CameraResult<FocusConfig>;
    /// Send an already clamped frame; the camera echoes what it stored.
    async fn set_focus_frame(&self, config: FocusConfig) -> CameraResult<FocusConfig>;
    async fn move_motor(&self, motor: MotorType, position: i32) -> CameraResult<MotorStatus>;
    async fn set_focus_object(&self, x: i32, y: i32, element: FocusElement) -> CameraResult<ObjectConfig>;
    async fn take_photo(&self, request: &PhotoRequest) -> CameraResult<PhotoReceipt>;
    async fn list_photos(&self) -> CameraResult<Vec<PhotoFile>>;
}

/// `CameraApi` over HTTP. All calls are `GET` with query parameters.
#[derive(Debug, Clone)]
pub struct HttpCameraClient {
    client: Client,
    base_url: Url,
}

impl HttpCameraClient {
    pub fn new(base_url: &str, timeout: Duration) -> CameraResult<Self> {
        // Url::join drops the last path segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| CameraError::request_failed(base_url, e))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CameraError::request_failed(base_url.as_str(), e))?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> CameraResult<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> CameraResult<T> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| CameraError::request_failed(endpoint, e))?;
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| CameraError::request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Camera API '{}' answered {}", endpoint, status);
            return Err(CameraError::request_failed(endpoint, format!("HTTP {}", status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CameraError::request_failed(endpoint, e))
    }
}

#[async_trait]
impl CameraApi for HttpCameraClient {
    async fn camera_status(&self) -> CameraResult<CameraStatus> {
        self.get("status", &[]).await
    }

    async fn focus_status(&self) -> CameraResult<FocusStatus> {
        self.get("autofocus", &[]).await
    }

    async fn set_focus_mode(&self, mode: FocusMode) -> CameraResult<FocusStatus> {
        self.get("autofocus", &[("mode", mode.code().to_string())]).await
    }

    async fn focus_frame(&self) -> CameraResult<FocusConfig> {
        self.get("frame", &[]).await
    }

    async fn set_focus_frame(&self, config: FocusConfig) -> CameraResult<FocusConfig> {
        let query = [
            ("x", config.frame_x.to_string()),
            ("y", config.frame_y.to_string()),
            ("w", config.frame_w.to_string()),
            ("h", config.frame_h.to_string()),
            ("type", config.element.to_string()),
        ];
        self.get("frame", &query).await
    }

    async fn move_motor(&self, motor: MotorType, position: i32) -> CameraResult<MotorStatus> {
        let query = [("mtype", motor.to_string()), ("position", position.to_string())];
        self.get("move", &query).await
    }

    async fn set_focus_object(&self, x: i32, y: i32, element: FocusElement) -> CameraResult<ObjectConfig> {
        let query = [("x", x.to_string()), ("y", y.to_string()), ("type", element.to_string())];
        self.get("object", &query).await
    }

    async fn take_photo(&self, request: &PhotoRequest) -> CameraResult<PhotoReceipt> {
        let query = [
            ("ev", request.ev.to_string()),
            ("ex", request.exposure.clone()),
            ("iso", request.iso.to_string()),
            ("aeb", request.aeb.to_string()),
        ];
        self.get("takephoto", &query).await
    }

    async fn list_photos(&self) -> CameraResult<Vec<PhotoFile>> {
        self.get("getphotos", &[]).await
    }
}
