//! Defines the Axum routes and handlers of the simulated camera API.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::SimRig;
use crate::camera::models::{
    CameraStatus, FocusConfig, FocusElement, FocusMode, FocusStatus, MotorStatus, MotorType,
    ObjectConfig, PhotoFile, PhotoReceipt, PhotoRequest,
};

pub type AppState = Arc<Mutex<SimRig>>;

#[derive(Debug, Deserialize)]
pub struct AutofocusQuery {
    pub mode: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct FrameQuery {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub w: Option<i32>,
    pub h: Option<i32>,
    #[serde(rename = "type")]
    pub element: Option<FocusElement>,
}

#[derive(Debug, Deserialize)]
pub struct MoveQuery {
    pub mtype: Option<MotorType>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectQuery {
    pub x: Option<i32>,
    pub y: Option<i32>,
    #[serde(rename = "type")]
    pub element: Option<FocusElement>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    pub ev: Option<i32>,
    pub ex: Option<String>,
    pub iso: Option<u32>,
    pub aeb: Option<u32>,
}

/// Creates the Axum router with all the camera endpoints under `/api`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/autofocus", get(autofocus))
        .route("/api/frame", get(focus_frame))
        .route("/api/move", get(move_motor))
        .route("/api/object", get(focus_object))
        .route("/api/takephoto", get(take_photo))
        .route("/api/getphotos", get(get_photos))
        .with_state(state)
}

async fn get_status(State(rig): State<AppState>) -> Json<CameraStatus> {
    Json(rig.lock().await.status())
}

async fn autofocus(
    State(rig): State<AppState>,
    Query(query): Query<AutofocusQuery>,
) -> Result<Json<FocusStatus>, StatusCode> {
    let mode = query
        .mode
        .map(FocusMode::try_from)
        .transpose()
        .map_err(|e| {
            tracing::warn!("Rejected autofocus request: {}", e);
            StatusCode::BAD_REQUEST
        })?;
    Ok(Json(rig.lock().await.autofocus(mode)))
}

/// Updates the frame only when all five parameters are present.
async fn focus_frame(State(rig): State<AppState>, Query(query): Query<FrameQuery>) -> Json<FocusConfig> {
    let update = match query {
        FrameQuery {
            x: Some(frame_x),
            y: Some(frame_y),
            w: Some(frame_w),
            h: Some(frame_h),
            element: Some(element),
        } => Some(FocusConfig {
            element,
            frame_x,
            frame_y,
            frame_w,
            frame_h,
        }),
        _ => None,
    };
    Json(rig.lock().await.frame(update))
}

async fn move_motor(
    State(rig): State<AppState>,
    Query(query): Query<MoveQuery>,
) -> Result<Json<MotorStatus>, StatusCode> {
    match (query.mtype, query.position) {
        (Some(motor), Some(position)) => Ok(Json(rig.lock().await.move_motor(motor, position))),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

async fn focus_object(State(rig): State<AppState>, Query(query): Query<ObjectQuery>) -> Json<ObjectConfig> {
    let mut rig = rig.lock().await;
    match (query.x, query.y, query.element) {
        (Some(x), Some(y), Some(element)) => Json(rig.select_object(x, y, element)),
        _ => {
            let config = rig.focus_config;
            Json(rig.select_object(config.frame_x, config.frame_y, config.element))
        }
    }
}

async fn take_photo(
    State(rig): State<AppState>,
    Query(query): Query<PhotoQuery>,
) -> Result<Json<PhotoReceipt>, StatusCode> {
    let (Some(ev), Some(exposure), Some(iso), Some(aeb)) = (query.ev, query.ex, query.iso, query.aeb) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let request = PhotoRequest::new(ev, aeb, exposure, iso).map_err(|e| {
        tracing::warn!("Rejected capture request: {}", e);
        StatusCode::BAD_REQUEST
    })?;
    Ok(Json(rig.lock().await.take_photo(&request, chrono::Local::now())))
}

async fn get_photos(State(rig): State<AppState>) -> Json<Vec<PhotoFile>> {
    Json(rig.lock().await.photos())
}
