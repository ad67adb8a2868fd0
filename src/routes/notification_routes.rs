// src/routes/notification_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    error::ApiError,
    models::{AppState, StatusResponse},
    store::NotificationStore,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{mobile_user_id}", get(list))
        .route("/read/{notification_id}", post(mark_read))
        .route("/clear/{mobile_user_id}", post(clear))
}

/* ============================================================
   GET /api/notifications/{mobile_user_id}
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct NotificationDto {
    pub notification_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub is_read: bool,
    pub created_date: String,
    pub donation_appointment_id: Option<i64>,
    pub donation_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationDto>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(mobile_user_id): Path<i64>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let notifications = state
        .store
        .notifications_for_user(mobile_user_id)
        .await?
        .into_iter()
        .map(|n| NotificationDto {
            notification_id: n.notification_id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type,
            is_read: n.is_read,
            created_date: n.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            donation_appointment_id: n.donation_appointment_id,
            donation_id: n.donation_id,
        })
        .collect();

    Ok(Json(NotificationListResponse { notifications }))
}

/* ============================================================
   POST /api/notifications/read/{notification_id}
   ============================================================ */

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    if state
        .store
        .find_notification(notification_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    if state.store.mark_notification_read(notification_id).await? {
        Ok(Json(StatusResponse::ok("Notification marked as read")))
    } else {
        Ok(Json(StatusResponse::fail(
            "Failed to mark notification as read",
        )))
    }
}

/* ============================================================
   POST /api/notifications/clear/{mobile_user_id}
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct ClearNotificationsResponse {
    pub success: bool,
    pub message: String,
    pub cleared_count: u64,
}

pub async fn clear(
    State(state): State<AppState>,
    Path(mobile_user_id): Path<i64>,
) -> Result<Json<ClearNotificationsResponse>, ApiError> {
    let cleared_count = state
        .store
        .clear_notifications_for_user(mobile_user_id)
        .await?;

    Ok(Json(ClearNotificationsResponse {
        success: true,
        message: "All notifications cleared".to_string(),
        cleared_count,
    }))
}
