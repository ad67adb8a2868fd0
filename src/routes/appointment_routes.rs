// src/routes/appointment_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{AppState, StatusResponse},
    store::{AppointmentStore, DonorStore, MobileUserStore, PersonStore},
    workflow::appointment::{self, AppointmentError, BookingError, BookingRequest},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{mobile_user_id}", get(list_appointments))
        .route("/book", post(book))
        .route("/cancel/{appointment_id}", post(cancel))
        .route("/reschedule/{appointment_id}", post(reschedule))
}

/* ============================================================
   GET /api/appointments/user/{mobile_user_id}
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct AppointmentDto {
    pub donation_appointment_id: i64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub location: String,
    pub status: &'static str,
    pub donor_name: String,
    pub created_date: String,
}

#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentDto>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Path(mobile_user_id): Path<i64>,
) -> Result<Json<AppointmentListResponse>, ApiError> {
    let store = &state.store;

    let user = store
        .find_mobile_user(mobile_user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    // A user who has never booked has no donor record yet; that is an empty
    // list, not an error.
    let Some(donor) = store.find_donor_by_person(user.person_id).await? else {
        return Ok(Json(AppointmentListResponse {
            appointments: vec![],
        }));
    };

    let donor_name = store
        .find_person(user.person_id)
        .await?
        .map(|p| p.full_name())
        .unwrap_or_default();

    let appointments = store
        .appointments_for_donor(donor.donor_id)
        .await?
        .into_iter()
        .map(|a| AppointmentDto {
            donation_appointment_id: a.donation_appointment_id,
            appointment_date: a.appointment_date.format("%Y-%m-%d").to_string(),
            appointment_time: a.appointment_time,
            location: a.location,
            status: a.status.as_str(),
            donor_name: donor_name.clone(),
            created_date: a.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    Ok(Json(AppointmentListResponse { appointments }))
}

/* ============================================================
   POST /api/appointments/book
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub mobile_user_id: i64,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_appointment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_id: Option<i64>,
}

pub async fn book(
    State(state): State<AppState>,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let booking = BookingRequest {
        mobile_user_id: req.mobile_user_id,
        appointment_date: req.appointment_date,
        appointment_time: req.appointment_time,
        location: req.location,
        source: req.source,
    };

    match appointment::book_appointment(&state.store, &booking).await {
        Ok(confirmation) => Ok(Json(BookResponse {
            success: true,
            message: "Donation appointment booked successfully".to_string(),
            donation_appointment_id: Some(confirmation.donation_appointment_id),
            donor_id: Some(confirmation.donor_id),
        })),
        Err(BookingError::UserNotFound) => Err(ApiError::NotFound("User not found".to_string())),
        Err(BookingError::Store(e)) => Err(e.into()),
        // Business-rule rejections ride HTTP 200 with success=false.
        Err(e) => Ok(Json(BookResponse {
            success: false,
            message: e.to_string(),
            donation_appointment_id: None,
            donor_id: None,
        })),
    }
}

/* ============================================================
   POST /api/appointments/cancel/{appointment_id}
   ============================================================ */

pub async fn cancel(
    State(state): State<AppState>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    match appointment::cancel_appointment(&state.store, appointment_id).await {
        Ok(()) => Ok(Json(StatusResponse::ok(
            "Appointment cancelled successfully",
        ))),
        Err(AppointmentError::NotFound) => {
            Err(ApiError::NotFound("Appointment not found".to_string()))
        }
        Err(AppointmentError::Store(e)) => Err(e.into()),
        Err(e) => Ok(Json(StatusResponse::fail(e.to_string()))),
    }
}

/* ============================================================
   POST /api/appointments/reschedule/{appointment_id}
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
}

pub async fn reschedule(
    State(state): State<AppState>,
    Path(appointment_id): Path<i64>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    match appointment::reschedule_appointment(
        &state.store,
        appointment_id,
        req.appointment_date.as_deref(),
        req.appointment_time.as_deref(),
    )
    .await
    {
        Ok(()) => Ok(Json(StatusResponse::ok(
            "Appointment rescheduled successfully",
        ))),
        Err(AppointmentError::NotFound) => {
            Err(ApiError::NotFound("Appointment not found".to_string()))
        }
        Err(AppointmentError::Store(e)) => Err(e.into()),
        Err(e) => Ok(Json(StatusResponse::fail(e.to_string()))),
    }
}
