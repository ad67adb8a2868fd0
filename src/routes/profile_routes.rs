// src/routes/profile_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{AppState, StatusResponse},
    store::{MobileUserStore, PatientStore, PersonStore},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{mobile_user_id}", get(get_profile).post(update_profile))
}

/* ============================================================
   GET /api/profile/{mobile_user_id}
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub mobile_user_id: i64,
    pub person_id: i64,
    pub phone_number: String,
    pub full_name: String,
    pub email: String,
    pub blood_type: String,
    pub date_of_birth: String,
    pub address: String,
    pub image_path: String,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(mobile_user_id): Path<i64>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let store = &state.store;

    let user = store
        .find_mobile_user(mobile_user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let person = store
        .find_person(user.person_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Person not found".to_string()))?;

    // Donors only get a blood type once a patient record exists for them
    // (created admin-side after lab tests).
    let blood_type = store
        .find_patient_by_person(user.person_id)
        .await?
        .map(|p| p.blood_type)
        .unwrap_or_default();

    Ok(Json(ProfileResponse {
        mobile_user_id: user.mobile_user_id,
        person_id: user.person_id,
        phone_number: user.phone_number,
        full_name: person.full_name(),
        email: person.email.unwrap_or_default(),
        blood_type,
        date_of_birth: person.date_of_birth.format("%Y-%m-%d").to_string(),
        address: person.address,
        image_path: person.image_path.unwrap_or_default(),
    }))
}

/* ============================================================
   POST /api/profile/{mobile_user_id}
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub address: Option<String>,
    pub image_path: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(mobile_user_id): Path<i64>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let store = &state.store;

    let user = store
        .find_mobile_user(mobile_user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    if store.find_person(user.person_id).await?.is_none() {
        return Err(ApiError::NotFound("Person not found".to_string()));
    }

    // Empty strings mean "leave unchanged", matching the app's form behavior.
    let updated = store
        .update_person_contact(
            user.person_id,
            req.email.as_deref().filter(|s| !s.is_empty()),
            req.address.as_deref().filter(|s| !s.is_empty()),
            req.image_path.as_deref().filter(|s| !s.is_empty()),
        )
        .await?;

    if updated {
        Ok(Json(StatusResponse::ok("Profile updated successfully")))
    } else {
        Ok(Json(StatusResponse::fail("Failed to update profile")))
    }
}
