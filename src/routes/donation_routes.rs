// src/routes/donation_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use crate::{
    error::ApiError,
    models::{AppState, DonationRow, DonorRow},
    store::{DonationStore, DonorStore, MobileUserStore, PgStore},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history/{mobile_user_id}", get(history))
        .route("/stats/{mobile_user_id}", get(stats))
}

/// Donor lookup shared by both endpoints: unknown users are a 404, users
/// without a donor record simply have nothing to report yet.
async fn donor_for_user(store: &PgStore, mobile_user_id: i64) -> Result<Option<DonorRow>, ApiError> {
    let user = store
        .find_mobile_user(mobile_user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(store.find_donor_by_person(user.person_id).await?)
}

/* ============================================================
   GET /api/donations/history/{mobile_user_id}
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct DonationDto {
    pub donation_id: i64,
    pub donation_date: String,
    pub blood_volume: f64,
}

#[derive(Debug, Serialize)]
pub struct DonationHistoryResponse {
    pub donations: Vec<DonationDto>,
}

pub async fn history(
    State(state): State<AppState>,
    Path(mobile_user_id): Path<i64>,
) -> Result<Json<DonationHistoryResponse>, ApiError> {
    let Some(donor) = donor_for_user(&state.store, mobile_user_id).await? else {
        return Ok(Json(DonationHistoryResponse { donations: vec![] }));
    };

    let donations = state
        .store
        .donations_for_donor(donor.donor_id)
        .await?
        .into_iter()
        .map(|d| DonationDto {
            donation_id: d.donation_id,
            donation_date: d.donation_date.format("%Y-%m-%d").to_string(),
            blood_volume: d.blood_volume,
        })
        .collect();

    Ok(Json(DonationHistoryResponse { donations }))
}

/* ============================================================
   GET /api/donations/stats/{mobile_user_id}
   ============================================================ */

#[derive(Debug, PartialEq, Serialize)]
pub struct DonationStatsResponse {
    pub total_donations: i64,
    pub total_volume: f64,
    pub last_donation_date: Option<String>,
}

pub async fn stats(
    State(state): State<AppState>,
    Path(mobile_user_id): Path<i64>,
) -> Result<Json<DonationStatsResponse>, ApiError> {
    let Some(donor) = donor_for_user(&state.store, mobile_user_id).await? else {
        return Ok(Json(fold_stats(&[])));
    };

    let donations = state.store.donations_for_donor(donor.donor_id).await?;
    Ok(Json(fold_stats(&donations)))
}

fn fold_stats(donations: &[DonationRow]) -> DonationStatsResponse {
    DonationStatsResponse {
        total_donations: donations.len() as i64,
        total_volume: donations.iter().map(|d| d.blood_volume).sum(),
        last_donation_date: donations
            .iter()
            .map(|d| d.donation_date)
            .max()
            .map(|d| d.format("%Y-%m-%d").to_string()),
    }
}
