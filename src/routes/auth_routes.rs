// src/routes/auth_routes.rs

use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{AppState, MobileUserRow, PersonRow},
    store::{MobileUserStore, PersonStore},
    workflow::auth::{self, LoginError, RegisterError, RegistrationInput},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

/* ============================================================
   Response DTOs
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub mobile_user_id: i64,
    pub person_id: i64,
    pub phone_number: String,
    pub full_name: String,
    pub email: String,
    pub blood_type: String,
    pub date_of_birth: Option<String>,
    pub address: String,
    pub image_path: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
}

impl AuthResponse {
    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            token: None,
            user: None,
        }
    }
}

fn user_payload(user: &MobileUserRow, person: Option<&PersonRow>) -> UserPayload {
    UserPayload {
        mobile_user_id: user.mobile_user_id,
        person_id: user.person_id,
        phone_number: user.phone_number.clone(),
        full_name: person.map(|p| p.full_name()).unwrap_or_default(),
        email: person.and_then(|p| p.email.clone()).unwrap_or_default(),
        // Blood type is determined admin-side during lab tests; new accounts
        // have none.
        blood_type: String::new(),
        date_of_birth: person.map(|p| p.date_of_birth.format("%Y-%m-%d").to_string()),
        address: person.map(|p| p.address.clone()).unwrap_or_default(),
        image_path: person.and_then(|p| p.image_path.clone()).unwrap_or_default(),
    }
}

/* ============================================================
   POST /api/auth/login
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    match auth::login(&state.store, &req.phone_number, &req.password).await {
        Ok(session) => Ok(Json(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
            token: Some(session.token),
            user: Some(user_payload(&session.user, session.person.as_ref())),
        })),
        Err(LoginError::Store(e)) => Err(e.into()),
        Err(e) => Ok(Json(AuthResponse::fail(e.to_string()))),
    }
}

/* ============================================================
   POST /api/auth/register
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub phone_number: String,
    pub password: String,
    pub national_no: Option<String>,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub third_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub image_path: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let input = RegistrationInput {
        phone_number: req.phone_number,
        password: req.password,
        national_no: req.national_no,
        first_name: req.first_name,
        second_name: req.second_name,
        third_name: req.third_name,
        last_name: req.last_name,
        email: req.email,
        date_of_birth: req.date_of_birth,
        address: req.address,
        image_path: req.image_path,
    };

    match auth::register(&state.store, &state.default_country, &input).await {
        Ok(account) => {
            let user = state
                .store
                .find_mobile_user(account.mobile_user_id)
                .await?
                .ok_or_else(|| {
                    ApiError::Internal("mobile user missing after registration".to_string())
                })?;
            let person = state.store.find_person(account.person_id).await?;
            let token = crate::auth::issue_token(account.mobile_user_id, Utc::now());

            Ok(Json(AuthResponse {
                success: true,
                message: "Registration successful".to_string(),
                token: Some(token),
                user: Some(user_payload(&user, person.as_ref())),
            }))
        }
        Err(RegisterError::Store(e)) => Err(e.into()),
        Err(e) => Ok(Json(AuthResponse::fail(e.to_string()))),
    }
}
