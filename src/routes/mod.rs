use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod auth_routes;
pub mod donation_routes;
pub mod notification_routes;
pub mod profile_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", auth_routes::router())
        .nest("/api/appointments", appointment_routes::router())
        .nest("/api/donations", donation_routes::router())
        .nest("/api/notifications", notification_routes::router())
        .nest("/api/profile", profile_routes::router())
        .with_state(state)
}
