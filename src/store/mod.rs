pub mod appointment;
pub mod country;
pub mod donation;
pub mod donor;
pub mod mobile_user;
pub mod notification;
pub mod patient;
pub mod person;

#[cfg(test)]
pub mod mem;

pub use appointment::AppointmentStore;
pub use country::CountryStore;
pub use donation::DonationStore;
pub use donor::DonorStore;
pub use mobile_user::MobileUserStore;
pub use notification::NotificationStore;
pub use patient::PatientStore;
pub use person::PersonStore;

use thiserror::Error;

/// Data-layer failure. Unique-constraint violations are split out so the
/// registration workflow can retry with a regenerated national id instead of
/// reporting a generic write failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Db(sqlx::Error),
}

impl StoreError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation(db.message().to_string());
            }
        }
        StoreError::Db(e)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }
}

/// Postgres-backed implementation of every entity store.
#[derive(Clone)]
pub struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}
