use async_trait::async_trait;

use super::{PgStore, StoreError};
use crate::models::DonorRow;

const DONOR_COLUMNS: &str =
    "donor_id, person_id, height, weight, last_donation_date, medical_record, can_donate";

#[async_trait]
pub trait DonorStore: Send + Sync {
    async fn find_donor(&self, donor_id: i64) -> Result<Option<DonorRow>, StoreError>;

    async fn find_donor_by_person(&self, person_id: i64) -> Result<Option<DonorRow>, StoreError>;

    /// Insert a donor with unset medical fields and `can_donate = true`,
    /// unless one already exists for the person. `None` means a concurrent
    /// create won; the caller re-reads instead of failing.
    async fn create_default_donor(&self, person_id: i64) -> Result<Option<i64>, StoreError>;
}

#[async_trait]
impl DonorStore for PgStore {
    async fn find_donor(&self, donor_id: i64) -> Result<Option<DonorRow>, StoreError> {
        sqlx::query_as::<_, DonorRow>(&format!(
            "SELECT {DONOR_COLUMNS} FROM donor WHERE donor_id = $1"
        ))
        .bind(donor_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn find_donor_by_person(&self, person_id: i64) -> Result<Option<DonorRow>, StoreError> {
        sqlx::query_as::<_, DonorRow>(&format!(
            "SELECT {DONOR_COLUMNS} FROM donor WHERE person_id = $1"
        ))
        .bind(person_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn create_default_donor(&self, person_id: i64) -> Result<Option<i64>, StoreError> {
        // Height/weight stay 0 until staff fill them in at the first visit.
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO donor (person_id, height, weight, last_donation_date, medical_record, can_donate)
            VALUES ($1, 0, 0, NULL, '', TRUE)
            ON CONFLICT (person_id) DO NOTHING
            RETURNING donor_id
            "#,
        )
        .bind(person_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }
}
