use async_trait::async_trait;

use super::{PgStore, StoreError};
use crate::models::PatientRow;

#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Blood type lookup for the profile payload. Most mobile users have no
    /// patient record; that is not an error.
    async fn find_patient_by_person(
        &self,
        person_id: i64,
    ) -> Result<Option<PatientRow>, StoreError>;
}

#[async_trait]
impl PatientStore for PgStore {
    async fn find_patient_by_person(
        &self,
        person_id: i64,
    ) -> Result<Option<PatientRow>, StoreError> {
        sqlx::query_as::<_, PatientRow>(
            "SELECT patient_id, person_id, blood_type FROM patient WHERE person_id = $1",
        )
        .bind(person_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }
}
