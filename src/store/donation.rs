use async_trait::async_trait;

use super::{PgStore, StoreError};
use crate::models::DonationRow;

/// Donations are recorded admin-side after lab work; the mobile API only
/// reads them back.
#[async_trait]
pub trait DonationStore: Send + Sync {
    async fn donations_for_donor(&self, donor_id: i64) -> Result<Vec<DonationRow>, StoreError>;
}

#[async_trait]
impl DonationStore for PgStore {
    async fn donations_for_donor(&self, donor_id: i64) -> Result<Vec<DonationRow>, StoreError> {
        sqlx::query_as::<_, DonationRow>(
            r#"
            SELECT donation_id, donor_id, donation_date, blood_volume
            FROM donation
            WHERE donor_id = $1
            ORDER BY donation_date DESC, donation_id DESC
            "#,
        )
        .bind(donor_id)
        .fetch_all(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }
}
