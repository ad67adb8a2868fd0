use async_trait::async_trait;

use super::{PgStore, StoreError};
use crate::models::CountryRow;

#[async_trait]
pub trait CountryStore: Send + Sync {
    async fn find_country_by_name(&self, name: &str) -> Result<Option<CountryRow>, StoreError>;

    /// Fallback when the configured default country is not seeded.
    async fn first_country(&self) -> Result<Option<CountryRow>, StoreError>;
}

#[async_trait]
impl CountryStore for PgStore {
    async fn find_country_by_name(&self, name: &str) -> Result<Option<CountryRow>, StoreError> {
        sqlx::query_as::<_, CountryRow>(
            "SELECT country_id, country_name FROM country WHERE country_name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn first_country(&self) -> Result<Option<CountryRow>, StoreError> {
        sqlx::query_as::<_, CountryRow>(
            "SELECT country_id, country_name FROM country ORDER BY country_id ASC LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }
}
