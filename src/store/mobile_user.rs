use async_trait::async_trait;

use super::{PgStore, StoreError};
use crate::models::MobileUserRow;

const MOBILE_USER_COLUMNS: &str =
    "mobile_user_id, person_id, phone_number, password_hash, is_active, last_login_at";

#[async_trait]
pub trait MobileUserStore: Send + Sync {
    async fn find_mobile_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<Option<MobileUserRow>, StoreError>;

    async fn find_mobile_user_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<MobileUserRow>, StoreError>;

    async fn find_mobile_user_by_person(
        &self,
        person_id: i64,
    ) -> Result<Option<MobileUserRow>, StoreError>;

    async fn mobile_phone_taken(&self, phone_number: &str) -> Result<bool, StoreError>;

    async fn mobile_user_exists_for_person(&self, person_id: i64) -> Result<bool, StoreError>;

    async fn create_mobile_user(
        &self,
        person_id: i64,
        phone_number: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError>;

    async fn touch_last_login(&self, mobile_user_id: i64) -> Result<(), StoreError>;
}

#[async_trait]
impl MobileUserStore for PgStore {
    async fn find_mobile_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<Option<MobileUserRow>, StoreError> {
        sqlx::query_as::<_, MobileUserRow>(&format!(
            "SELECT {MOBILE_USER_COLUMNS} FROM mobile_user WHERE mobile_user_id = $1"
        ))
        .bind(mobile_user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn find_mobile_user_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<MobileUserRow>, StoreError> {
        sqlx::query_as::<_, MobileUserRow>(&format!(
            "SELECT {MOBILE_USER_COLUMNS} FROM mobile_user WHERE phone_number = $1"
        ))
        .bind(phone_number)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn find_mobile_user_by_person(
        &self,
        person_id: i64,
    ) -> Result<Option<MobileUserRow>, StoreError> {
        sqlx::query_as::<_, MobileUserRow>(&format!(
            "SELECT {MOBILE_USER_COLUMNS} FROM mobile_user WHERE person_id = $1"
        ))
        .bind(person_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn mobile_phone_taken(&self, phone_number: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM mobile_user WHERE phone_number = $1)",
        )
        .bind(phone_number)
        .fetch_one(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn mobile_user_exists_for_person(&self, person_id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM mobile_user WHERE person_id = $1)",
        )
        .bind(person_id)
        .fetch_one(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn create_mobile_user(
        &self,
        person_id: i64,
        phone_number: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO mobile_user (person_id, phone_number, password_hash, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING mobile_user_id
            "#,
        )
        .bind(person_id)
        .bind(phone_number)
        .bind(password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn touch_last_login(&self, mobile_user_id: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE mobile_user SET last_login_at = now() WHERE mobile_user_id = $1")
            .bind(mobile_user_id)
            .execute(self.pool())
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}
