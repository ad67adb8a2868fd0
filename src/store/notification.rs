use async_trait::async_trait;

use super::{PgStore, StoreError};
use crate::models::{NewNotification, NotificationRow};

const NOTIFICATION_COLUMNS: &str = "notification_id, mobile_user_id, donation_appointment_id, \
     donation_id, title, message, notification_type, is_read, created_at";

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn find_notification(
        &self,
        notification_id: i64,
    ) -> Result<Option<NotificationRow>, StoreError>;

    async fn notifications_for_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<Vec<NotificationRow>, StoreError>;

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<i64, StoreError>;

    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool, StoreError>;

    async fn clear_notifications_for_user(&self, mobile_user_id: i64)
    -> Result<u64, StoreError>;
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn find_notification(
        &self,
        notification_id: i64,
    ) -> Result<Option<NotificationRow>, StoreError> {
        sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notification WHERE notification_id = $1"
        ))
        .bind(notification_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn notifications_for_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<Vec<NotificationRow>, StoreError> {
        sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notification
            WHERE mobile_user_id = $1
            ORDER BY created_at DESC, notification_id DESC
            "#
        ))
        .bind(mobile_user_id)
        .fetch_all(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO notification
                (mobile_user_id, donation_appointment_id, donation_id,
                 title, message, notification_type, is_read)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING notification_id
            "#,
        )
        .bind(notification.mobile_user_id)
        .bind(notification.donation_appointment_id)
        .bind(notification.donation_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.notification_type)
        .fetch_one(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query(
            "UPDATE notification SET is_read = TRUE WHERE notification_id = $1",
        )
        .bind(notification_id)
        .execute(self.pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(res.rows_affected() > 0)
    }

    async fn clear_notifications_for_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM notification WHERE mobile_user_id = $1")
            .bind(mobile_user_id)
            .execute(self.pool())
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(res.rows_affected())
    }
}
