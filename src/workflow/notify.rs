use crate::models::NewNotification;
use crate::store::NotificationStore;

/// Best-effort notification insert. Failures are logged and swallowed; the
/// write that triggered the notification has already committed and must not
/// be invalidated by it.
pub async fn best_effort<S: NotificationStore>(store: &S, notification: NewNotification) {
    if let Err(e) = store.create_notification(&notification).await {
        tracing::warn!(
            mobile_user_id = notification.mobile_user_id,
            "failed to create notification: {e}"
        );
    }
}
