use async_trait::async_trait;
use chrono::NaiveDate;

use super::{PgStore, StoreError};
use crate::models::{AppointmentStatus, DonationAppointmentRow, NewAppointment};

const APPOINTMENT_COLUMNS: &str = "donation_appointment_id, donor_id, appointment_date, \
     appointment_time, location, status, source, notes, created_at";

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_appointment(
        &self,
        donation_appointment_id: i64,
    ) -> Result<Option<DonationAppointmentRow>, StoreError>;

    async fn appointments_for_donor(
        &self,
        donor_id: i64,
    ) -> Result<Vec<DonationAppointmentRow>, StoreError>;

    async fn donor_has_active_appointment(&self, donor_id: i64) -> Result<bool, StoreError>;

    /// Insert a Pending appointment unless the donor already has a
    /// non-terminal one. Check and insert are one statement, so two racing
    /// bookings cannot both pass the duplicate check. `None` means the donor
    /// already had an active appointment.
    async fn book_pending_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Option<i64>, StoreError>;

    async fn set_appointment_status(
        &self,
        donation_appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<bool, StoreError>;

    async fn reschedule_appointment(
        &self,
        donation_appointment_id: i64,
        appointment_date: NaiveDate,
        appointment_time: &str,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn find_appointment(
        &self,
        donation_appointment_id: i64,
    ) -> Result<Option<DonationAppointmentRow>, StoreError> {
        sqlx::query_as::<_, DonationAppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM donation_appointment WHERE donation_appointment_id = $1"
        ))
        .bind(donation_appointment_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn appointments_for_donor(
        &self,
        donor_id: i64,
    ) -> Result<Vec<DonationAppointmentRow>, StoreError> {
        sqlx::query_as::<_, DonationAppointmentRow>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM donation_appointment
            WHERE donor_id = $1
            ORDER BY appointment_date DESC, donation_appointment_id DESC
            "#
        ))
        .bind(donor_id)
        .fetch_all(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn donor_has_active_appointment(&self, donor_id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM donation_appointment
                WHERE donor_id = $1
                  AND status <> 1 -- 1 = Cancelled
            )
            "#,
        )
        .bind(donor_id)
        .fetch_one(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn book_pending_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Option<i64>, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO donation_appointment
                (donor_id, appointment_date, appointment_time, location, status, source, notes)
            SELECT $1, $2, $3, $4, 0, $5, $6 -- 0 = Pending
            WHERE NOT EXISTS (
                SELECT 1 FROM donation_appointment
                WHERE donor_id = $1
                  AND status <> 1 -- 1 = Cancelled
            )
            RETURNING donation_appointment_id
            "#,
        )
        .bind(appointment.donor_id)
        .bind(appointment.appointment_date)
        .bind(&appointment.appointment_time)
        .bind(&appointment.location)
        .bind(&appointment.source)
        .bind(&appointment.notes)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn set_appointment_status(
        &self,
        donation_appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(
            "UPDATE donation_appointment SET status = $2 WHERE donation_appointment_id = $1",
        )
        .bind(donation_appointment_id)
        .bind(status)
        .execute(self.pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(res.rows_affected() > 0)
    }

    async fn reschedule_appointment(
        &self,
        donation_appointment_id: i64,
        appointment_date: NaiveDate,
        appointment_time: &str,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE donation_appointment
            SET appointment_date = $2,
                appointment_time = $3
            WHERE donation_appointment_id = $1
            "#,
        )
        .bind(donation_appointment_id)
        .bind(appointment_date)
        .bind(appointment_time)
        .execute(self.pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(res.rows_affected() > 0)
    }
}
