use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::models::{
    AppointmentStatus, DonorRow, MobileUserRow, NewAppointment, NewNotification,
};
use crate::store::{
    AppointmentStore, DonorStore, MobileUserStore, NotificationStore, PersonStore, StoreError,
};
use crate::workflow::notify;

/// Hard truncation limits for free-text appointment fields. Over-long values
/// are cut to fit, never rejected.
pub const SOURCE_MAX_LEN: usize = 20;
pub const LOCATION_MAX_LEN: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub mobile_user_id: i64,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug)]
pub struct BookingConfirmation {
    pub donation_appointment_id: i64,
    pub donor_id: i64,
    pub appointment_date: NaiveDate,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("User not found")]
    UserNotFound,
    #[error("Person record not found for this user")]
    PersonNotFound,
    #[error("You already have an active appointment request")]
    DuplicateActiveAppointment,
    #[error("Invalid date format. Use YYYY-MM-DD format.")]
    InvalidDateFormat,
    #[error("Failed to create donor record: {0}")]
    DonorCreateFailed(String),
    #[error("Failed to book donation appointment: {0}")]
    Persistence(String),
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,
    #[error("Cannot reschedule a cancelled appointment")]
    AlreadyCancelled,
    #[error("Appointment date is required")]
    DateRequired,
    #[error("Invalid date format. Use YYYY-MM-DD format.")]
    InvalidDateFormat,
    #[error("Appointment time is required")]
    TimeRequired,
    #[error("{0}")]
    Persistence(String),
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

/// Book a Pending donation appointment for the user's donor record, creating
/// the donor on first booking.
pub async fn book_appointment<S>(
    store: &S,
    req: &BookingRequest,
) -> Result<BookingConfirmation, BookingError>
where
    S: MobileUserStore + PersonStore + DonorStore + AppointmentStore + NotificationStore,
{
    let user = store
        .find_mobile_user(req.mobile_user_id)
        .await?
        .ok_or(BookingError::UserNotFound)?;

    let donor = match store.find_donor_by_person(user.person_id).await? {
        Some(donor) => donor,
        None => ensure_donor(store, user.person_id).await?,
    };

    if store.donor_has_active_appointment(donor.donor_id).await? {
        return Err(BookingError::DuplicateActiveAppointment);
    }

    let appointment_date =
        parse_requested_date(req.appointment_date.as_deref(), Utc::now().date_naive())?;
    let appointment_time = req.appointment_time.clone().unwrap_or_default();
    let location = truncate_chars(req.location.as_deref().unwrap_or(""), LOCATION_MAX_LEN);
    let source = normalize_source(req.source.as_deref());

    let appointment = NewAppointment {
        donor_id: donor.donor_id,
        appointment_date,
        appointment_time: appointment_time.clone(),
        location: location.clone(),
        source,
        notes: String::new(),
    };

    // The insert re-checks for an active appointment in the same statement,
    // so a booking that raced past the probe above still cannot produce a
    // duplicate.
    let donation_appointment_id = store
        .book_pending_appointment(&appointment)
        .await
        .map_err(|e| BookingError::Persistence(e.to_string()))?
        .ok_or(BookingError::DuplicateActiveAppointment)?;

    notify::best_effort(
        store,
        NewNotification {
            mobile_user_id: user.mobile_user_id,
            donation_appointment_id: Some(donation_appointment_id),
            donation_id: None,
            title: "Donation appointment booked".to_string(),
            message: format!(
                "Your donation appointment has been booked.\nDate: {}\nTime: {}\nLocation: {}",
                appointment_date.format("%Y-%m-%d"),
                appointment_time,
                if location.is_empty() {
                    "Blood Bank"
                } else {
                    location.as_str()
                },
            ),
            notification_type: "Appointment".to_string(),
        },
    )
    .await;

    Ok(BookingConfirmation {
        donation_appointment_id,
        donor_id: donor.donor_id,
        appointment_date,
    })
}

/// Cancel an appointment and notify its owner. Cancelling an
/// already-cancelled appointment is a harmless re-cancel.
pub async fn cancel_appointment<S>(
    store: &S,
    donation_appointment_id: i64,
) -> Result<(), AppointmentError>
where
    S: AppointmentStore + DonorStore + MobileUserStore + NotificationStore,
{
    let appointment = store
        .find_appointment(donation_appointment_id)
        .await?
        .ok_or(AppointmentError::NotFound)?;

    // Resolve the owner before mutating anything, for the notification.
    let owner = owning_mobile_user(store, appointment.donor_id).await?;

    let updated = store
        .set_appointment_status(donation_appointment_id, AppointmentStatus::Cancelled)
        .await
        .map_err(|e| {
            AppointmentError::Persistence(format!("Failed to cancel appointment: {e}"))
        })?;
    if !updated {
        return Err(AppointmentError::Persistence(
            "Failed to cancel appointment".to_string(),
        ));
    }

    if let Some(user) = owner {
        notify::best_effort(
            store,
            NewNotification {
                mobile_user_id: user.mobile_user_id,
                donation_appointment_id: Some(donation_appointment_id),
                donation_id: None,
                title: "Donation appointment cancelled".to_string(),
                message: format!(
                    "Your donation appointment has been cancelled.\nDate: {}\nTime: {}",
                    appointment.appointment_date.format("%Y-%m-%d"),
                    appointment.appointment_time,
                ),
                notification_type: "Appointment".to_string(),
            },
        )
        .await;
    }

    Ok(())
}

/// Move an appointment to a new date and time. Unlike booking, both fields
/// are mandatory here.
pub async fn reschedule_appointment<S>(
    store: &S,
    donation_appointment_id: i64,
    new_date: Option<&str>,
    new_time: Option<&str>,
) -> Result<(), AppointmentError>
where
    S: AppointmentStore + DonorStore + MobileUserStore + NotificationStore,
{
    let appointment = store
        .find_appointment(donation_appointment_id)
        .await?
        .ok_or(AppointmentError::NotFound)?;

    if appointment.status.is_terminal() {
        return Err(AppointmentError::AlreadyCancelled);
    }

    let date_raw = new_date
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppointmentError::DateRequired)?;
    let appointment_date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
        .map_err(|_| AppointmentError::InvalidDateFormat)?;
    let appointment_time = new_time
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppointmentError::TimeRequired)?;

    let updated = store
        .reschedule_appointment(donation_appointment_id, appointment_date, appointment_time)
        .await
        .map_err(|e| {
            AppointmentError::Persistence(format!("Failed to reschedule appointment: {e}"))
        })?;
    if !updated {
        return Err(AppointmentError::Persistence(
            "Failed to reschedule appointment".to_string(),
        ));
    }

    if let Some(user) = owning_mobile_user(store, appointment.donor_id).await? {
        notify::best_effort(
            store,
            NewNotification {
                mobile_user_id: user.mobile_user_id,
                donation_appointment_id: Some(donation_appointment_id),
                donation_id: None,
                title: "Donation appointment updated".to_string(),
                message: format!(
                    "Your donation appointment has been rescheduled.\nNew date: {}\nNew time: {}\nLocation: {}",
                    appointment_date.format("%Y-%m-%d"),
                    appointment_time,
                    if appointment.location.is_empty() {
                        "Blood Bank"
                    } else {
                        appointment.location.as_str()
                    },
                ),
                notification_type: "Appointment".to_string(),
            },
        )
        .await;
    }

    Ok(())
}

/// Donor records are created lazily on first booking. The insert is keyed on
/// person_id, so two racing bookings cannot create two donors; whichever
/// insert loses re-reads the winner's row.
async fn ensure_donor<S>(store: &S, person_id: i64) -> Result<DonorRow, BookingError>
where
    S: PersonStore + DonorStore,
{
    if store.find_person(person_id).await?.is_none() {
        return Err(BookingError::PersonNotFound);
    }

    if let Err(e) = store.create_default_donor(person_id).await {
        // Re-check for a racing create before giving up.
        if store.find_donor_by_person(person_id).await?.is_none() {
            return Err(BookingError::DonorCreateFailed(e.to_string()));
        }
    }

    store
        .find_donor_by_person(person_id)
        .await?
        .ok_or_else(|| BookingError::DonorCreateFailed("donor row missing after insert".to_string()))
}

async fn owning_mobile_user<S>(
    store: &S,
    donor_id: i64,
) -> Result<Option<MobileUserRow>, StoreError>
where
    S: DonorStore + MobileUserStore,
{
    let Some(donor) = store.find_donor(donor_id).await? else {
        return Ok(None);
    };
    store.find_mobile_user_by_person(donor.person_id).await
}

/// Missing or empty booking dates default to today; malformed ones are
/// rejected. Reschedule requires a date outright and never takes this path.
fn parse_requested_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, BookingError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| BookingError::InvalidDateFormat)
        }
    }
}

/// "Mobile App" is the label older app builds send; the schema stores the
/// short form.
pub fn normalize_source(raw: Option<&str>) -> String {
    let source = raw.unwrap_or("Mobile");
    let source = if source.eq_ignore_ascii_case("Mobile App") {
        "Mobile"
    } else {
        source
    };
    truncate_chars(source, SOURCE_MAX_LEN)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
