//! In-memory store used by workflow tests. Mirrors the semantics of the
//! Postgres statements, including the conditional donor/appointment inserts,
//! and exposes knobs for injecting write failures.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{
    AppointmentStore, CountryStore, DonationStore, DonorStore, MobileUserStore,
    NotificationStore, PatientStore, PersonStore, StoreError,
};
use crate::models::{
    AppointmentStatus, CountryRow, DonationAppointmentRow, DonationRow, DonorRow, MobileUserRow,
    NewAppointment, NewNotification, NewPerson, NotificationRow, PatientRow, PersonRow,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    people: Vec<PersonRow>,
    mobile_users: Vec<MobileUserRow>,
    donors: Vec<DonorRow>,
    appointments: Vec<DonationAppointmentRow>,
    notifications: Vec<NotificationRow>,
    donations: Vec<DonationRow>,
    patients: Vec<PatientRow>,
    countries: Vec<CountryRow>,
    fail_donor_inserts: bool,
    fail_notification_inserts: bool,
    person_inserts_to_fail: u32,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

fn injected(what: &str) -> StoreError {
    StoreError::Db(sqlx::Error::Protocol(format!("injected {what} failure")))
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(inner: &mut Inner) -> i64 {
        inner.next_id += 1;
        inner.next_id
    }

    pub fn seed_country(&self, name: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let country_id = Self::next_id(&mut inner);
        inner.countries.push(CountryRow {
            country_id,
            country_name: name.to_string(),
        });
        country_id
    }

    pub fn seed_person(
        &self,
        first_name: &str,
        last_name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let person_id = Self::next_id(&mut inner);
        inner.people.push(PersonRow {
            person_id,
            national_no: format!("29{person_id:0>12}"),
            first_name: first_name.to_string(),
            second_name: String::new(),
            third_name: None,
            last_name: last_name.to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: 0,
            address: String::new(),
            phone: phone.to_string(),
            email: email.map(str::to_string),
            nationality_country_id: 1,
            image_path: None,
        });
        person_id
    }

    pub fn seed_mobile_user(&self, person_id: i64, phone: &str, password_hash: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let mobile_user_id = Self::next_id(&mut inner);
        inner.mobile_users.push(MobileUserRow {
            mobile_user_id,
            person_id,
            phone_number: phone.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            last_login_at: None,
        });
        mobile_user_id
    }

    pub fn set_user_active(&self, mobile_user_id: i64, is_active: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner
            .mobile_users
            .iter_mut()
            .find(|u| u.mobile_user_id == mobile_user_id)
        {
            user.is_active = is_active;
        }
    }

    pub fn fail_donor_inserts(&self) {
        self.inner.lock().unwrap().fail_donor_inserts = true;
    }

    pub fn fail_notification_inserts(&self) {
        self.inner.lock().unwrap().fail_notification_inserts = true;
    }

    /// Make the next create_person call fail with a unique violation, as a
    /// racing signup taking the synthesized national id would.
    pub fn fail_next_person_insert(&self) {
        self.inner.lock().unwrap().person_inserts_to_fail = 1;
    }

    pub fn people(&self) -> Vec<PersonRow> {
        self.inner.lock().unwrap().people.clone()
    }

    pub fn mobile_users(&self) -> Vec<MobileUserRow> {
        self.inner.lock().unwrap().mobile_users.clone()
    }

    pub fn donors(&self) -> Vec<DonorRow> {
        self.inner.lock().unwrap().donors.clone()
    }

    pub fn appointments(&self) -> Vec<DonationAppointmentRow> {
        self.inner.lock().unwrap().appointments.clone()
    }

    pub fn notifications(&self) -> Vec<NotificationRow> {
        self.inner.lock().unwrap().notifications.clone()
    }
}

#[async_trait]
impl PersonStore for MemStore {
    async fn find_person(&self, person_id: i64) -> Result<Option<PersonRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .people
            .iter()
            .find(|p| p.person_id == person_id)
            .cloned())
    }

    async fn find_person_by_national_no(
        &self,
        national_no: &str,
    ) -> Result<Option<PersonRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .people
            .iter()
            .find(|p| p.national_no == national_no)
            .cloned())
    }

    async fn person_email_taken(&self, email: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.people.iter().any(|p| {
            p.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }))
    }

    async fn create_person(&self, person: &NewPerson) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.person_inserts_to_fail > 0 {
            inner.person_inserts_to_fail -= 1;
            return Err(StoreError::UniqueViolation(
                "duplicate key value violates unique constraint \"person_national_no_key\""
                    .to_string(),
            ));
        }
        if inner
            .people
            .iter()
            .any(|p| p.national_no == person.national_no)
        {
            return Err(StoreError::UniqueViolation(
                "duplicate key value violates unique constraint \"person_national_no_key\""
                    .to_string(),
            ));
        }
        let person_id = Self::next_id(&mut inner);
        inner.people.push(PersonRow {
            person_id,
            national_no: person.national_no.clone(),
            first_name: person.first_name.clone(),
            second_name: person.second_name.clone(),
            third_name: person.third_name.clone(),
            last_name: person.last_name.clone(),
            date_of_birth: person.date_of_birth,
            gender: person.gender,
            address: person.address.clone(),
            phone: person.phone.clone(),
            email: person.email.clone(),
            nationality_country_id: person.nationality_country_id,
            image_path: person.image_path.clone(),
        });
        Ok(person_id)
    }

    async fn update_person_contact(
        &self,
        person_id: i64,
        email: Option<&str>,
        address: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(person) = inner.people.iter_mut().find(|p| p.person_id == person_id) else {
            return Ok(false);
        };
        if let Some(email) = email {
            person.email = Some(email.to_string());
        }
        if let Some(address) = address {
            person.address = address.to_string();
        }
        if let Some(image_path) = image_path {
            person.image_path = Some(image_path.to_string());
        }
        Ok(true)
    }
}

#[async_trait]
impl MobileUserStore for MemStore {
    async fn find_mobile_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<Option<MobileUserRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .mobile_users
            .iter()
            .find(|u| u.mobile_user_id == mobile_user_id)
            .cloned())
    }

    async fn find_mobile_user_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<MobileUserRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .mobile_users
            .iter()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn find_mobile_user_by_person(
        &self,
        person_id: i64,
    ) -> Result<Option<MobileUserRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .mobile_users
            .iter()
            .find(|u| u.person_id == person_id)
            .cloned())
    }

    async fn mobile_phone_taken(&self, phone_number: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .mobile_users
            .iter()
            .any(|u| u.phone_number == phone_number))
    }

    async fn mobile_user_exists_for_person(&self, person_id: i64) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.mobile_users.iter().any(|u| u.person_id == person_id))
    }

    async fn create_mobile_user(
        &self,
        person_id: i64,
        phone_number: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mobile_user_id = Self::next_id(&mut inner);
        inner.mobile_users.push(MobileUserRow {
            mobile_user_id,
            person_id,
            phone_number: phone_number.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            last_login_at: None,
        });
        Ok(mobile_user_id)
    }

    async fn touch_last_login(&self, mobile_user_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner
            .mobile_users
            .iter_mut()
            .find(|u| u.mobile_user_id == mobile_user_id)
        {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl DonorStore for MemStore {
    async fn find_donor(&self, donor_id: i64) -> Result<Option<DonorRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.donors.iter().find(|d| d.donor_id == donor_id).cloned())
    }

    async fn find_donor_by_person(&self, person_id: i64) -> Result<Option<DonorRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .donors
            .iter()
            .find(|d| d.person_id == person_id)
            .cloned())
    }

    async fn create_default_donor(&self, person_id: i64) -> Result<Option<i64>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_donor_inserts {
            return Err(injected("donor insert"));
        }
        if inner.donors.iter().any(|d| d.person_id == person_id) {
            return Ok(None);
        }
        let donor_id = Self::next_id(&mut inner);
        inner.donors.push(DonorRow {
            donor_id,
            person_id,
            height: 0.0,
            weight: 0.0,
            last_donation_date: None,
            medical_record: String::new(),
            can_donate: true,
        });
        Ok(Some(donor_id))
    }
}

#[async_trait]
impl AppointmentStore for MemStore {
    async fn find_appointment(
        &self,
        donation_appointment_id: i64,
    ) -> Result<Option<DonationAppointmentRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .appointments
            .iter()
            .find(|a| a.donation_appointment_id == donation_appointment_id)
            .cloned())
    }

    async fn appointments_for_donor(
        &self,
        donor_id: i64,
    ) -> Result<Vec<DonationAppointmentRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .appointments
            .iter()
            .filter(|a| a.donor_id == donor_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (b.appointment_date, b.donation_appointment_id)
                .cmp(&(a.appointment_date, a.donation_appointment_id))
        });
        Ok(rows)
    }

    async fn donor_has_active_appointment(&self, donor_id: i64) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .appointments
            .iter()
            .any(|a| a.donor_id == donor_id && !a.status.is_terminal()))
    }

    async fn book_pending_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Option<i64>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .appointments
            .iter()
            .any(|a| a.donor_id == appointment.donor_id && !a.status.is_terminal())
        {
            return Ok(None);
        }
        let donation_appointment_id = Self::next_id(&mut inner);
        inner.appointments.push(DonationAppointmentRow {
            donation_appointment_id,
            donor_id: appointment.donor_id,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time.clone(),
            location: appointment.location.clone(),
            status: AppointmentStatus::Pending,
            source: appointment.source.clone(),
            notes: appointment.notes.clone(),
            created_at: Utc::now(),
        });
        Ok(Some(donation_appointment_id))
    }

    async fn set_appointment_status(
        &self,
        donation_appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(appointment) = inner
            .appointments
            .iter_mut()
            .find(|a| a.donation_appointment_id == donation_appointment_id)
        else {
            return Ok(false);
        };
        appointment.status = status;
        Ok(true)
    }

    async fn reschedule_appointment(
        &self,
        donation_appointment_id: i64,
        appointment_date: chrono::NaiveDate,
        appointment_time: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(appointment) = inner
            .appointments
            .iter_mut()
            .find(|a| a.donation_appointment_id == donation_appointment_id)
        else {
            return Ok(false);
        };
        appointment.appointment_date = appointment_date;
        appointment.appointment_time = appointment_time.to_string();
        Ok(true)
    }
}

#[async_trait]
impl NotificationStore for MemStore {
    async fn find_notification(
        &self,
        notification_id: i64,
    ) -> Result<Option<NotificationRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .notifications
            .iter()
            .find(|n| n.notification_id == notification_id)
            .cloned())
    }

    async fn notifications_for_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<Vec<NotificationRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .notifications
            .iter()
            .filter(|n| n.mobile_user_id == mobile_user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (b.created_at, b.notification_id).cmp(&(a.created_at, a.notification_id))
        });
        Ok(rows)
    }

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_notification_inserts {
            return Err(injected("notification insert"));
        }
        let notification_id = Self::next_id(&mut inner);
        inner.notifications.push(NotificationRow {
            notification_id,
            mobile_user_id: notification.mobile_user_id,
            donation_appointment_id: notification.donation_appointment_id,
            donation_id: notification.donation_id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            notification_type: notification.notification_type.clone(),
            is_read: false,
            created_at: Utc::now(),
        });
        Ok(notification_id)
    }

    async fn mark_notification_read(&self, notification_id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(notification) = inner
            .notifications
            .iter_mut()
            .find(|n| n.notification_id == notification_id)
        else {
            return Ok(false);
        };
        notification.is_read = true;
        Ok(true)
    }

    async fn clear_notifications_for_user(
        &self,
        mobile_user_id: i64,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.notifications.len();
        inner.notifications.retain(|n| n.mobile_user_id != mobile_user_id);
        Ok((before - inner.notifications.len()) as u64)
    }
}

#[async_trait]
impl DonationStore for MemStore {
    async fn donations_for_donor(&self, donor_id: i64) -> Result<Vec<DonationRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .donations
            .iter()
            .filter(|d| d.donor_id == donor_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (b.donation_date, b.donation_id).cmp(&(a.donation_date, a.donation_id))
        });
        Ok(rows)
    }
}

#[async_trait]
impl CountryStore for MemStore {
    async fn find_country_by_name(&self, name: &str) -> Result<Option<CountryRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .countries
            .iter()
            .find(|c| c.country_name == name)
            .cloned())
    }

    async fn first_country(&self) -> Result<Option<CountryRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .countries
            .iter()
            .min_by_key(|c| c.country_id)
            .cloned())
    }
}

#[async_trait]
impl PatientStore for MemStore {
    async fn find_patient_by_person(
        &self,
        person_id: i64,
    ) -> Result<Option<PatientRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .patients
            .iter()
            .find(|p| p.person_id == person_id)
            .cloned())
    }
}
