use chrono::{DateTime, Months, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{MobileUserRow, NewNotification, NewPerson, PersonRow};
use crate::store::{
    CountryStore, MobileUserStore, NotificationStore, PersonStore, StoreError,
};
use crate::workflow::notify;

/// National ids are at most 20 characters in the admin-side schema; the
/// synthesized surrogate fills that width exactly.
const NATIONAL_NO_MAX_LEN: usize = 20;
const PHONE_DIGITS_KEPT: usize = 9;

#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub phone_number: String,
    pub password: String,
    pub national_no: Option<String>,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub third_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Debug)]
pub struct RegisteredAccount {
    pub mobile_user_id: i64,
    pub person_id: i64,
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("{0}")]
    Validation(String),
    #[error("Phone number already registered")]
    PhoneAlreadyRegistered,
    #[error("This person already has a mobile account")]
    PersonAlreadyHasAccount,
    #[error("Email '{0}' is already registered to another person")]
    EmailAlreadyRegistered(String),
    #[error("No countries configured; seed at least one country first")]
    NoCountryConfigured,
    #[error("Invalid date format. Use YYYY-MM-DD format.")]
    InvalidDateFormat,
    #[error("{0}")]
    Persistence(String),
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid phone number or account is inactive")]
    UnknownOrInactiveAccount,
    #[error("Invalid password")]
    WrongPassword,
    #[error("database error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct LoginSession {
    pub user: MobileUserRow,
    pub person: Option<PersonRow>,
    pub token: String,
}

/// Create a Person + MobileUser pair for a mobile signup.
pub async fn register<S>(
    store: &S,
    default_country: &str,
    input: &RegistrationInput,
) -> Result<RegisteredAccount, RegisterError>
where
    S: PersonStore + MobileUserStore + CountryStore + NotificationStore,
{
    let phone = input.phone_number.trim();
    if phone.is_empty() {
        return Err(RegisterError::Validation(
            "Phone number is required".to_string(),
        ));
    }
    if input.password.is_empty() {
        return Err(RegisterError::Validation("Password is required".to_string()));
    }
    let first_name = input.first_name.as_deref().unwrap_or("").trim();
    let last_name = input.last_name.as_deref().unwrap_or("").trim();
    if first_name.is_empty() && last_name.is_empty() {
        return Err(RegisterError::Validation(
            "First name or last name is required".to_string(),
        ));
    }

    if store.mobile_phone_taken(phone).await? {
        return Err(RegisterError::PhoneAlreadyRegistered);
    }

    let supplied_national_no = input
        .national_no
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    // A supplied national id may match a person the admin side already
    // registered; reuse that person unless someone beat them to an account.
    let mut existing_person_id = None;
    if let Some(national_no) = supplied_national_no {
        if let Some(person) = store.find_person_by_national_no(national_no).await? {
            if store.mobile_user_exists_for_person(person.person_id).await? {
                return Err(RegisterError::PersonAlreadyHasAccount);
            }
            existing_person_id = Some(person.person_id);
        }
    }

    let person_id = match existing_person_id {
        Some(id) => id,
        None => {
            create_person_for_signup(store, default_country, input, supplied_national_no).await?
        }
    };

    let password_hash =
        crate::auth::hash_password(&input.password).map_err(RegisterError::Persistence)?;
    let mobile_user_id = store
        .create_mobile_user(person_id, phone, &password_hash)
        .await
        .map_err(|e| {
            RegisterError::Persistence(format!("Failed to create mobile user record: {e}"))
        })?;

    let display_name = store
        .find_person(person_id)
        .await?
        .map(|p| p.full_name())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| first_name.to_string());

    notify::best_effort(
        store,
        NewNotification {
            mobile_user_id,
            donation_appointment_id: None,
            donation_id: None,
            title: "Welcome to the blood bank!".to_string(),
            message: format!(
                "Welcome {display_name}! Thank you for joining. You can now book \
                 donation appointments and track your donation history."
            ),
            notification_type: "Info".to_string(),
        },
    )
    .await;

    Ok(RegisteredAccount {
        mobile_user_id,
        person_id,
    })
}

/// Verify credentials and hand out the app's opaque bearer token.
pub async fn login<S>(
    store: &S,
    phone_number: &str,
    password: &str,
) -> Result<LoginSession, LoginError>
where
    S: MobileUserStore + PersonStore,
{
    let user = store
        .find_mobile_user_by_phone(phone_number.trim())
        .await?
        .filter(|u| u.is_active)
        .ok_or(LoginError::UnknownOrInactiveAccount)?;

    if !crate::auth::verify_password(password, &user.password_hash) {
        return Err(LoginError::WrongPassword);
    }

    if let Err(e) = store.touch_last_login(user.mobile_user_id).await {
        tracing::warn!(
            mobile_user_id = user.mobile_user_id,
            "failed to update last login: {e}"
        );
    }

    let person = store.find_person(user.person_id).await?;
    let token = crate::auth::issue_token(user.mobile_user_id, Utc::now());

    Ok(LoginSession {
        user,
        person,
        token,
    })
}

async fn create_person_for_signup<S>(
    store: &S,
    default_country: &str,
    input: &RegistrationInput,
    supplied_national_no: Option<&str>,
) -> Result<i64, RegisterError>
where
    S: PersonStore + CountryStore,
{
    let now = Utc::now();

    let national_no = match supplied_national_no {
        Some(national_no) => national_no.to_string(),
        None => {
            let candidate = synthesize_national_no(&input.phone_number, now);
            if store
                .find_person_by_national_no(&candidate)
                .await?
                .is_some()
            {
                synthesize_national_no_fallback(&input.phone_number, now)
            } else {
                candidate
            }
        }
    };

    if let Some(email) = input.email.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if store.person_email_taken(email).await? {
            return Err(RegisterError::EmailAlreadyRegistered(email.to_string()));
        }
    }

    let country = match store.find_country_by_name(default_country).await? {
        Some(country) => country,
        None => store
            .first_country()
            .await?
            .ok_or(RegisterError::NoCountryConfigured)?,
    };

    let date_of_birth = parse_date_of_birth(input.date_of_birth.as_deref(), now.date_naive())?;

    let mut person = NewPerson {
        national_no,
        first_name: input.first_name.as_deref().unwrap_or("").trim().to_string(),
        second_name: input.second_name.as_deref().unwrap_or("").trim().to_string(),
        third_name: non_empty(input.third_name.as_deref()),
        last_name: input.last_name.as_deref().unwrap_or("").trim().to_string(),
        date_of_birth,
        gender: 0,
        address: input.address.as_deref().unwrap_or("").trim().to_string(),
        phone: input.phone_number.trim().to_string(),
        email: non_empty(input.email.as_deref()),
        nationality_country_id: country.country_id,
        image_path: non_empty(input.image_path.as_deref()),
    };

    match store.create_person(&person).await {
        Ok(person_id) => Ok(person_id),
        Err(e) if e.is_unique_violation() => {
            // A racing signup can take the synthesized national id between
            // our probe and the insert; retry exactly once with the
            // ticks-based form.
            person.national_no = synthesize_national_no_fallback(&input.phone_number, Utc::now());
            store.create_person(&person).await.map_err(|e| {
                RegisterError::Persistence(format!(
                    "Failed to create person record after retry: {e}"
                ))
            })
        }
        Err(e) => Err(RegisterError::Persistence(format!(
            "Failed to create person record: {e}"
        ))),
    }
}

/// Surrogate national id for app signups: "MOB" + last 9 phone digits +
/// last 8 digits of a wall-clock stamp. Exactly 20 characters.
pub fn synthesize_national_no(phone: &str, now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%d%H%M%S").to_string();
    let suffix = &stamp[stamp.len() - 8..];
    let mut national_no = format!("MOB{}{suffix}", phone_digits(phone));
    national_no.truncate(NATIONAL_NO_MAX_LEN);
    national_no
}

/// Collision fallback keyed off the nanosecond clock instead of wall time.
pub fn synthesize_national_no_fallback(phone: &str, now: DateTime<Utc>) -> String {
    let ticks = now
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .unsigned_abs()
        .to_string();
    let suffix = if ticks.len() > 8 {
        ticks[ticks.len() - 8..].to_string()
    } else {
        format!("{ticks:0>8}")
    };
    let mut national_no = format!("MOB{}{suffix}", phone_digits(phone));
    national_no.truncate(NATIONAL_NO_MAX_LEN);
    national_no
}

fn phone_digits(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > PHONE_DIGITS_KEPT {
        digits[digits.len() - PHONE_DIGITS_KEPT..].to_string()
    } else {
        format!("{:0>width$}", digits, width = PHONE_DIGITS_KEPT)
    }
}

/// Defaults to the minimum donor age (18 years back) when omitted.
fn parse_date_of_birth(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, RegisterError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today - Months::new(12 * 18)),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| RegisterError::InvalidDateFormat)
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
