use async_trait::async_trait;

use super::{PgStore, StoreError};
use crate::models::{NewPerson, PersonRow};

const PERSON_COLUMNS: &str = "person_id, national_no, first_name, second_name, third_name, \
     last_name, date_of_birth, gender, address, phone, email, nationality_country_id, image_path";

#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn find_person(&self, person_id: i64) -> Result<Option<PersonRow>, StoreError>;

    async fn find_person_by_national_no(
        &self,
        national_no: &str,
    ) -> Result<Option<PersonRow>, StoreError>;

    /// Case-insensitive email probe. Uniqueness is enforced here rather than
    /// by a constraint, matching the admin-side schema.
    async fn person_email_taken(&self, email: &str) -> Result<bool, StoreError>;

    async fn create_person(&self, person: &NewPerson) -> Result<i64, StoreError>;

    /// Overwrite only the contact fields the caller supplied.
    async fn update_person_contact(
        &self,
        person_id: i64,
        email: Option<&str>,
        address: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
impl PersonStore for PgStore {
    async fn find_person(&self, person_id: i64) -> Result<Option<PersonRow>, StoreError> {
        sqlx::query_as::<_, PersonRow>(&format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE person_id = $1"
        ))
        .bind(person_id)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn find_person_by_national_no(
        &self,
        national_no: &str,
    ) -> Result<Option<PersonRow>, StoreError> {
        sqlx::query_as::<_, PersonRow>(&format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE national_no = $1"
        ))
        .bind(national_no)
        .fetch_optional(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn person_email_taken(&self, email: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM person
                WHERE email IS NOT NULL AND lower(email) = lower($1)
            )
            "#,
        )
        .bind(email)
        .fetch_one(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn create_person(&self, person: &NewPerson) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO person
                (national_no, first_name, second_name, third_name, last_name,
                 date_of_birth, gender, address, phone, email,
                 nationality_country_id, image_path)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            RETURNING person_id
            "#,
        )
        .bind(&person.national_no)
        .bind(&person.first_name)
        .bind(&person.second_name)
        .bind(person.third_name.as_deref())
        .bind(&person.last_name)
        .bind(person.date_of_birth)
        .bind(person.gender)
        .bind(&person.address)
        .bind(&person.phone)
        .bind(person.email.as_deref())
        .bind(person.nationality_country_id)
        .bind(person.image_path.as_deref())
        .fetch_one(self.pool())
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn update_person_contact(
        &self,
        person_id: i64,
        email: Option<&str>,
        address: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE person
            SET email      = COALESCE($2, email),
                address    = COALESCE($3, address),
                image_path = COALESCE($4, image_path)
            WHERE person_id = $1
            "#,
        )
        .bind(person_id)
        .bind(email)
        .bind(address)
        .bind(image_path)
        .execute(self.pool())
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(res.rows_affected() > 0)
    }
}
