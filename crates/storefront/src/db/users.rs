//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{Email, UserId};

use crate::models::user::User;

use super::RepositoryError;

/// Raw user row before email validation.
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: UserId,
    email: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(User {
            id: self.id,
            email,
            created_at: self.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, created_at FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        record.map(UserRecord::into_user).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT id, email, created_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        record.map(UserRecord::into_user).transpose()
    }

    /// Create a new user with email and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, UserRecord>(
            r"
            INSERT INTO users (email)
            VALUES ($1)
            RETURNING id, email, created_at
            ",
        )
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let user = record.into_user()?;

        sqlx::query("INSERT INTO user_passwords (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: UserId,
            email: String,
            created_at: DateTime<Utc>,
            password_hash: Option<String>,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT u.id, u.email, u.created_at, p.password_hash
            FROM users u
            LEFT JOIN user_passwords p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Some(password_hash) = row.password_hash else {
            return Ok(None);
        };

        let user = UserRecord {
            id: row.id,
            email: row.email,
            created_at: row.created_at,
        }
        .into_user()?;

        Ok(Some((user, password_hash)))
    }
}
