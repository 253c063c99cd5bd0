//! # User Repository
//!
//! Database operations for user accounts (commercials and administrators).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use olivier_core::User;

const USER_COLUMNS: &str = "id, email, full_name, role, sector, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Gets a user by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists all commercials, ordered by name.
    pub async fn list_commercials(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = 'commercial' ORDER BY full_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Inserts a new user.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, email = %user.email, "Inserting user");

        sqlx::query(
            "INSERT INTO users (id, email, full_name, role, sector, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.sector)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
