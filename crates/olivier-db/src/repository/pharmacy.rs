//! # Pharmacy Repository
//!
//! Database operations for pharmacy accounts.
//!
//! The pharmacy's `discount_rate_bps` is the live negotiated rate. Orders
//! copy it at submission time; changing it here never touches past orders
//! (see the snapshot fields on `orders`).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use olivier_core::Pharmacy;

const PHARMACY_COLUMNS: &str = "id, name, contact_name, address, postal_code, city, \
     phone, email, sector, status, assigned_commercial_id, first_contact_date, \
     discount_rate_bps, created_at";

/// Repository for pharmacy database operations.
#[derive(Debug, Clone)]
pub struct PharmacyRepository {
    pool: SqlitePool,
}

impl PharmacyRepository {
    /// Creates a new PharmacyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PharmacyRepository { pool }
    }

    /// Gets a pharmacy by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Pharmacy>> {
        let pharmacy = sqlx::query_as::<_, Pharmacy>(&format!(
            "SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pharmacy)
    }

    /// Lists all pharmacies, ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Pharmacy>> {
        let pharmacies = sqlx::query_as::<_, Pharmacy>(&format!(
            "SELECT {PHARMACY_COLUMNS} FROM pharmacies ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(pharmacies)
    }

    /// Lists the pharmacies assigned to a commercial, ordered by name.
    ///
    /// This is a commercial's portfolio view; administrators use
    /// [`PharmacyRepository::list_all`].
    pub async fn list_by_commercial(&self, commercial_id: &str) -> DbResult<Vec<Pharmacy>> {
        let pharmacies = sqlx::query_as::<_, Pharmacy>(&format!(
            "SELECT {PHARMACY_COLUMNS} FROM pharmacies \
             WHERE assigned_commercial_id = ?1 ORDER BY name"
        ))
        .bind(commercial_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pharmacies)
    }

    /// Inserts a new pharmacy.
    pub async fn insert(&self, pharmacy: &Pharmacy) -> DbResult<()> {
        debug!(id = %pharmacy.id, name = %pharmacy.name, "Inserting pharmacy");

        sqlx::query(
            "INSERT INTO pharmacies (
                id, name, contact_name, address, postal_code, city,
                phone, email, sector, status, assigned_commercial_id,
                first_contact_date, discount_rate_bps, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&pharmacy.id)
        .bind(&pharmacy.name)
        .bind(&pharmacy.contact_name)
        .bind(&pharmacy.address)
        .bind(&pharmacy.postal_code)
        .bind(&pharmacy.city)
        .bind(&pharmacy.phone)
        .bind(&pharmacy.email)
        .bind(&pharmacy.sector)
        .bind(pharmacy.status)
        .bind(&pharmacy.assigned_commercial_id)
        .bind(pharmacy.first_contact_date)
        .bind(pharmacy.discount_rate_bps)
        .bind(pharmacy.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing pharmacy (all mutable fields).
    pub async fn update(&self, pharmacy: &Pharmacy) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE pharmacies SET
                name = ?2, contact_name = ?3, address = ?4, postal_code = ?5,
                city = ?6, phone = ?7, email = ?8, sector = ?9, status = ?10,
                assigned_commercial_id = ?11, first_contact_date = ?12,
                discount_rate_bps = ?13
             WHERE id = ?1",
        )
        .bind(&pharmacy.id)
        .bind(&pharmacy.name)
        .bind(&pharmacy.contact_name)
        .bind(&pharmacy.address)
        .bind(&pharmacy.postal_code)
        .bind(&pharmacy.city)
        .bind(&pharmacy.phone)
        .bind(&pharmacy.email)
        .bind(&pharmacy.sector)
        .bind(pharmacy.status)
        .bind(&pharmacy.assigned_commercial_id)
        .bind(pharmacy.first_contact_date)
        .bind(pharmacy.discount_rate_bps)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Pharmacy", &pharmacy.id));
        }

        Ok(())
    }

    /// Updates only the negotiated discount rate.
    ///
    /// Existing orders are untouched: their `discount_rate_bps` is a
    /// submission-time snapshot.
    pub async fn set_discount_rate(&self, id: &str, discount_rate_bps: u32) -> DbResult<()> {
        debug!(id = %id, discount_rate_bps = %discount_rate_bps, "Updating pharmacy discount rate");

        let result = sqlx::query("UPDATE pharmacies SET discount_rate_bps = ?2 WHERE id = ?1")
            .bind(id)
            .bind(discount_rate_bps)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Pharmacy", id));
        }

        Ok(())
    }
}
