//! # olivier-db: Database Layer for L'Olivier de Leos
//!
//! Persistence and order orchestration over SQLite (sqlx, async).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   L'Olivier de Leos Data Flow                           │
//! │                                                                         │
//! │  Caller (API handler, back-office task, export job)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    olivier-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌─────────────────┐   │   │
//! │  │   │ OrderService │──►│ Repositories  │   │   Migrations    │   │   │
//! │  │   │ submission,  │   │ orders,       │   │  001_initial    │   │   │
//! │  │   │ reconcile,   │   │ products,     │   │  002_indexes    │   │   │
//! │  │   │ lifecycle    │   │ pharmacies,   │   │  (embedded)     │   │   │
//! │  │   └──────┬───────┘   │ users, KPIs   │   └─────────────────┘   │   │
//! │  │          │           └───────┬───────┘                         │   │
//! │  │          │ pricing &         │                                 │   │
//! │  │          ▼ rules             ▼                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐                         │   │
//! │  │   │ olivier-core │   │  SqlitePool   │  WAL, foreign keys ON   │   │
//! │  │   └──────────────┘   └───────────────┘                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`service`] - The order service (submission, reconciliation, lifecycle)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use olivier_db::{Database, DbConfig, OrderService};
//!
//! let db = Database::new(DbConfig::new("olivier.db")).await?;
//! let service = OrderService::new(db.clone());
//!
//! let order = service
//!     .submit_order(&cart, &pharmacy_id, &commercial_id, None)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{OrderService, ServiceError, ServiceResult};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::pharmacy::PharmacyRepository;
pub use repository::product::ProductRepository;
pub use repository::reporting::ReportingRepository;
pub use repository::user::UserRepository;
