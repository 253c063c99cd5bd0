//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderService / caller                                                  │
//! │       │                                                                 │
//! │       │  db.orders().replace_lines(id, lines, totals)                   │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── insert_with_lines(&self, order, lines)                             │
//! │  ├── replace_lines(&self, id, lines, totals)                            │
//! │  ├── update_status(&self, id, status)                                   │
//! │  └── delete(&self, id)                                                  │
//! │       │                                                                 │
//! │       │  SQL (transactional where it must be)                           │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD and search
//! - [`pharmacy::PharmacyRepository`] - Pharmacy accounts and discount rates
//! - [`user::UserRepository`] - Commercials and administrators
//! - [`order::OrderRepository`] - Orders, lines, atomic reconciliation
//! - [`reporting::ReportingRepository`] - KPI aggregates

pub mod order;
pub mod pharmacy;
pub mod product;
pub mod reporting;
pub mod user;
