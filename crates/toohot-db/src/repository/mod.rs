//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  storefront-api service                                                │
//! │       │                                                                 │
//! │       │  db.orders().update_with_version(id, 3, patch)                 │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(new_order, prefix)     one transaction                     │
//! │  ├── get_details(id)               header + items                      │
//! │  ├── update_with_version(..)       compare-and-swap on `version`       │
//! │  └── list(limit, offset)                                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`menu::MenuRepository`] - Catalog reads (plus inserts for seeding)
//! - [`order::OrderRepository`] - Orders, items and order numbering
//! - [`history::StatusHistoryRepository`] - Append-only status audit log
//!
//! Queries are checked at runtime (`sqlx::query_as::<_, T>`), so building
//! the workspace never needs a live database.

pub mod history;
pub mod menu;
pub mod order;
