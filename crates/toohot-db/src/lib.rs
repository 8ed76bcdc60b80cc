//! # toohot-db: Database Layer for the TooHot Storefront
//!
//! This crate provides database access for the storefront.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TooHot Storefront Data Flow                         │
//! │                                                                         │
//! │  storefront-api service (create_order, confirm_payment, ...)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    toohot-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ MenuRepo      │    │ 001_initial_ │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │   schema.sql │  │   │
//! │  │   │ WAL + FKs     │    │ HistoryRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./toohot.db)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Menu, order and status history repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use toohot_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./toohot.db")).await?;
//!
//! let menu = db.menu().list_available().await?;
//! let order = db.orders().get_by_number("TH-240615-003").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::history::StatusHistoryRepository;
pub use repository::menu::MenuRepository;
pub use repository::order::{NewOrder, NewOrderItem, OrderPatch, OrderRepository};
