//! Service layer.
//!
//! Each service borrows the shared [`AppState`](crate::AppState) and returns
//! domain values; routes turn those into JSON.

pub mod admin;
pub mod menu;
pub mod orders;
pub mod payments;

pub use admin::AdminService;
pub use menu::MenuService;
pub use orders::OrderService;
pub use payments::PaymentService;
