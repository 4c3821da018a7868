//! # Repository Module
//!
//! One repository per collection, each a thin wrapper over the shared
//! connection pool:
//!
//! - [`category::CategoryRepository`] - the `categories` collection
//! - [`product::ProductRepository`] - the `products` collection
//! - [`sale::SaleRepository`] - the append-only `sales` ledger
//! - [`scalar::ScalarRepository`] - the non-collection values
//!   (`earnings`, `session`, `last_sync`)
//!
//! Every `upsert` is a single `INSERT .. ON CONFLICT` statement: the saved
//! item fully replaces any existing item with the same id, and two racing
//! saves serialize at the database rather than losing an update.

pub mod category;
pub mod product;
pub mod sale;
pub mod scalar;
