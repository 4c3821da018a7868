//! # nabil-core: Pure Data Contracts for Nabil POS
//!
//! This crate defines the persisted record kinds of the inventory system
//! and the pure helpers that operate on them. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Nabil POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI Collaborators (out of scope)              │   │
//! │  │    Forms ──► Barcode scanner ──► Sale dialog ──► Account modal  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ typed operations                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    nabil-app (facade)                           │   │
//! │  └───────────┬─────────────────────────────────────┬───────────────┘   │
//! │              │                                     │                   │
//! │  ┌───────────▼───────────┐             ┌───────────▼───────────┐       │
//! │  │     nabil-store       │             │      nabil-sync       │       │
//! │  │  SQLite collections   │             │  credential + cloud   │       │
//! │  └───────────┬───────────┘             └───────────┬───────────┘       │
//! │              │                                     │                   │
//! │  ┌───────────▼─────────────────────────────────────▼───────────────┐   │
//! │  │               ★ nabil-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   price   │  │ validation │  │   error   │  │   │
//! │  │   │ Category  │  │ PriceTag  │  │   rules    │  │ CoreError │  │   │
//! │  │   │ Product   │  │ retail /  │  │   checks   │  │Validation │  │   │
//! │  │   │SaleRecord │  │ wholesale │  │            │  │   Error   │  │   │
//! │  │   │ Snapshot  │  │           │  │            │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Persisted entities (Category, Product, SaleRecord, Snapshot)
//! - [`price`] - Composite price text parsing (`retail[/wholesale]`)
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod price;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use price::PriceTag;
pub use types::{generate_id, next_timestamp, Category, Identity, Product, SaleRecord, Snapshot};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length for category and product names.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum quantity for a single sale.
///
/// Prevents accidental over-selling (e.g., typing 1000 instead of 10).
pub const MAX_SALE_QUANTITY: i64 = 999;
