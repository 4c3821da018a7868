//! # Domain Types
//!
//! The four persisted record kinds plus the snapshot exchanged with the
//! remote object store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Category     │   │     Product     │   │   SaleRecord    │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │◄──│  category_id    │   │  product_id     │        │
//! │  │  name           │   │  price (text)   │   │  product_name*  │        │
//! │  │  image          │   │  quantity       │   │  sold_at_price  │        │
//! │  └─────────────────┘   │  barcode        │   │  timestamp      │        │
//! │                        └─────────────────┘   └─────────────────┘        │
//! │                                              * frozen at sale time      │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │                          Snapshot                                 │  │
//! │  │  { categories[], products[], sales[], earnings, lastSync? }       │  │
//! │  │  The unit of cloud synchronization - always the whole state       │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every type serializes with camelCase field names. The snapshot JSON is
//! the authoritative remote blob layout; renaming a field here is a wire
//! format change and breaks round-trips with existing backups.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

// =============================================================================
// Category
// =============================================================================

/// A product category.
///
/// `id` is an opaque client-generated string, unique within the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier (client-generated, opaque).
    pub id: String,

    /// Display name shown in the catalog.
    pub name: String,

    /// Image reference: data URI or remote URL.
    #[serde(default)]
    pub image: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (client-generated, opaque).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Composite price text: one or two decimal amounts separated by `/`
    /// (retail price, optionally wholesale price). Parsed via
    /// [`crate::price::PriceTag`]; stored verbatim as entered.
    pub price: String,

    /// Current stock level. Invariant: `quantity >= 0` - a sale that
    /// drives the quantity to zero or below removes the product entirely,
    /// so no zero-stock products persist.
    pub quantity: i64,

    /// Foreign key into `Category.id`. May dangle when the category was
    /// deleted without cascading; consumers must treat it defensively.
    #[serde(default)]
    pub category_id: String,

    /// Barcode text, possibly empty.
    #[serde(default)]
    pub barcode: String,

    /// Image reference: data URI or remote URL.
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Checks whether `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.quantity >= quantity
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A single completed sale.
///
/// Uses the snapshot pattern: `product_name` and `product_image` freeze the
/// product as it looked at sale time and are intentionally NOT kept in sync
/// with later product edits. Sale records are append-only - normal operation
/// never mutates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    /// Unique identifier.
    pub id: String,

    /// Historical reference to the sold product (not enforced live - the
    /// product may have been removed since).
    pub product_id: String,

    /// Product name at sale time (frozen).
    pub product_name: String,

    /// Product image at sale time (frozen).
    #[serde(default)]
    pub product_image: String,

    /// Quantity sold. Always positive.
    pub quantity: i64,

    /// The amount credited to earnings for this record (the line total).
    pub sold_at_price: f64,

    /// Creation time in epoch milliseconds, monotonically assigned.
    /// Doubles as unique-enough id material and as the ledger ordering key.
    pub timestamp: i64,
}

// =============================================================================
// Snapshot
// =============================================================================

/// The unit of cloud synchronization: the complete serialized state.
///
/// Never persisted locally as-is - it is constructed on demand from the
/// local store and consumed to overwrite it. The remote object store holds
/// exactly one snapshot per authenticated identity.
///
/// Collections default to empty so that partial blobs (older backups that
/// predate a collection) still parse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub sales: Vec<SaleRecord>,

    /// Running earnings total at snapshot time.
    #[serde(default)]
    pub earnings: f64,

    /// When this snapshot was last pushed, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<i64>,
}

impl Snapshot {
    /// Total record count across all collections (for logging).
    pub fn total_records(&self) -> usize {
        self.categories.len() + self.products.len() + self.sales.len()
    }
}

// =============================================================================
// Identity
// =============================================================================

/// The signed-in user's identity record.
///
/// This is the persisted `session` scalar. The bearer credential and its
/// expiry are NOT part of it - they live inside the credential session and
/// never touch the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: String,
}

// =============================================================================
// Id & Timestamp Generation
// =============================================================================

/// Generates a fresh entity id.
///
/// UUID v4: globally unique without coordination, so ids minted offline on
/// different devices never collide.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Last value handed out by [`next_timestamp`].
static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// Returns a strictly increasing epoch-millisecond timestamp.
///
/// Two sales recorded within the same millisecond still get distinct,
/// ordered timestamps - the ledger relies on `timestamp` for ordering and
/// as unique-enough id material.
pub fn next_timestamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    LAST_TIMESTAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now)
}

// =============================================================================
// Unit Tests
// =============================================================================
