//! # Validation Module
//!
//! Input validation for collaborator-supplied entity values.
//!
//! ## Usage
//! ```rust
//! use nabil_core::validation::{validate_name, validate_sale_quantity};
//!
//! validate_name("Cola 330ml").unwrap();
//! validate_sale_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::price::PriceTag;
use crate::types::{Category, Product};
use crate::{MAX_NAME_LEN, MAX_SALE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a category or product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_NAME_LEN`] characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an entity id.
pub fn validate_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    Ok(())
}

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_SALE_QUANTITY`]
pub fn validate_sale_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_SALE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_SALE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a category before it is written to the store.
pub fn validate_category(category: &Category) -> ValidationResult<()> {
    validate_id(&category.id)?;
    validate_name(&category.name)?;
    Ok(())
}

/// Validates a product before it is written to the store.
///
/// ## Rules
/// - Id and name follow the field rules above
/// - `quantity` must be non-negative (zero-stock products are removed by
///   the sale path, but a fresh product may legitimately start at 0)
/// - `price` must parse as composite price text
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_id(&product.id)?;
    validate_name(&product.name)?;

    if product.quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    PriceTag::parse(&product.price)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64, price: &str) -> Product {
        Product {
            id: "p1".into(),
            name: "Soap".into(),
            price: price.into(),
            quantity,
            category_id: String::new(),
            barcode: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Cola 330ml").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_sale_quantity() {
        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(999).is_ok());

        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-1).is_err());
        assert!(validate_sale_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&product(0, "120")).is_ok());
        assert!(validate_product(&product(5, "120/95")).is_ok());

        assert!(validate_product(&product(-1, "120")).is_err());
        assert!(validate_product(&product(5, "")).is_err());
        assert!(validate_product(&product(5, "not a price")).is_err());
    }

    #[test]
    fn test_validate_category() {
        let category = Category {
            id: "c1".into(),
            name: "Drinks".into(),
            image: String::new(),
        };
        assert!(validate_category(&category).is_ok());

        let nameless = Category {
            id: "c1".into(),
            name: " ".into(),
            image: String::new(),
        };
        assert!(validate_category(&nameless).is_err());
    }
}
