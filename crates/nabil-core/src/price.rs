//! # Price Module
//!
//! Parsing for the composite price text carried by [`crate::types::Product`].
//!
//! ## The Composite Price Field
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product.price encodes one or two decimal amounts separated by `/`:     │
//! │                                                                         │
//! │    "120"        → retail 120.0, no wholesale                            │
//! │    "120/95"     → retail 120.0, wholesale 95.0                          │
//! │    "120 دج/95"  → stray non-numeric characters are stripped             │
//! │                                                                         │
//! │  The raw text is stored verbatim; PriceTag is the parsed view used     │
//! │  to prefill the sale dialog and validate product input.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use crate::error::ValidationError;

/// Parsed form of a product's composite price text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTag {
    /// Retail price - the default sale price.
    pub retail: f64,

    /// Optional wholesale price (the part after `/`).
    pub wholesale: Option<f64>,
}

impl PriceTag {
    /// Parses a composite price text.
    ///
    /// ## Rules
    /// - The part before the first `/` is the retail price (required).
    /// - The part after it, when present and non-empty, is the wholesale
    ///   price.
    /// - Non-numeric characters other than `.` are stripped before parsing
    ///   (currency symbols, spaces).
    /// - Negative amounts cannot be expressed; an amount must parse to a
    ///   finite value.
    ///
    /// ## Example
    /// ```rust
    /// use nabil_core::price::PriceTag;
    ///
    /// let tag = PriceTag::parse("120/95").unwrap();
    /// assert_eq!(tag.retail, 120.0);
    /// assert_eq!(tag.wholesale, Some(95.0));
    /// ```
    pub fn parse(text: &str) -> Result<PriceTag, ValidationError> {
        let mut parts = text.splitn(2, '/');

        let retail = parse_amount(parts.next().unwrap_or(""))?;
        let wholesale = match parts.next() {
            Some(rest) if !rest.trim().is_empty() => Some(parse_amount(rest)?),
            _ => None,
        };

        Ok(PriceTag { retail, wholesale })
    }
}

impl fmt::Display for PriceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wholesale {
            Some(wholesale) => write!(f, "{}/{}", self.retail, wholesale),
            None => write!(f, "{}", self.retail),
        }
    }
}

/// Parses a single decimal amount, stripping non-numeric characters.
fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    if cleaned.is_empty() {
        return Err(ValidationError::Required {
            field: "price".to_string(),
        });
    }

    let amount: f64 = cleaned.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: format!("'{}' is not a decimal amount", raw.trim()),
    })?;

    if !amount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "amount is out of range".to_string(),
        });
    }

    Ok(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retail_only() {
        let tag = PriceTag::parse("120").unwrap();
        assert_eq!(tag.retail, 120.0);
        assert_eq!(tag.wholesale, None);
    }

    #[test]
    fn test_parse_retail_and_wholesale() {
        let tag = PriceTag::parse("120.5/95").unwrap();
        assert_eq!(tag.retail, 120.5);
        assert_eq!(tag.wholesale, Some(95.0));
    }

    #[test]
    fn test_parse_strips_currency_noise() {
        let tag = PriceTag::parse(" 120 DA ").unwrap();
        assert_eq!(tag.retail, 120.0);
    }

    #[test]
    fn test_parse_trailing_slash_means_no_wholesale() {
        let tag = PriceTag::parse("120/").unwrap();
        assert_eq!(tag.wholesale, None);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(PriceTag::parse("").is_err());
        assert!(PriceTag::parse("   ").is_err());
        assert!(PriceTag::parse("abc").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_decimal() {
        assert!(PriceTag::parse("1.2.3").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let tag = PriceTag::parse("120/95").unwrap();
        assert_eq!(tag.to_string(), "120/95");

        let tag = PriceTag::parse("120").unwrap();
        assert_eq!(tag.to_string(), "120");
    }
}
