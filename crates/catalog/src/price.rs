use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::CatalogError;

/// Price of an app, stored as **integer minor units** (cents).
///
/// Prices are never negative and fit a `DECIMAL(10, 2)` column, so the
/// largest accepted value is `99999999.99`.
///
/// ```rust
/// use catalog::Price;
///
/// let price: Price = "4,5".parse().unwrap();
/// assert_eq!(price.minor(), 450);
/// assert_eq!(price.to_string(), "4.50");
/// assert!("-1".parse::<Price>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);
    pub const MAX: Price = Price(9_999_999_999);

    /// Builds a price from cents, rejecting values outside `0..=MAX`.
    pub fn from_minor(minor: i64) -> Result<Self, CatalogError> {
        if !(0..=Self::MAX.0).contains(&minor) {
            return Err(CatalogError::ConstraintViolation(format!(
                "price must be between 0.00 and {}",
                Self::MAX
            )));
        }
        Ok(Self(minor))
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Price {
    type Err = CatalogError;

    /// Parses `12`, `12.5`, `12.50` or `12,50`. An empty string is `0.00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::Validation(format!("invalid price: {s:?}"));

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        if trimmed.starts_with('-') {
            return Err(CatalogError::ConstraintViolation(
                "price must not be negative".to_string(),
            ));
        }

        let normalized = trimmed.replace(',', ".");
        let (units, fraction) = match normalized.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (normalized.as_str(), ""),
        };

        if units.is_empty() || !units.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units.parse().map_err(|_| invalid())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let minor = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;
        Self::from_minor(minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_always_has_two_decimals() {
        assert_eq!(Price::ZERO.to_string(), "0.00");
        assert_eq!(Price(5).to_string(), "0.05");
        assert_eq!(Price(1999).to_string(), "19.99");
        assert_eq!(Price::MAX.to_string(), "99999999.99");
    }

    #[test]
    fn parse_accepts_common_inputs() {
        assert_eq!("".parse::<Price>().unwrap(), Price::ZERO);
        assert_eq!("3".parse::<Price>().unwrap().minor(), 300);
        assert_eq!("3.5".parse::<Price>().unwrap().minor(), 350);
        assert_eq!(" 3,05 ".parse::<Price>().unwrap().minor(), 305);
        assert_eq!("3.".parse::<Price>().unwrap().minor(), 300);
    }

    #[test]
    fn parse_rejects_garbage_and_precision() {
        assert!(matches!(
            "abc".parse::<Price>(),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            "1.234".parse::<Price>(),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            "1.2.3".parse::<Price>(),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn negative_and_oversized_prices_violate_constraints() {
        assert!(matches!(
            "-0.01".parse::<Price>(),
            Err(CatalogError::ConstraintViolation(_))
        ));
        assert!(matches!(
            "100000000".parse::<Price>(),
            Err(CatalogError::ConstraintViolation(_))
        ));
        assert!(Price::from_minor(-1).is_err());
    }
}
