use serde::{Serialize, Serializer};

use crate::CatalogError;

/// Fixed set of app categories.
///
/// The two-letter code is what the `app_entries.category` column stores; the
/// label is what pages show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Fresh,
    Somosa,
    Junior,
    Senior,
    Graduate,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Fresh,
        Category::Somosa,
        Category::Junior,
        Category::Senior,
        Category::Graduate,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Category::Fresh => "FR",
            Category::Somosa => "SO",
            Category::Junior => "JR",
            Category::Senior => "SR",
            Category::Graduate => "GR",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Category::Fresh => "Fresh App",
            Category::Somosa => "Somosa App",
            Category::Junior => "Junior App",
            Category::Senior => "Senior App",
            Category::Graduate => "Graduate App",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for Category {
    type Error = CatalogError;

    /// Codes are matched exactly; `"fr"` is not a category.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Category::ALL
            .into_iter()
            .find(|category| category.code() == value.trim())
            .ok_or_else(|| {
                CatalogError::ConstraintViolation(format!("unknown category code: {value:?}"))
            })
    }
}

/// Serialized as `{"code": "FR", "label": "Fresh App"}` for templates.
impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Category", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("label", self.label())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips() {
        for category in Category::ALL {
            assert_eq!(Category::try_from(category.code()).unwrap(), category);
        }
    }

    #[test]
    fn unknown_codes_violate_constraint() {
        for code in ["", "XX", "fr", "FRE"] {
            assert!(matches!(
                Category::try_from(code),
                Err(CatalogError::ConstraintViolation(_))
            ));
        }
    }
}
