//! Query filters understood by the table store.

use serde::{Deserialize, Serialize};

use super::record::{PropertyValue, Record};

/// A filter predicate over a record's properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Select property equals the named choice.
    SelectEquals { property: String, value: String },

    /// Select property is anything but the named choice (empty included).
    SelectNotEquals { property: String, value: String },

    /// Select property has no choice.
    SelectIsEmpty { property: String },

    /// Title property equals the text exactly.
    TitleEquals { property: String, value: String },

    /// Every inner filter matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn select_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SelectEquals {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn select_not_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SelectNotEquals {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn select_is_empty(property: impl Into<String>) -> Self {
        Self::SelectIsEmpty {
            property: property.into(),
        }
    }

    pub fn title_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TitleEquals {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Select equality, or "is empty" when there is no value to compare with.
    pub fn select_matches(property: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::select_equals(property, v),
            None => Self::select_is_empty(property),
        }
    }

    /// Evaluate the filter locally (used by the in-memory store).
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::SelectEquals { property, value } => {
                record.select(property) == Some(value.as_str())
            }
            Self::SelectNotEquals { property, value } => {
                record.select(property) != Some(value.as_str())
            }
            Self::SelectIsEmpty { property } => record.select(property).is_none(),
            Self::TitleEquals { property, value } => match record.property(property) {
                Some(PropertyValue::Title(text)) => text == value,
                _ => value.is_empty(),
            },
            Self::And(filters) => filters.iter().all(|f| f.matches(record)),
        }
    }
}
