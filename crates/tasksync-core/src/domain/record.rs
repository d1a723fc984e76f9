//! Record model: a remote row with typed properties.
//!
//! Only the property shapes the sync reads or writes are modelled. Anything
//! else the service returns is kept as `Unsupported` so decoding never fails
//! on a column this crate doesn't care about.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::RecordId;

/// A single typed property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// The table's title column (plain text of the first fragment).
    Title(String),

    /// Rich text column (plain text of the first fragment).
    RichText(String),

    /// Single-select choice, `None` when nothing is selected.
    Select(Option<String>),

    /// URL column.
    Url(Option<String>),

    /// Date column, holding the ISO-8601 `start` as sent by the service.
    Date(Option<String>),

    /// Any shape not modelled here (the service type name is kept).
    Unsupported(String),
}

impl PropertyValue {
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title(text.into())
    }

    pub fn rich_text(text: impl Into<String>) -> Self {
        Self::RichText(text.into())
    }

    pub fn select(name: impl Into<String>) -> Self {
        Self::Select(Some(name.into()))
    }

    pub fn date(start: impl Into<String>) -> Self {
        Self::Date(Some(start.into()))
    }

    /// Text content for title / rich text properties. Empty text reads as `None`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Title(s) | Self::RichText(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_select(&self) -> Option<&str> {
        match self {
            Self::Select(Some(name)) if !name.is_empty() => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Url(Some(url)) if !url.is_empty() => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&str> {
        match self {
            Self::Date(Some(start)) if !start.is_empty() => Some(start.as_str()),
            _ => None,
        }
    }
}

/// Property name -> value.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A row of a remote table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,

    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub properties: Properties,
}

impl Record {
    pub fn new(id: RecordId, properties: Properties) -> Self {
        Self {
            id,
            archived: false,
            properties,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_text)
    }

    pub fn select(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_select)
    }

    pub fn url(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_url)
    }

    pub fn date(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_date)
    }
}
