//! Domain identifiers (strongly-typed IDs).
//!
//! Remote identities are opaque strings handed out by the table service.
//! `Id<T>` wraps the string and uses a phantom marker so a record id can never
//! be passed where a database id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait for each ID kind.
pub trait IdMarker: Send + Sync + 'static {
    /// Human-readable kind, used in log fields and error messages.
    fn kind() -> &'static str;
}

/// Generic opaque identifier.
///
/// `T` is only a compile-time marker (PhantomData), so `Id<T>` is exactly the
/// size of its `String`.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// Build an id from a ULID (used by locally generated records).
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(ulid.to_string().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whitespace-only ids are treated as unset.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

// Manual impls: derives would require `T: Clone`, `T: PartialEq`, ...
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::kind(), self.value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

// ========================================
// Marker types
// ========================================

/// Marker for a table (database) identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Database {}

impl IdMarker for Database {
    fn kind() -> &'static str {
        "database"
    }
}

/// Marker for a single row (page) identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Page {}

impl IdMarker for Page {
    fn kind() -> &'static str {
        "record"
    }
}

/// Identifier of a remote table.
pub type DatabaseId = Id<Database>;

/// Identifier of a record inside a remote table.
pub type RecordId = Id<Page>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_raw_value() {
        let db = DatabaseId::new("abc123");
        let rec = RecordId::new("page-1");
        assert_eq!(db.to_string(), "abc123");
        assert_eq!(rec.to_string(), "page-1");
        assert_eq!(format!("{db:?}"), "database(abc123)");
        assert_eq!(format!("{rec:?}"), "record(page-1)");
        // let _: DatabaseId = rec; // <- does not compile
    }

    #[test]
    fn blank_ids_are_detected() {
        assert!(DatabaseId::new("").is_blank());
        assert!(DatabaseId::new("   ").is_blank());
        assert!(!DatabaseId::new("x").is_blank());
    }

    #[test]
    fn ulid_ids_are_lowercase_and_unique() {
        let a = RecordId::from_ulid(Ulid::new());
        let b = RecordId::from_ulid(Ulid::new());
        assert_ne!(a, b);
        assert_eq!(a.as_str(), a.as_str().to_lowercase());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = RecordId::new("r-1");
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"r-1\"");
        let back: RecordId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }
}
