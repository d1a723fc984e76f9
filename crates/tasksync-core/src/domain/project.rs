//! Project rollup and spotlight records.

use serde::{Deserialize, Serialize};

use super::date::StoredDate;
use super::ids::RecordId;
use super::record::{Properties, PropertyValue, Record};
use super::schema::{ProjectSchema, SpotlightSchema};

/// A row of the project rollup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRollup {
    pub id: RecordId,
    pub name: Option<String>,
    pub last_created: Option<String>,
    pub status: Option<String>,
}

impl ProjectRollup {
    pub fn from_record(record: &Record, schema: &ProjectSchema) -> Self {
        Self {
            id: record.id.clone(),
            name: record.text(&schema.name).map(str::to_string),
            last_created: record.date(&schema.last_created).map(str::to_string),
            status: record.select(&schema.status).map(str::to_string),
        }
    }

    pub fn is_stopped(&self, schema: &ProjectSchema) -> bool {
        self.status.as_deref() == Some(schema.stop_label.as_str())
    }

    /// Properties of a new rollup row: name, latest date, active status.
    pub fn new_properties(name: &str, latest: &StoredDate, schema: &ProjectSchema) -> Properties {
        let mut props = Properties::new();
        props.insert(schema.name.clone(), PropertyValue::title(name));
        props.insert(schema.last_created.clone(), PropertyValue::date(&latest.raw));
        props.insert(
            schema.status.clone(),
            PropertyValue::select(&schema.active_label),
        );
        props
    }

    /// Properties overwriting only the last-created date.
    pub fn date_update(latest: &StoredDate, schema: &ProjectSchema) -> Properties {
        let mut props = Properties::new();
        props.insert(schema.last_created.clone(), PropertyValue::date(&latest.raw));
        props
    }
}

/// A row of the spotlight table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotlightEntry {
    pub id: RecordId,
    pub name: Option<String>,
}

impl SpotlightEntry {
    pub fn from_record(record: &Record, schema: &SpotlightSchema) -> Self {
        Self {
            id: record.id.clone(),
            name: record.text(&schema.name).map(str::to_string),
        }
    }

    pub fn new_properties(name: &str, schema: &SpotlightSchema) -> Properties {
        let mut props = Properties::new();
        props.insert(schema.name.clone(), PropertyValue::title(name));
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rollup_row_is_active() {
        let schema = ProjectSchema::default();
        let latest = StoredDate::parse("2024-05-01").unwrap();
        let props = ProjectRollup::new_properties("Garden", &latest, &schema);
        let rollup = ProjectRollup::from_record(&Record::new(RecordId::new("p1"), props), &schema);

        assert_eq!(rollup.name.as_deref(), Some("Garden"));
        assert_eq!(rollup.last_created.as_deref(), Some("2024-05-01"));
        assert_eq!(rollup.status.as_deref(), Some("active"));
        assert!(!rollup.is_stopped(&schema));
    }

    #[test]
    fn stop_label_marks_stopped() {
        let schema = ProjectSchema::default();
        let rollup = ProjectRollup {
            id: RecordId::new("p"),
            name: Some("B".into()),
            last_created: None,
            status: Some("stop".into()),
        };
        assert!(rollup.is_stopped(&schema));
    }
}
