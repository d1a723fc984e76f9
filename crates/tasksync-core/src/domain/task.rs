//! Task records of the task table.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::Filter;
use super::record::{Properties, PropertyValue, Record};
use super::schema::TaskSchema;

/// Completion status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Done,
    NotDone,
}

impl TaskStatus {
    /// The select label used for this status in the task table.
    pub fn label(self, schema: &TaskSchema) -> &str {
        match self {
            TaskStatus::Done => &schema.done_label,
            TaskStatus::NotDone => &schema.not_done_label,
        }
    }
}

/// Effective field values of a task, defaults applied.
///
/// Missing title and execution interval read as empty text, every other
/// field as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    pub priority: Option<String>,
    pub project: Option<String>,
    pub execution_interval: String,
    pub link: Option<String>,
    pub task_type: Option<String>,
    pub cyclic: Option<String>,
}

impl TaskFields {
    pub fn from_record(record: &Record, schema: &TaskSchema) -> Self {
        let owned = |v: Option<&str>| v.map(str::to_string);
        Self {
            title: record.text(&schema.title).unwrap_or_default().to_string(),
            priority: owned(record.select(&schema.priority)),
            project: owned(record.select(&schema.project)),
            execution_interval: record
                .text(&schema.execution_interval)
                .unwrap_or_default()
                .to_string(),
            link: owned(record.url(&schema.link)),
            task_type: owned(record.select(&schema.task_type)),
            cyclic: owned(record.select(&schema.cyclic)),
        }
    }

    pub fn is_one_shot(&self, schema: &TaskSchema) -> bool {
        self.cyclic.as_deref() == Some(schema.one_shot_label.as_str())
    }

    /// Properties of a fresh task with these values and the given status.
    ///
    /// Absent optional values are left out instead of being written empty.
    pub fn to_properties(&self, status: TaskStatus, schema: &TaskSchema) -> Properties {
        let mut props = Properties::new();
        props.insert(schema.title.clone(), PropertyValue::title(&self.title));
        props.insert(
            schema.status.clone(),
            PropertyValue::select(status.label(schema)),
        );
        if let Some(priority) = &self.priority {
            props.insert(schema.priority.clone(), PropertyValue::select(priority));
        }
        if let Some(project) = &self.project {
            props.insert(schema.project.clone(), PropertyValue::select(project));
        }
        if !self.execution_interval.is_empty() {
            props.insert(
                schema.execution_interval.clone(),
                PropertyValue::rich_text(&self.execution_interval),
            );
        }
        if let Some(link) = &self.link {
            props.insert(schema.link.clone(), PropertyValue::Url(Some(link.clone())));
        }
        if let Some(task_type) = &self.task_type {
            props.insert(schema.task_type.clone(), PropertyValue::select(task_type));
        }
        if let Some(cyclic) = &self.cyclic {
            props.insert(schema.cyclic.clone(), PropertyValue::select(cyclic));
        }
        props
    }

    /// Filter for an open, recurring task with the same title and project.
    pub fn open_duplicate_filter(&self, schema: &TaskSchema) -> Filter {
        Filter::And(vec![
            Filter::title_equals(&schema.title, &self.title),
            Filter::select_equals(&schema.status, &schema.not_done_label),
            Filter::select_not_equals(&schema.cyclic, &schema.one_shot_label),
            Filter::select_matches(&schema.project, self.project.as_deref()),
        ])
    }

    pub fn recurrence_key(&self) -> RecurrenceKey {
        RecurrenceKey {
            title: self.title.clone(),
            project: self.project.clone(),
            cyclic: self.cyclic.clone(),
        }
    }
}

/// Identity of one recurring task: (title, project, cyclic class).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecurrenceKey {
    pub title: String,
    pub project: Option<String>,
    pub cyclic: Option<String>,
}

impl fmt::Display for RecurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.title,
            self.project.as_deref().unwrap_or("null"),
            self.cyclic.as_deref().unwrap_or("null")
        )
    }
}
