//! Table schemas: property names and choice labels of the three tables.
//!
//! Defaults match the production workspace. Labels can be overridden through
//! settings (see `config`), property names only in code.

use serde::{Deserialize, Serialize};

/// Columns and labels of the task table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSchema {
    pub title: String,
    pub status: String,
    pub priority: String,
    pub project: String,
    pub execution_interval: String,
    pub link: String,
    pub task_type: String,
    pub cyclic: String,
    pub created: String,

    /// Status label of a completed task.
    pub done_label: String,
    /// Status label of an open task.
    pub not_done_label: String,
    /// Cyclic label of a task that never recurs.
    pub one_shot_label: String,
}

impl Default for TaskSchema {
    fn default() -> Self {
        Self {
            title: "Tasks".into(),
            status: "Status".into(),
            priority: "Priority".into(),
            project: "Project".into(),
            execution_interval: "ExecutionInterval".into(),
            link: "LinkToTheTask".into(),
            task_type: "TaskType".into(),
            cyclic: "Cyclic".into(),
            created: "DateOfCreation".into(),
            done_label: "Виконано".into(),
            not_done_label: "Не виконано".into(),
            one_shot_label: "Одноразове".into(),
        }
    }
}

/// Columns and labels of the project rollup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSchema {
    pub name: String,
    pub last_created: String,
    pub status: String,
    pub active_label: String,
    pub stop_label: String,
}

impl Default for ProjectSchema {
    fn default() -> Self {
        Self {
            name: "ProjectName".into(),
            last_created: "LastCreated".into(),
            status: "Status".into(),
            active_label: "active".into(),
            stop_label: "stop".into(),
        }
    }
}

/// Columns of the spotlight table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotlightSchema {
    pub name: String,
}

impl Default for SpotlightSchema {
    fn default() -> Self {
        Self {
            name: "ProjectName".into(),
        }
    }
}

/// All three schemas together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub tasks: TaskSchema,
    pub projects: ProjectSchema,
    pub spotlight: SpotlightSchema,
}
