//! Settings loading with environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SyncSettings::default()`]
//! 2. Apply environment variable overrides (see [`apply_overrides`])
//!
//! Parsing is strict: numeric values must be valid and in range, otherwise
//! the default stays and the rejected value is returned to the caller.
//! Nothing is validated here; missing ids and tokens are rejected when the
//! synchronizer or the HTTP store is built, before any remote call.

use std::fmt;

use serde::{Deserialize, Serialize};
use crate::domain::errors::ConfigError;
use crate::domain::{DatabaseId, Schema};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Connection settings for the table service.
#[derive(Clone, Serialize, Deserialize)]
pub struct NotionSettings {
    pub token: String,
    pub base_url: String,
    pub api_version: String,
}

impl Default for NotionSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            api_version: DEFAULT_API_VERSION.into(),
        }
    }
}

// Keep the token out of logs.
impl fmt::Debug for NotionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionSettings")
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Raw table ids as configured (possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub tasks: String,
    pub projects: String,
    pub spotlight: String,
}

impl DatabaseSettings {
    pub fn ids(&self) -> DatabaseIds {
        DatabaseIds {
            tasks: DatabaseId::new(self.tasks.trim()),
            projects: DatabaseId::new(self.projects.trim()),
            spotlight: DatabaseId::new(self.spotlight.trim()),
        }
    }
}

/// Identities of the three tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseIds {
    pub tasks: DatabaseId,
    pub projects: DatabaseId,
    pub spotlight: DatabaseId,
}

impl DatabaseIds {
    pub fn new(
        tasks: impl Into<DatabaseId>,
        projects: impl Into<DatabaseId>,
        spotlight: impl Into<DatabaseId>,
    ) -> Self {
        Self {
            tasks: tasks.into(),
            projects: projects.into(),
            spotlight: spotlight.into(),
        }
    }

    /// Every id must be non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tasks.is_blank() {
            return Err(ConfigError::MissingDatabaseId("tasks"));
        }
        if self.projects.is_blank() {
            return Err(ConfigError::MissingDatabaseId("projects"));
        }
        if self.spotlight.is_blank() {
            return Err(ConfigError::MissingDatabaseId("spotlight"));
        }
        Ok(())
    }
}

/// Sweep worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Maximum number of records processed at once.
    pub concurrency: usize,
    /// Page size requested from the service.
    pub page_size: u32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    pub notion: NotionSettings,
    pub databases: DatabaseSettings,
    pub sweep: SweepSettings,
    pub schema: Schema,
    pub log_level: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            notion: NotionSettings::default(),
            databases: DatabaseSettings::default(),
            sweep: SweepSettings::default(),
            schema: Schema::default(),
            log_level: "info".into(),
        }
    }
}

/// Load settings: defaults plus process environment overrides.
///
/// Returns the settings and the overrides that were ignored.
pub fn load_settings() -> (SyncSettings, Vec<ConfigError>) {
    let mut settings = SyncSettings::default();
    let rejected = apply_overrides(&mut settings, |key| std::env::var(key).ok());
    (settings, rejected)
}

/// Apply overrides read through `lookup` (the process environment in production).
///
/// Values that fail to parse leave the default in place and come back as
/// `ConfigError::Invalid`.
pub fn apply_overrides(
    settings: &mut SyncSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<ConfigError> {
    let mut rejected = Vec::new();
    let read_string = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    // ── Service ─────────────────────────────────────────────────────
    if let Some(v) = read_string("NOTION_TOKEN") {
        settings.notion.token = v;
    }
    if let Some(v) = read_string("NOTION_BASE_URL") {
        settings.notion.base_url = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = read_string("NOTION_VERSION") {
        settings.notion.api_version = v;
    }

    // ── Tables ──────────────────────────────────────────────────────
    if let Some(v) = read_string("TASKS_DATABASE_ID") {
        settings.databases.tasks = v;
    }
    if let Some(v) = read_string("PROJECTS_DATABASE_ID") {
        settings.databases.projects = v;
    }
    if let Some(v) = read_string("SPOTLIGHT_DATABASE_ID") {
        settings.databases.spotlight = v;
    }

    // ── Sweep ───────────────────────────────────────────────────────
    if let Some(raw) = read_string("TASKSYNC_CONCURRENCY") {
        match parse_usize_in_range(&raw, 1, 64) {
            Some(v) => settings.sweep.concurrency = v,
            None => rejected.push(ConfigError::Invalid {
                key: "TASKSYNC_CONCURRENCY",
                value: raw,
            }),
        }
    }
    if let Some(raw) = read_string("TASKSYNC_PAGE_SIZE") {
        match parse_usize_in_range(&raw, 1, 100) {
            Some(v) => settings.sweep.page_size = v as u32,
            None => rejected.push(ConfigError::Invalid {
                key: "TASKSYNC_PAGE_SIZE",
                value: raw,
            }),
        }
    }

    // ── Labels ──────────────────────────────────────────────────────
    if let Some(v) = read_string("TASKSYNC_DONE_LABEL") {
        settings.schema.tasks.done_label = v;
    }
    if let Some(v) = read_string("TASKSYNC_NOT_DONE_LABEL") {
        settings.schema.tasks.not_done_label = v;
    }
    if let Some(v) = read_string("TASKSYNC_ONE_SHOT_LABEL") {
        settings.schema.tasks.one_shot_label = v;
    }

    if let Some(v) = read_string("TASKSYNC_LOG_LEVEL") {
        settings.log_level = v;
    }

    rejected
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse an integer and check it lies in `min..=max`.
pub fn parse_usize_in_range(val: &str, min: usize, max: usize) -> Option<usize> {
    val.trim()
        .parse::<usize>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}
