// File: ./src/model/item.rs
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Title used when nothing is left over after field extraction.
pub const DEFAULT_TITLE: &str = "Untitled Task";
/// Assignee used when no name could be attributed.
pub const DEFAULT_ASSIGNEE: &str = "Unassigned";

#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    P1,
    P2,
    #[default]
    P3,
    P4,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    // The rule-based transcript path has always emitted "pending" even though
    // the canonical set is todo/in_progress/done. Kept as-is so downstream
    // consumers see the same wire value; do not silently map it to Todo.
    Pending,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Manual,
    Transcript,
}

/// The extraction result handed to the persistence/API layer.
///
/// Every field is always populated: extraction has no "could not parse"
/// outcome, so absence of a recognizable pattern resolves to the documented
/// default instead of an error or a null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub due_date: DateTime<Local>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub kind: TaskKind,
}
