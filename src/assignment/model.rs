//! Task and developer records consumed by the decision engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Priority used when a task carries none (1 = lowest, 5 = highest).
pub const DEFAULT_PRIORITY: u8 = 3;

/// Lowest valid priority.
pub const MIN_PRIORITY: u8 = 1;

/// Highest valid priority.
pub const MAX_PRIORITY: u8 = 5;

/// Capacity used when a developer record carries none.
pub const DEFAULT_CAPACITY: u32 = 5;

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}

/// Whether a developer can take new work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    /// Storage/wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }

    /// Parse a stored string. Anything unrecognised counts as unavailable.
    pub fn parse(s: &str) -> Self {
        match s {
            "available" => Self::Available,
            _ => Self::Unavailable,
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as supplied by the record source. Immutable for an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Skills the task needs. Empty means anyone qualifies.
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    /// 1–5, 5 being the most urgent.
    #[serde(default = "default_priority")]
    pub priority: u8,
}

impl TaskRecord {
    /// Create a task with no required skills and the default priority.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            required_skills: BTreeSet::new(),
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Builder: set description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Builder: set required skills.
    pub fn with_required_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set priority, clamped into 1–5.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = clamp_priority(priority as i64);
        self
    }
}

/// A developer as supplied by the record source. Immutable for an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub availability: Availability,
    /// Known skills. `None` means nothing is on record; an empty set is a
    /// recorded skill list that happens to be empty.
    #[serde(default)]
    pub skills: Option<BTreeSet<String>>,
    /// Tasks currently assigned.
    #[serde(default)]
    pub current_task_count: u32,
    /// Tasks the developer can carry at once.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

impl DeveloperRecord {
    /// Create an available developer with no skills, no tasks and the default capacity.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            availability: Availability::Available,
            skills: None,
            current_task_count: 0,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Builder: set availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Builder: set skills.
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: set the current task count.
    pub fn with_task_count(mut self, count: u32) -> Self {
        self.current_task_count = count;
        self
    }

    /// Builder: set capacity. Zero is replaced by the default.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        self
    }
}

/// Clamp a raw priority into the valid 1–5 range.
pub fn clamp_priority(raw: i64) -> u8 {
    raw.clamp(MIN_PRIORITY as i64, MAX_PRIORITY as i64) as u8
}
