//! Task (quest) model.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::QuestError;

/// XP carried by a task unless the rules say otherwise.
pub const DEFAULT_TASK_XP: u64 = 50;
pub const DEFAULT_COLOR: &str = "#3788d8";

pub(crate) fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub(crate) fn default_end() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub(crate) fn default_xp() -> u64 {
    DEFAULT_TASK_XP
}

pub(crate) fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A quest on the board.
///
/// `id`, `title` and `scheduled_date` are required when reading a save file;
/// everything else has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub scheduled_date: NaiveDate,

    #[serde(default = "default_start")]
    pub start_time: NaiveTime,

    #[serde(default = "default_end")]
    pub end_time: NaiveTime,

    #[serde(default)]
    pub completed: bool,

    #[serde(default = "default_xp")]
    pub xp_value: u64,

    /// `#RRGGBB`, used by the calendar view.
    #[serde(default = "default_color")]
    pub color: String,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            scheduled_date: date,
            start_time: default_start(),
            end_time: default_end(),
            completed: false,
            xp_value: DEFAULT_TASK_XP,
            color: default_color(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_xp(mut self, xp: u64) -> Self {
        self.xp_value = xp;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.scheduled_date.and_time(self.start_time)
    }

    pub fn validate(&self) -> Result<(), QuestError> {
        check_fields(&self.title, &self.color)
    }

    /// Copy the user-editable fields from `other`, leaving id, completion
    /// and XP value alone.
    pub(crate) fn take_edits(&mut self, other: &Task) {
        self.title = other.title.clone();
        self.description = other.description.clone();
        self.scheduled_date = other.scheduled_date;
        self.start_time = other.start_time;
        self.end_time = other.end_time;
        self.color = other.color.clone();
    }
}

/// User input for a new task. The engine assigns the id and XP value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub color: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            start: default_start(),
            end: default_end(),
            color: default_color(),
        }
    }

    pub fn validate(&self) -> Result<(), QuestError> {
        check_fields(&self.title, &self.color)
    }
}

fn check_fields(title: &str, color: &str) -> Result<(), QuestError> {
    if title.trim().is_empty() {
        return Err(QuestError::InvalidTask("title must not be empty".into()));
    }
    if !is_hex_color(color) {
        return Err(QuestError::InvalidTask(format!(
            "color must look like #RRGGBB, got '{color}'"
        )));
    }
    Ok(())
}

fn color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("static color regex"))
}

pub fn is_hex_color(s: &str) -> bool {
    color_re().is_match(s)
}

/// Next free `quest-N` id, one past the highest numeric suffix in use.
pub(crate) fn next_task_id<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let max = ids
        .into_iter()
        .filter_map(|id| id.strip_prefix("quest-"))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("quest-{}", max + 1)
}
