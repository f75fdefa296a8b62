//! JSON persistence for [`AppState`].
//!
//! Document layout (version 1):
//!
//! ```text
//! {
//!   "version": 1,
//!   "tasks": [ { "id", "title", "description", "scheduled_date", "start_time",
//!                "end_time", "completed", "xp_value", "color" }, ... ],
//!   "player": { "xp", "level", "streak_count", "last_active_date" },
//!   "boss": { "name", "max_hp", "current_hp", "serial", "icon" },   // optional
//!   "bosses_summoned": 0,
//!   "ledger": { "<task id>": { ... }, ... }
//! }
//! ```
//!
//! Saves exported by the older dashboard (`Title`/`Status` rows, `boss_xp`,
//! `active_boss`) are recognised and converted on read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::boss::{Boss, DEFAULT_BOSS_ICON};
use crate::error::QuestError;
use crate::legacy;
use crate::player::PlayerStats;
use crate::state::{AppState, CompletionRecord};
use crate::table::TaskTable;
use crate::task::Task;

pub const SAVE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct StateDocRef<'a> {
    version: u32,
    tasks: &'a [Task],
    player: &'a PlayerStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    boss: Option<&'a Boss>,
    bosses_summoned: u32,
    ledger: &'a BTreeMap<String, CompletionRecord>,
}

fn default_version() -> u32 {
    SAVE_FORMAT_VERSION
}

fn default_icon() -> String {
    DEFAULT_BOSS_ICON.to_string()
}

#[derive(Deserialize)]
struct StateDoc {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    player: PlayerStats,
    #[serde(default)]
    boss: Option<BossDoc>,
    #[serde(default)]
    bosses_summoned: u32,
    #[serde(default)]
    ledger: BTreeMap<String, CompletionRecord>,
}

#[derive(Deserialize)]
struct BossDoc {
    name: String,
    max_hp: u32,
    #[serde(default)]
    current_hp: Option<u32>,
    #[serde(default)]
    serial: u32,
    #[serde(default = "default_icon")]
    icon: String,
}

impl BossDoc {
    fn into_boss(self) -> Result<Boss, QuestError> {
        if self.max_hp == 0 {
            return Err(QuestError::malformed("boss.max_hp must be positive"));
        }
        let current_hp = self.current_hp.unwrap_or(self.max_hp);
        if current_hp > self.max_hp {
            return Err(QuestError::malformed(format!(
                "boss.current_hp {current_hp} exceeds max_hp {}",
                self.max_hp
            )));
        }
        Ok(Boss {
            name: self.name,
            max_hp: self.max_hp,
            current_hp,
            serial: self.serial,
            icon: self.icon,
        })
    }
}

/// Serialization boundary between [`AppState`] and its JSON document.
pub struct StateStore;

impl StateStore {
    pub fn serialize(state: &AppState) -> Value {
        let doc = StateDocRef {
            version: SAVE_FORMAT_VERSION,
            tasks: &state.tasks,
            player: &state.player,
            boss: state.boss.as_ref(),
            bosses_summoned: state.bosses_summoned,
            ledger: &state.ledger,
        };
        serde_json::to_value(doc).expect("save document has only string map keys")
    }

    pub fn deserialize(doc: &Value) -> Result<AppState, QuestError> {
        if !doc.is_object() {
            return Err(QuestError::malformed("save document must be a JSON object"));
        }
        if legacy::looks_legacy(doc) {
            debug!("reading legacy save layout");
            return legacy::from_legacy(doc);
        }

        let doc: StateDoc =
            serde_json::from_value(doc.clone()).map_err(|e| QuestError::malformed(e.to_string()))?;

        if doc.version == 0 || doc.version > SAVE_FORMAT_VERSION {
            return Err(QuestError::malformed(format!(
                "unsupported save version {} (this build reads up to {SAVE_FORMAT_VERSION})",
                doc.version
            )));
        }
        if doc.player.level == 0 {
            return Err(QuestError::malformed("player.level must be at least 1"));
        }

        let mut ids = HashSet::new();
        for (i, task) in doc.tasks.iter().enumerate() {
            if task.id.is_empty() {
                return Err(QuestError::malformed(format!("tasks[{i}]: empty id")));
            }
            if !ids.insert(task.id.as_str()) {
                return Err(QuestError::malformed(format!(
                    "tasks[{i}]: duplicate id '{}'",
                    task.id
                )));
            }
        }

        let boss = doc.boss.map(BossDoc::into_boss).transpose()?;
        let bosses_summoned = boss
            .as_ref()
            .map_or(doc.bosses_summoned, |b| doc.bosses_summoned.max(b.serial));

        let completed: HashSet<&str> = doc
            .tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id.as_str())
            .collect();
        let mut ledger = doc.ledger;
        let before = ledger.len();
        ledger.retain(|id, _| completed.contains(id.as_str()));
        if ledger.len() != before {
            warn!(
                dropped = before - ledger.len(),
                "ignoring ledger entries for tasks that are not completed"
            );
        }

        Ok(AppState {
            tasks: doc.tasks,
            player: doc.player,
            boss,
            bosses_summoned,
            ledger,
        })
    }

    pub fn to_json_string(state: &AppState) -> String {
        let doc = Self::serialize(state);
        serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string())
    }

    pub fn from_json_str(s: &str) -> Result<AppState, QuestError> {
        let doc: Value = serde_json::from_str(s)
            .map_err(|e| QuestError::malformed(format!("not valid JSON: {e}")))?;
        Self::deserialize(&doc)
    }

    pub fn to_tabular(tasks: &[Task]) -> TaskTable {
        TaskTable::from_tasks(tasks)
    }

    pub fn from_tabular(table: &TaskTable) -> Result<Vec<Task>, QuestError> {
        table.to_tasks()
    }
}
