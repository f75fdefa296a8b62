//! The aggregate state value threaded through the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::boss::Boss;
use crate::player::{PlayerStats, StreakMark};
use crate::task::Task;

/// Damage one completion dealt to a particular boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossHit {
    pub boss_serial: u32,
    /// After clamping to the boss's remaining HP.
    pub damage: u32,
}

/// Everything `complete_task` changed, so `uncomplete_task` can put it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub completed_on: NaiveDate,
    pub xp_awarded: u64,
    #[serde(default)]
    pub bonus_xp: u64,
    #[serde(default)]
    pub hit: Option<BossHit>,
    pub streak_before: StreakMark,
    pub streak_after: StreakMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub player: PlayerStats,
    pub boss: Option<Boss>,
    pub bosses_summoned: u32,

    /// Keyed by task id; only completed tasks have an entry.
    pub ledger: BTreeMap<String, CompletionRecord>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn active_boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }
}
