//! Read-only numbers for a status display.

use chrono::NaiveDate;
use serde::Serialize;

use crate::rules::GameRules;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossStatus {
    pub name: String,
    pub icon: String,
    pub current_hp: u32,
    pub max_hp: u32,
    pub hp_fraction: f64,
    pub defeated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoreboard {
    pub level: u32,
    pub xp: u64,
    pub next_level_xp: u64,
    pub progress: f64,
    /// Zero once a full day has passed without activity.
    pub streak: u32,
    pub completed: usize,
    pub total: usize,
    pub boss: Option<BossStatus>,
}

impl Scoreboard {
    pub fn new(state: &AppState, rules: &GameRules, today: NaiveDate) -> Self {
        let level = state.player.level;
        Self {
            level,
            xp: state.player.xp,
            next_level_xp: rules.xp_for_next_level(level),
            progress: rules.level_progress(state.player.xp),
            streak: state.player.effective_streak(today),
            completed: state.completed_count(),
            total: state.tasks.len(),
            boss: state.boss.as_ref().map(|b| BossStatus {
                name: b.name.clone(),
                icon: b.icon.clone(),
                current_hp: b.current_hp,
                max_hp: b.max_hp,
                hp_fraction: b.hp_fraction(),
                defeated: b.is_defeated(),
            }),
        }
    }
}
