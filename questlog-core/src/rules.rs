//! Tunable constants for the rule set.
//!
//! Defaults are pinned by tests; the CLI can override them from the
//! `[rules]` table of `config.toml`.

use serde::{Deserialize, Serialize};

/// How much HP a completed task takes off the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageRule {
    /// Damage equals the XP the task awarded.
    MatchXp,
    /// Flat damage per completed task.
    Fixed(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub xp_per_task: u64,
    pub xp_per_level: u64,
    pub boss_damage: DamageRule,
    pub boss_defeat_bonus_xp: u64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            xp_per_task: 50,
            xp_per_level: 100,
            boss_damage: DamageRule::MatchXp,
            boss_defeat_bonus_xp: 500,
        }
    }
}

impl GameRules {
    /// `floor(xp / xp_per_level) + 1`, saturating at `u32::MAX`.
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        let per_level = self.xp_per_level.max(1);
        u32::try_from(xp / per_level)
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }

    /// Total XP at which `level + 1` begins.
    pub fn xp_for_next_level(&self, level: u32) -> u64 {
        u64::from(level).saturating_mul(self.xp_per_level.max(1))
    }

    /// Fraction of the current level already earned, in `[0, 1)`.
    pub fn level_progress(&self, xp: u64) -> f64 {
        let per_level = self.xp_per_level.max(1);
        (xp % per_level) as f64 / per_level as f64
    }

    pub fn damage_for(&self, xp_awarded: u64) -> u32 {
        match self.boss_damage {
            DamageRule::MatchXp => u32::try_from(xp_awarded).unwrap_or(u32::MAX),
            DamageRule::Fixed(n) => n,
        }
    }
}
