//! Player stats and the day-based streak rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub xp: u64,

    /// Derived from `xp`; see [`crate::GameRules::level_for_xp`].
    #[serde(default = "default_level")]
    pub level: u32,

    #[serde(default)]
    pub streak_count: u32,

    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            streak_count: 0,
            last_active_date: None,
        }
    }
}

impl PlayerStats {
    pub fn streak_mark(&self) -> StreakMark {
        StreakMark {
            streak_count: self.streak_count,
            last_active_date: self.last_active_date,
        }
    }

    pub(crate) fn set_streak(&mut self, mark: StreakMark) {
        self.streak_count = mark.streak_count;
        self.last_active_date = mark.last_active_date;
    }

    /// Streak as of `today`: the stored count survives until the end of the
    /// day after the last activity, then reads as 0.
    pub fn effective_streak(&self, today: NaiveDate) -> u32 {
        match self.last_active_date {
            Some(last) if (today - last).num_days() <= 1 => self.streak_count,
            _ => 0,
        }
    }
}

/// The two fields the streak rule reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakMark {
    pub streak_count: u32,
    pub last_active_date: Option<NaiveDate>,
}

impl StreakMark {
    /// Apply one day of activity.
    ///
    /// - same day: unchanged
    /// - the day after: count + 1
    /// - no prior date, or a gap of more than one day: count = 1
    /// - `today` before the last activity: unchanged
    pub fn advance(self, today: NaiveDate) -> StreakMark {
        let streak_count = match self.last_active_date {
            Some(last) => match (today - last).num_days() {
                d if d <= 0 => return self,
                1 => self.streak_count.saturating_add(1),
                _ => 1,
            },
            None => 1,
        };
        StreakMark {
            streak_count,
            last_active_date: Some(today),
        }
    }
}
