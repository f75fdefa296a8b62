//! Boss model: a named HP pool worn down by completed tasks.

use serde::{Deserialize, Serialize};

use crate::error::QuestError;

pub const DEFAULT_BOSS_ICON: &str = "🐉";

fn default_icon() -> String {
    DEFAULT_BOSS_ICON.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boss {
    pub name: String,
    pub max_hp: u32,

    /// Always within `0..=max_hp`.
    pub current_hp: u32,

    /// Summon counter at the time this boss appeared.
    #[serde(default)]
    pub serial: u32,

    #[serde(default = "default_icon")]
    pub icon: String,
}

impl Boss {
    /// A fresh boss at full health.
    pub fn summon(name: &str, max_hp: i64, serial: u32) -> Result<Self, QuestError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuestError::InvalidBossConfig(
                "boss name must not be empty".into(),
            ));
        }
        if max_hp <= 0 {
            return Err(QuestError::InvalidBossConfig(format!(
                "max_hp must be positive, got {max_hp}"
            )));
        }
        let max_hp = u32::try_from(max_hp).map_err(|_| {
            QuestError::InvalidBossConfig(format!("max_hp {max_hp} exceeds {}", u32::MAX))
        })?;

        Ok(Self {
            name: name.to_string(),
            max_hp,
            current_hp: max_hp,
            serial,
            icon: default_icon(),
        })
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    /// Apply up to `damage` HP of damage and return what was actually dealt.
    pub fn take_hit(&mut self, damage: u32) -> u32 {
        let dealt = damage.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Restore `amount` HP, never past `max_hp`.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp - self.current_hp);
        self.current_hp += healed;
        healed
    }

    pub fn hp_fraction(&self) -> f64 {
        self.current_hp as f64 / self.max_hp.max(1) as f64
    }
}
