//! Import of saves written by the original dashboard export.
//!
//! That layout stored tasks as spreadsheet rows and derived XP from the
//! number of completed rows:
//!
//! ```text
//! { "tasks": [ { "Title", "Description", "Date", "Start", "End", "Status", "Color" } ],
//!   "boss_xp": 500,
//!   "active_boss": { "Name", "MaxHP", "CurrentHP", "Image" } | null }
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use crate::boss::{Boss, DEFAULT_BOSS_ICON};
use crate::error::QuestError;
use crate::player::PlayerStats;
use crate::rules::GameRules;
use crate::state::AppState;
use crate::task::{DEFAULT_TASK_XP, Task, default_color, default_end, default_start};

#[derive(Deserialize)]
struct LegacyDoc {
    #[serde(default)]
    tasks: Vec<LegacyRow>,
    #[serde(default)]
    boss_xp: u64,
    #[serde(default)]
    active_boss: Option<LegacyBoss>,
}

#[derive(Deserialize)]
struct LegacyRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Start", default)]
    start: Option<NaiveTime>,
    #[serde(rename = "End", default)]
    end: Option<NaiveTime>,
    #[serde(rename = "Status", default)]
    status: Option<bool>,
    #[serde(rename = "Color", default)]
    color: Option<String>,
}

#[derive(Deserialize)]
struct LegacyBoss {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "MaxHP")]
    max_hp: i64,
    #[serde(rename = "CurrentHP")]
    current_hp: i64,
    #[serde(rename = "Image", default)]
    image: Option<String>,
}

pub(crate) fn looks_legacy(doc: &Value) -> bool {
    if doc.get("active_boss").is_some() || doc.get("boss_xp").is_some() {
        return true;
    }
    doc.get("tasks")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
        .is_some_and(|row| row.get("Title").is_some())
}

pub(crate) fn from_legacy(doc: &Value) -> Result<AppState, QuestError> {
    let doc: LegacyDoc = serde_json::from_value(doc.clone())
        .map_err(|e| QuestError::malformed(format!("legacy save: {e}")))?;

    let tasks: Vec<Task> = doc
        .tasks
        .into_iter()
        .enumerate()
        .map(|(i, row)| Task {
            id: format!("quest-{}", i + 1),
            title: row.title,
            description: row.description.unwrap_or_default(),
            scheduled_date: row.date,
            start_time: row.start.unwrap_or_else(default_start),
            end_time: row.end.unwrap_or_else(default_end),
            completed: row.status.unwrap_or(false),
            xp_value: DEFAULT_TASK_XP,
            color: row.color.unwrap_or_else(default_color),
        })
        .collect();

    let task_xp: u64 = tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.xp_value)
        .sum();
    let xp = task_xp.saturating_add(doc.boss_xp);

    let mut done_days: Vec<NaiveDate> = tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.scheduled_date)
        .collect();
    done_days.sort_unstable_by(|a, b| b.cmp(a));
    done_days.dedup();

    let player = PlayerStats {
        xp,
        level: GameRules::default().level_for_xp(xp),
        streak_count: run_length(&done_days),
        last_active_date: done_days.first().copied(),
    };

    let boss = doc.active_boss.map(convert_boss).transpose()?;
    let bosses_summoned = u32::from(boss.is_some());

    Ok(AppState {
        tasks,
        player,
        boss,
        bosses_summoned,
        ledger: Default::default(),
    })
}

fn convert_boss(b: LegacyBoss) -> Result<Boss, QuestError> {
    let mut boss = Boss::summon(&b.name, b.max_hp, 1)
        .map_err(|e| QuestError::malformed(format!("legacy active_boss: {e}")))?;
    // The old dashboard let HP go negative.
    boss.current_hp = u32::try_from(b.current_hp.clamp(0, i64::from(boss.max_hp))).unwrap_or(0);
    boss.icon = b.image.unwrap_or_else(|| DEFAULT_BOSS_ICON.to_string());
    Ok(boss)
}

/// Consecutive days counting back from the most recent one.
/// `days` must be sorted newest first and deduplicated.
fn run_length(days: &[NaiveDate]) -> u32 {
    if days.is_empty() {
        return 0;
    }
    let mut streak = 1;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
