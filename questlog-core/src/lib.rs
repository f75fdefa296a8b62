//! questlog-core: XP, streak and boss rules for a personal quest log, plus
//! the JSON save format.
//!
//! The engine is a set of pure functions over [`AppState`]; the caller owns
//! the one mutable copy and passes today's date in explicitly.

pub mod boss;
pub mod engine;
pub mod error;
mod legacy;
pub mod player;
pub mod rules;
pub mod scoreboard;
pub mod state;
pub mod store;
pub mod table;
pub mod task;
pub mod timeline;

pub use boss::Boss;
pub use engine::{GameEvent, GamificationEngine, Outcome};
pub use error::QuestError;
pub use player::{PlayerStats, StreakMark};
pub use rules::{DamageRule, GameRules};
pub use scoreboard::{BossStatus, Scoreboard};
pub use state::{AppState, BossHit, CompletionRecord};
pub use store::{SAVE_FORMAT_VERSION, StateStore};
pub use table::{Cell, TaskTable};
pub use task::{NewTask, Task};
pub use timeline::{CalendarEvent, events_to_ics, timeline};
