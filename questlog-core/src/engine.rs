//! Gamification engine: XP, levels, streaks and boss damage.
//!
//! Every operation takes the current [`AppState`] by reference and returns a
//! new one inside an [`Outcome`]. Nothing here reads the clock or touches the
//! filesystem; callers pass `today` in.
//!
//! Rules (defaults in [`GameRules`]):
//! - completing a task awards its `xp_value`
//! - `level = xp / xp_per_level + 1`
//! - damage follows [`crate::DamageRule`], clamped to the boss's remaining HP
//! - the completion that brings a boss to 0 HP awards `boss_defeat_bonus_xp`
//! - each completion is logged in the ledger so it can be undone exactly

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::boss::Boss;
use crate::error::QuestError;
use crate::rules::GameRules;
use crate::state::{AppState, BossHit, CompletionRecord};
use crate::task::{NewTask, Task, next_task_id};

/// Something the presentation layer may want to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    TaskAdded { task_id: String },
    TaskEdited { task_id: String },
    TaskRemoved { task_id: String },
    XpGained { task_id: String, xp: u64 },
    XpLost { task_id: String, xp: u64 },
    LevelUp { level: u32 },
    LevelDown { level: u32 },
    StreakStarted,
    StreakExtended { streak: u32 },
    StreakRestored { streak: u32 },
    BossSummoned { name: String, max_hp: u32 },
    BossHit { name: String, damage: u32, remaining: u32 },
    BossHealed { name: String, amount: u32, remaining: u32 },
    BossDefeated { name: String, bonus_xp: u64 },
    BossFled { name: String },
}

/// Result of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub state: AppState,
    pub events: Vec<GameEvent>,
    /// Why the call was a no-op, if it was one. `state` is then an
    /// unchanged copy of the input.
    pub skipped: Option<QuestError>,
}

impl Outcome {
    fn applied(state: AppState, events: Vec<GameEvent>) -> Self {
        Self {
            state,
            events,
            skipped: None,
        }
    }

    fn skip(state: &AppState, reason: QuestError) -> Self {
        debug!(%reason, "engine no-op");
        Self {
            state: state.clone(),
            events: Vec::new(),
            skipped: Some(reason),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.skipped.is_none()
    }

    /// Id of the first task this call added, if any.
    pub fn added_task_id(&self) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            GameEvent::TaskAdded { task_id } => Some(task_id.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GamificationEngine {
    rules: GameRules,
}

impl GamificationEngine {
    pub fn new(rules: GameRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Mark a task completed and apply its rewards.
    ///
    /// Unknown ids and already-completed tasks are no-ops, so calling this
    /// twice never double-awards.
    pub fn complete_task(&self, state: &AppState, task_id: &str, today: NaiveDate) -> Outcome {
        let Some(task) = state.task(task_id) else {
            return Outcome::skip(state, QuestError::UnknownTask(task_id.to_string()));
        };
        if task.completed {
            return Outcome::skip(state, QuestError::AlreadyCompleted(task_id.to_string()));
        }
        let xp = task.xp_value;

        let mut next = state.clone();
        let mut events = Vec::new();
        let level_before = next.player.level;

        events.push(GameEvent::XpGained {
            task_id: task_id.to_string(),
            xp,
        });

        let streak_before = next.player.streak_mark();
        let streak_after = streak_before.advance(today);
        next.player.set_streak(streak_after);
        if streak_after != streak_before {
            events.push(if streak_after.streak_count == 1 {
                GameEvent::StreakStarted
            } else {
                GameEvent::StreakExtended {
                    streak: streak_after.streak_count,
                }
            });
        }

        let mut hit = None;
        let mut bonus_xp = 0;
        if let Some(boss) = next.boss.as_mut().filter(|b| !b.is_defeated()) {
            let damage = boss.take_hit(self.rules.damage_for(xp));
            if damage > 0 {
                hit = Some(BossHit {
                    boss_serial: boss.serial,
                    damage,
                });
                events.push(GameEvent::BossHit {
                    name: boss.name.clone(),
                    damage,
                    remaining: boss.current_hp,
                });
            }
            if boss.is_defeated() {
                bonus_xp = self.rules.boss_defeat_bonus_xp;
                events.push(GameEvent::BossDefeated {
                    name: boss.name.clone(),
                    bonus_xp,
                });
            }
        }
        let Some(total) = xp
            .checked_add(bonus_xp)
            .and_then(|gain| next.player.xp.checked_add(gain))
        else {
            return Outcome::skip(state, QuestError::XpOverflow(task_id.to_string()));
        };
        next.player.xp = total;

        self.relevel(&mut next, level_before, &mut events);

        if let Some(t) = next.task_mut(task_id) {
            t.completed = true;
        }
        next.ledger.insert(
            task_id.to_string(),
            CompletionRecord {
                completed_on: today,
                xp_awarded: xp,
                bonus_xp,
                hit,
                streak_before,
                streak_after,
            },
        );

        debug!(task_id, xp, bonus_xp, ?hit, "task completed");
        Outcome::applied(next, events)
    }

    /// Undo a completion, reversing exactly what [`Self::complete_task`] did.
    ///
    /// HP only comes back if the boss that took the hit is still the active
    /// one, and the streak only rolls back if nothing else has moved it since.
    pub fn uncomplete_task(&self, state: &AppState, task_id: &str) -> Outcome {
        let Some(task) = state.task(task_id) else {
            return Outcome::skip(state, QuestError::UnknownTask(task_id.to_string()));
        };
        if !task.completed {
            return Outcome::skip(state, QuestError::NotCompleted(task_id.to_string()));
        }
        let task_xp = task.xp_value;

        let mut next = state.clone();
        let mut events = Vec::new();
        let level_before = next.player.level;

        match next.ledger.remove(task_id) {
            Some(record) => {
                let lost = record.xp_awarded.saturating_add(record.bonus_xp);
                next.player.xp = next.player.xp.saturating_sub(lost);
                events.push(GameEvent::XpLost {
                    task_id: task_id.to_string(),
                    xp: lost,
                });

                if let Some(hit) = record.hit {
                    if let Some(boss) = next.boss.as_mut().filter(|b| b.serial == hit.boss_serial) {
                        let amount = boss.heal(hit.damage);
                        events.push(GameEvent::BossHealed {
                            name: boss.name.clone(),
                            amount,
                            remaining: boss.current_hp,
                        });
                    }
                }

                let still_held = next
                    .ledger
                    .values()
                    .any(|r| r.streak_after == record.streak_after);
                if next.player.streak_mark() == record.streak_after && !still_held {
                    next.player.set_streak(record.streak_before);
                    if record.streak_before != record.streak_after {
                        events.push(GameEvent::StreakRestored {
                            streak: record.streak_before.streak_count,
                        });
                    }
                }
            }
            // Completed outside the engine (imported save or grid); only the
            // task's own XP is known.
            None => {
                next.player.xp = next.player.xp.saturating_sub(task_xp);
                events.push(GameEvent::XpLost {
                    task_id: task_id.to_string(),
                    xp: task_xp,
                });
            }
        }

        self.relevel(&mut next, level_before, &mut events);

        if let Some(t) = next.task_mut(task_id) {
            t.completed = false;
        }

        debug!(task_id, "task uncompleted");
        Outcome::applied(next, events)
    }

    /// Record activity on `today` without awarding anything.
    pub fn update_streak(&self, state: &AppState, today: NaiveDate) -> AppState {
        let mut next = state.clone();
        let mark = next.player.streak_mark().advance(today);
        next.player.set_streak(mark);
        next
    }

    /// Replace the current boss with a fresh one at full health.
    pub fn summon_boss(
        &self,
        state: &AppState,
        name: &str,
        max_hp: i64,
    ) -> Result<Outcome, QuestError> {
        let serial = state.bosses_summoned.saturating_add(1);
        let boss = Boss::summon(name, max_hp, serial)?;

        let mut next = state.clone();
        let events = vec![GameEvent::BossSummoned {
            name: boss.name.clone(),
            max_hp: boss.max_hp,
        }];
        debug!(name = %boss.name, max_hp = boss.max_hp, serial, "boss summoned");
        next.boss = Some(boss);
        next.bosses_summoned = serial;
        Ok(Outcome::applied(next, events))
    }

    /// Leave the fight. XP already earned is kept.
    pub fn flee_boss(&self, state: &AppState) -> Outcome {
        let Some(boss) = state.boss.as_ref() else {
            return Outcome::skip(state, QuestError::NoActiveBoss);
        };
        let mut next = state.clone();
        let events = vec![GameEvent::BossFled {
            name: boss.name.clone(),
        }];
        next.boss = None;
        Outcome::applied(next, events)
    }

    pub fn add_task(&self, state: &AppState, new: NewTask) -> Outcome {
        if let Err(e) = new.validate() {
            return Outcome::skip(state, e);
        }
        let id = next_task_id(state.tasks.iter().map(|t| t.id.as_str()));
        let task = Task::new(id.clone(), new.title.trim(), new.date)
            .with_description(new.description)
            .with_times(new.start, new.end)
            .with_color(new.color)
            .with_xp(self.rules.xp_per_task);

        let mut next = state.clone();
        next.tasks.push(task);
        Outcome::applied(next, vec![GameEvent::TaskAdded { task_id: id }])
    }

    /// Drop a task from the board. Rewards it already granted stay.
    pub fn remove_task(&self, state: &AppState, task_id: &str) -> Outcome {
        let Some(pos) = state.tasks.iter().position(|t| t.id == task_id) else {
            return Outcome::skip(state, QuestError::UnknownTask(task_id.to_string()));
        };
        let mut next = state.clone();
        next.tasks.remove(pos);
        next.ledger.remove(task_id);
        Outcome::applied(
            next,
            vec![GameEvent::TaskRemoved {
                task_id: task_id.to_string(),
            }],
        )
    }

    /// Reconcile the board with an edited copy of its rows (e.g. from a grid
    /// or a CSV round-trip).
    ///
    /// Completion flips go through [`Self::complete_task`] and
    /// [`Self::uncomplete_task`]; rows with an unknown or empty id are added;
    /// tasks absent from `edited` are removed. The final order is the order
    /// of `edited`.
    pub fn apply_edits(&self, state: &AppState, edited: Vec<Task>, today: NaiveDate) -> Outcome {
        let mut seen = HashSet::new();
        for (row, task) in edited.iter().enumerate() {
            if let Err(e) = task.validate() {
                return Outcome::skip(state, QuestError::InvalidTask(format!("row {row}: {e}")));
            }
            if !task.id.is_empty() && !seen.insert(task.id.as_str()) {
                return Outcome::skip(
                    state,
                    QuestError::InvalidTask(format!("row {row}: duplicate id '{}'", task.id)),
                );
            }
        }

        let mut cur = state.clone();
        let mut events = Vec::new();

        for gone in state.tasks.iter().filter(|t| !seen.contains(t.id.as_str())) {
            let out = self.remove_task(&cur, &gone.id);
            cur = out.state;
            events.extend(out.events);
        }

        let mut order = Vec::with_capacity(edited.len());
        for row in &edited {
            let existing = if row.id.is_empty() {
                None
            } else {
                cur.task(&row.id).cloned()
            };

            let id = match existing {
                Some(existing) => {
                    let mut updated = existing.clone();
                    updated.take_edits(row);
                    if updated != existing {
                        if let Some(t) = cur.task_mut(&row.id) {
                            *t = updated;
                        }
                        events.push(GameEvent::TaskEdited {
                            task_id: row.id.clone(),
                        });
                    }
                    row.id.clone()
                }
                None => {
                    let id = if row.id.is_empty() {
                        next_task_id(
                            cur.tasks
                                .iter()
                                .map(|t| t.id.as_str())
                                .chain(edited.iter().map(|t| t.id.as_str())),
                        )
                    } else {
                        row.id.clone()
                    };
                    let mut task = row.clone();
                    task.id = id.clone();
                    task.xp_value = self.rules.xp_per_task;
                    task.completed = false;
                    cur.tasks.push(task);
                    events.push(GameEvent::TaskAdded {
                        task_id: id.clone(),
                    });
                    id
                }
            };

            let is_done = cur.task(&id).is_some_and(|t| t.completed);
            if row.completed != is_done {
                let out = if row.completed {
                    self.complete_task(&cur, &id, today)
                } else {
                    self.uncomplete_task(&cur, &id)
                };
                cur = out.state;
                events.extend(out.events);
            }
            order.push(id);
        }

        let rank: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        cur.tasks
            .sort_by_key(|t| rank.get(t.id.as_str()).copied().unwrap_or(usize::MAX));

        debug!(rows = edited.len(), events = events.len(), "edits applied");
        Outcome::applied(cur, events)
    }

    /// Recompute `level` from `xp` under the current rules.
    pub fn normalize(&self, state: &AppState) -> AppState {
        let mut next = state.clone();
        next.player.level = self.rules.level_for_xp(next.player.xp);
        next
    }

    fn relevel(&self, state: &mut AppState, before: u32, events: &mut Vec<GameEvent>) {
        let level = self.rules.level_for_xp(state.player.xp);
        state.player.level = level;
        if level > before {
            events.push(GameEvent::LevelUp { level });
        } else if level < before {
            events.push(GameEvent::LevelDown { level });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DamageRule;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, day).unwrap()
    }

    fn board(n: usize) -> AppState {
        let mut s = AppState::new();
        for i in 1..=n {
            s.tasks
                .push(Task::new(format!("quest-{i}"), format!("Task {i}"), d(1)));
        }
        s
    }

    #[test]
    fn test_complete_awards_xp_and_marks_done() {
        let engine = GamificationEngine::default();
        let out = engine.complete_task(&board(1), "quest-1", d(1));
        assert!(out.is_applied());
        assert_eq!(out.state.player.xp, 50);
        assert_eq!(out.state.player.level, 1);
        assert!(out.state.tasks[0].completed);
        assert!(out.state.ledger.contains_key("quest-1"));
        assert!(out.events.contains(&GameEvent::StreakStarted));
    }

    #[test]
    fn test_complete_twice_is_idempotent() {
        let engine = GamificationEngine::default();
        let once = engine.complete_task(&board(1), "quest-1", d(1));
        let twice = engine.complete_task(&once.state, "quest-1", d(1));
        assert_eq!(twice.state, once.state);
        assert_eq!(
            twice.skipped,
            Some(QuestError::AlreadyCompleted("quest-1".into()))
        );
    }

    #[test]
    fn test_unknown_task_is_noop() {
        let engine = GamificationEngine::default();
        let s = board(1);
        let out = engine.complete_task(&s, "nope", d(1));
        assert_eq!(out.state, s);
        assert_eq!(out.skipped, Some(QuestError::UnknownTask("nope".into())));

        let out = engine.uncomplete_task(&s, "nope");
        assert_eq!(out.state, s);
    }

    #[test]
    fn test_uncomplete_never_completed_is_noop() {
        let engine = GamificationEngine::default();
        let s = board(1);
        let out = engine.uncomplete_task(&s, "quest-1");
        assert_eq!(out.state, s);
        assert_eq!(out.skipped, Some(QuestError::NotCompleted("quest-1".into())));
    }

    #[test]
    fn test_second_task_levels_up() {
        let engine = GamificationEngine::default();
        let s = engine.complete_task(&board(2), "quest-1", d(1)).state;
        let out = engine.complete_task(&s, "quest-2", d(1));
        assert_eq!(out.state.player.xp, 100);
        assert_eq!(out.state.player.level, 2);
        assert!(out.events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_boss_defeat_awards_bonus_once() {
        let engine = GamificationEngine::default();
        let s = engine.summon_boss(&board(3), "Entropy Dragon", 100).unwrap().state;
        let s = engine.complete_task(&s, "quest-1", d(1)).state;
        let out = engine.complete_task(&s, "quest-2", d(1));

        assert_eq!(out.state.boss.as_ref().unwrap().current_hp, 0);
        assert_eq!(out.state.player.xp, 100 + 500);
        assert!(out.events.iter().any(|e| matches!(e, GameEvent::BossDefeated { .. })));

        let out = engine.complete_task(&out.state, "quest-3", d(1));
        assert_eq!(out.state.player.xp, 650);
        assert!(!out.events.iter().any(|e| matches!(e, GameEvent::BossHit { .. })));
    }

    #[test]
    fn test_uncomplete_restores_clamped_damage() {
        let engine = GamificationEngine::default();
        let s = engine.summon_boss(&board(1), "Gnat", 30).unwrap().state;
        let done = engine.complete_task(&s, "quest-1", d(1)).state;
        assert_eq!(done.ledger["quest-1"].hit.unwrap().damage, 30);

        let undone = engine.uncomplete_task(&done, "quest-1").state;
        assert_eq!(undone, s);
    }

    #[test]
    fn test_uncomplete_does_not_heal_a_new_boss() {
        let engine = GamificationEngine::default();
        let s = engine.summon_boss(&board(1), "First", 100).unwrap().state;
        let s = engine.complete_task(&s, "quest-1", d(1)).state;
        let s = engine.summon_boss(&s, "Second", 100).unwrap().state;
        let s = engine.uncomplete_task(&s, "quest-1").state;
        let boss = s.boss.unwrap();
        assert_eq!(boss.name, "Second");
        assert_eq!(boss.current_hp, 100);
        assert_eq!(s.player.xp, 0);
    }

    #[test]
    fn test_fixed_damage_rule() {
        let engine = GamificationEngine::new(GameRules {
            boss_damage: DamageRule::Fixed(10),
            ..GameRules::default()
        });
        let s = engine.summon_boss(&board(2), "x", 100).unwrap().state;
        let s = engine.complete_task(&s, "quest-1", d(1)).state;
        let s = engine.complete_task(&s, "quest-2", d(1)).state;
        assert_eq!(s.boss.unwrap().current_hp, 80);
    }

    #[test]
    fn test_streak_survives_partial_undo_on_same_day() {
        let engine = GamificationEngine::default();
        let s = engine.complete_task(&board(2), "quest-1", d(1)).state;
        let s = engine.complete_task(&s, "quest-2", d(1)).state;
        let s = engine.uncomplete_task(&s, "quest-2").state;
        assert_eq!(s.player.streak_count, 1);
        assert_eq!(s.player.last_active_date, Some(d(1)));

        let s = engine.uncomplete_task(&s, "quest-1").state;
        assert_eq!(s.player.streak_count, 0);
        assert_eq!(s.player.last_active_date, None);
    }

    #[test]
    fn test_streak_across_days() {
        let engine = GamificationEngine::default();
        let s = engine.complete_task(&board(3), "quest-1", d(1)).state;
        let s = engine.complete_task(&s, "quest-2", d(2)).state;
        assert_eq!(s.player.streak_count, 2);
        let s = engine.complete_task(&s, "quest-3", d(5)).state;
        assert_eq!(s.player.streak_count, 1);
    }

    #[test]
    fn test_update_streak_standalone() {
        let engine = GamificationEngine::default();
        let s = engine.update_streak(&AppState::new(), d(3));
        assert_eq!(s.player.streak_count, 1);
        let s = engine.update_streak(&s, d(4));
        assert_eq!(s.player.streak_count, 2);
        assert_eq!(engine.update_streak(&s, d(4)), s);
    }

    #[test]
    fn test_summon_rejects_bad_hp() {
        let engine = GamificationEngine::default();
        let err = engine.summon_boss(&AppState::new(), "x", 0).unwrap_err();
        assert!(matches!(err, QuestError::InvalidBossConfig(_)));
    }

    #[test]
    fn test_summon_increments_serial() {
        let engine = GamificationEngine::default();
        let s = engine.summon_boss(&AppState::new(), "a", 10).unwrap().state;
        let s = engine.summon_boss(&s, "b", 10).unwrap().state;
        assert_eq!(s.bosses_summoned, 2);
        assert_eq!(s.boss.unwrap().serial, 2);
    }

    #[test]
    fn test_flee() {
        let engine = GamificationEngine::default();
        let s = engine.summon_boss(&AppState::new(), "a", 10).unwrap().state;
        let out = engine.flee_boss(&s);
        assert!(out.state.boss.is_none());
        assert_eq!(engine.flee_boss(&out.state).skipped, Some(QuestError::NoActiveBoss));
    }

    #[test]
    fn test_add_and_remove_task() {
        let engine = GamificationEngine::new(GameRules {
            xp_per_task: 75,
            ..GameRules::default()
        });
        let out = engine.add_task(&board(1), NewTask::new("  Write report ", d(2)));
        assert_eq!(out.added_task_id(), Some("quest-2"));
        let t = out.state.task("quest-2").unwrap();
        assert_eq!(t.title, "Write report");
        assert_eq!(t.xp_value, 75);

        let done = engine.complete_task(&out.state, "quest-2", d(2)).state;
        let removed = engine.remove_task(&done, "quest-2").state;
        assert!(removed.task("quest-2").is_none());
        assert!(removed.ledger.is_empty());
        assert_eq!(removed.player.xp, 75);
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let engine = GamificationEngine::default();
        let s = board(0);
        let out = engine.add_task(&s, NewTask::new("", d(1)));
        assert!(matches!(out.skipped, Some(QuestError::InvalidTask(_))));
        assert_eq!(out.state, s);
    }

    #[test]
    fn test_uncomplete_without_ledger_reverses_task_xp() {
        let engine = GamificationEngine::default();
        let mut s = board(1);
        s.tasks[0].completed = true;
        s.player.xp = 120;
        s.player.level = 2;
        let out = engine.uncomplete_task(&s, "quest-1");
        assert_eq!(out.state.player.xp, 70);
        assert_eq!(out.state.player.level, 1);
        assert!(out.events.contains(&GameEvent::LevelDown { level: 1 }));
    }

    #[test]
    fn test_apply_edits_routes_completion_through_engine() {
        let engine = GamificationEngine::default();
        let s = board(3);

        let mut rows = s.tasks.clone();
        rows.remove(1);
        rows[0].completed = true;
        rows[1].title = "Renamed".into();
        rows.reverse();
        rows.push(Task::new("", "Brand new", d(3)));

        let out = engine.apply_edits(&s, rows, d(3));
        let ids: Vec<_> = out.state.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["quest-3", "quest-1", "quest-4"]);
        assert_eq!(out.state.task("quest-3").unwrap().title, "Renamed");
        assert!(out.state.task("quest-1").unwrap().completed);
        assert_eq!(out.state.player.xp, 50);
        assert!(out.state.ledger.contains_key("quest-1"));
        assert!(
            out.events
                .contains(&GameEvent::TaskRemoved { task_id: "quest-2".into() })
        );
    }

    #[test]
    fn test_apply_edits_uncomplete_and_add_completed() {
        let engine = GamificationEngine::default();
        let s = engine.complete_task(&board(1), "quest-1", d(1)).state;

        let mut rows = s.tasks.clone();
        rows[0].completed = false;
        let mut extra = Task::new("", "Done already", d(1));
        extra.completed = true;
        rows.push(extra);

        let out = engine.apply_edits(&s, rows, d(1));
        assert!(!out.state.task("quest-1").unwrap().completed);
        assert!(out.state.task("quest-2").unwrap().completed);
        assert_eq!(out.state.player.xp, 50);
    }

    #[test]
    fn test_apply_edits_new_rows_use_rules_xp() {
        let engine = GamificationEngine::new(GameRules {
            xp_per_task: 75,
            ..GameRules::default()
        });
        let table = crate::TaskTable::read_csv("id,title,date\n,New,2026-04-02\n".as_bytes())
            .unwrap();
        let rows = crate::StateStore::from_tabular(&table).unwrap();

        let out = engine.apply_edits(&board(0), rows, d(2));
        assert_eq!(out.state.tasks.len(), 1);
        assert_eq!(out.state.tasks[0].xp_value, 75);
        assert_eq!(
            out.state.tasks[0].xp_value,
            engine.add_task(&board(0), NewTask::new("New", d(2))).state.tasks[0].xp_value
        );
    }

    #[test]
    fn test_complete_that_would_overflow_xp_is_skipped() {
        let engine = GamificationEngine::default();
        let mut s = board(1);
        s.player.xp = u64::MAX - 10;

        let out = engine.complete_task(&s, "quest-1", d(1));
        assert!(matches!(out.skipped, Some(QuestError::XpOverflow(ref id)) if id == "quest-1"));
        assert_eq!(out.state, s);

        s.player.xp = u64::MAX - 50;
        let done = engine.complete_task(&s, "quest-1", d(1)).state;
        assert_eq!(done.player.xp, u64::MAX);
        assert_eq!(engine.uncomplete_task(&done, "quest-1").state.player.xp, s.player.xp);
    }

    #[test]
    fn test_apply_edits_rejects_duplicates() {
        let engine = GamificationEngine::default();
        let s = board(1);
        let rows = vec![s.tasks[0].clone(), s.tasks[0].clone()];
        let out = engine.apply_edits(&s, rows, d(1));
        assert!(matches!(out.skipped, Some(QuestError::InvalidTask(_))));
        assert_eq!(out.state, s);
    }

    #[test]
    fn test_normalize_recomputes_level() {
        let mut s = AppState::new();
        s.player.xp = 1200;
        let engine = GamificationEngine::new(GameRules {
            xp_per_level: 500,
            ..GameRules::default()
        });
        assert_eq!(engine.normalize(&s).player.level, 3);
    }
}
