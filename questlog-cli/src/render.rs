//! Plain-text output for the terminal.

use questlog_core::{CalendarEvent, GameEvent, Outcome, Scoreboard, Task};

pub fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::TaskAdded { task_id } => format!("Added quest {task_id}"),
        GameEvent::TaskEdited { task_id } => format!("Updated quest {task_id}"),
        GameEvent::TaskRemoved { task_id } => format!("Removed quest {task_id}"),
        GameEvent::XpGained { task_id, xp } => format!("Quest complete! +{xp} XP ({task_id})"),
        GameEvent::XpLost { task_id, xp } => format!("Quest reopened: -{xp} XP ({task_id})"),
        GameEvent::LevelUp { level } => format!("LEVEL UP! You are now level {level}"),
        GameEvent::LevelDown { level } => format!("Back to level {level}"),
        GameEvent::StreakStarted => "Streak started: 1 day".to_string(),
        GameEvent::StreakExtended { streak } => format!("Streak: {streak} days"),
        GameEvent::StreakRestored { streak } => format!("Streak back to {streak}"),
        GameEvent::BossSummoned { name, max_hp } => format!("{name} appears with {max_hp} HP!"),
        GameEvent::BossHit {
            name,
            damage,
            remaining,
        } => format!("Critical hit! {name} -{damage} HP ({remaining} left)"),
        GameEvent::BossHealed {
            name,
            amount,
            remaining,
        } => format!("{name} recovers {amount} HP ({remaining} left)"),
        GameEvent::BossDefeated { name, bonus_xp } => {
            format!("VICTORY! {name} is defeated. +{bonus_xp} XP")
        }
        GameEvent::BossFled { name } => format!("You fled from {name}"),
    }
}

pub fn print_outcome(outcome: &Outcome) {
    if let Some(reason) = &outcome.skipped {
        println!("Nothing changed: {reason}");
        return;
    }
    for e in &outcome.events {
        println!("{}", describe(e));
    }
}

fn bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn scoreboard_text(board: &Scoreboard) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Level {} | Streak {} days | {} XP\n",
        board.level, board.streak, board.xp
    ));
    s.push_str(&format!(
        "XP {} {} / {}\n",
        bar(board.progress, 20),
        board.xp,
        board.next_level_xp
    ));
    s.push_str(&format!("Quests {}/{} done\n", board.completed, board.total));
    if let Some(boss) = &board.boss {
        let state = if boss.defeated { " (defeated)" } else { "" };
        s.push_str(&format!(
            "{} {} {} {}/{} HP{}\n",
            boss.icon,
            boss.name,
            bar(boss.hp_fraction, 20),
            boss.current_hp,
            boss.max_hp,
            state
        ));
    }
    s
}

pub fn task_line(t: &Task) -> String {
    let mark = if t.completed { "x" } else { " " };
    format!(
        "[{mark}] {:<10} {} {}-{}  {} ({} XP)",
        t.id,
        t.scheduled_date,
        t.start_time.format("%H:%M"),
        t.end_time.format("%H:%M"),
        t.title,
        t.xp_value
    )
}

pub fn event_line(e: &CalendarEvent) -> String {
    format!(
        "{} -> {}  {}",
        e.start.format("%a %Y-%m-%d %H:%M"),
        e.end.format("%H:%M"),
        e.title
    )
}
