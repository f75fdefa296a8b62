//! Calendar projection of the task list, plus ICS export.

use chrono::NaiveDateTime;

use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub color: String,
    pub completed: bool,
}

/// One event per task, in board order.
pub fn timeline(tasks: &[Task]) -> Vec<CalendarEvent> {
    tasks
        .iter()
        .map(|t| {
            let start = t.scheduled_date.and_time(t.start_time);
            let end = t.scheduled_date.and_time(t.end_time).max(start);
            let mark = if t.completed { "✅" } else { "⬜" };
            CalendarEvent {
                task_id: t.id.clone(),
                title: format!("{mark} {}", t.title),
                description: t.description.clone(),
                start,
                end,
                color: t.color.clone(),
                completed: t.completed,
            }
        })
        .collect()
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// Times are floating (no zone suffix), matching how tasks are entered.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//QuestLog//EN\r\n");

    for e in events {
        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!("UID:{}@questlog\r\n", escape_ics(&e.task_id)));
        s.push_str(&format!("DTSTART:{}\r\n", e.start.format("%Y%m%dT%H%M%S")));
        s.push_str(&format!("DTEND:{}\r\n", e.end.format("%Y%m%dT%H%M%S")));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&e.title)));
        if !e.description.is_empty() {
            s.push_str(&format!("DESCRIPTION:{}\r\n", escape_ics(&e.description)));
        }
        if e.completed {
            s.push_str("STATUS:COMPLETED\r\n");
        }
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
