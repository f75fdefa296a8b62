//! Row-oriented view of the task list for grid editors and CSV files.

use chrono::{NaiveDate, NaiveTime};
use std::io::{Read, Write};

use crate::error::QuestError;
use crate::task::{Task, default_color, default_end, default_start, default_xp};

pub const COLUMNS: [&str; 9] = [
    "id",
    "title",
    "description",
    "date",
    "start",
    "end",
    "completed",
    "xp",
    "color",
];

const REQUIRED: [&str; 3] = ["id", "title", "date"];

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Bool(bool),
    Int(u64),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(n) => n.to_string(),
            Cell::Date(d) => d.format(DATE_FMT).to_string(),
            Cell::Time(t) => t.format(TIME_FMT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TaskTable {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let rows = tasks
            .iter()
            .map(|t| {
                vec![
                    Cell::Text(t.id.clone()),
                    Cell::Text(t.title.clone()),
                    Cell::Text(t.description.clone()),
                    Cell::Date(t.scheduled_date),
                    Cell::Time(t.start_time),
                    Cell::Time(t.end_time),
                    Cell::Bool(t.completed),
                    Cell::Int(t.xp_value),
                    Cell::Text(t.color.clone()),
                ]
            })
            .collect();
        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Rebuild tasks, looking columns up by name so reordered grids still
    /// read back. Optional columns fall back to the task defaults.
    pub fn to_tasks(&self) -> Result<Vec<Task>, QuestError> {
        for name in REQUIRED {
            if self.column(name).is_none() {
                return Err(QuestError::malformed(format!("table has no '{name}' column")));
            }
        }

        self.rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                if row.len() != self.columns.len() {
                    return Err(QuestError::malformed(format!(
                        "row {r}: expected {} cells, found {}",
                        self.columns.len(),
                        row.len()
                    )));
                }
                let read = RowReader { table: self, row, r };
                Ok(Task {
                    id: read.text("id")?.unwrap_or_default(),
                    title: read.text("title")?.unwrap_or_default(),
                    description: read.text("description")?.unwrap_or_default(),
                    scheduled_date: read
                        .date("date")?
                        .ok_or_else(|| at(r, "date", "missing"))?,
                    start_time: read.time("start")?.unwrap_or_else(default_start),
                    end_time: read.time("end")?.unwrap_or_else(default_end),
                    completed: read.bool("completed")?.unwrap_or(false),
                    xp_value: read.xp("xp")?.unwrap_or_else(default_xp),
                    color: read.text("color")?.unwrap_or_else(default_color),
                })
            })
            .collect()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn write_csv<W: Write>(&self, out: W) -> Result<(), QuestError> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(&self.columns).map_err(csv_err)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(Cell::render)).map_err(csv_err)?;
        }
        wtr.flush()
            .map_err(|e| QuestError::malformed(format!("csv: {e}")))?;
        Ok(())
    }

    /// Parse a CSV written by [`Self::write_csv`] (or edited in a
    /// spreadsheet). Cells are typed by their column name. Text cells are
    /// kept byte for byte; typed cells tolerate surrounding spaces.
    pub fn read_csv<R: Read>(input: R) -> Result<Self, QuestError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(input);
        let columns: Vec<String> = rdr
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();

        let mut rows = Vec::new();
        for (r, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_err)?;
            let row = columns
                .iter()
                .zip(record.iter())
                .map(|(col, raw)| parse_cell(col, raw).map_err(|e| at(r, col, &e)))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }
}

fn parse_cell(column: &str, raw: &str) -> Result<Cell, String> {
    if !matches!(column, "date" | "start" | "end" | "completed" | "xp") {
        return Ok(Cell::Text(raw.to_string()));
    }
    let raw = raw.trim();
    match column {
        "date" => NaiveDate::parse_from_str(raw, DATE_FMT)
            .map(Cell::Date)
            .map_err(|e| format!("'{raw}': {e}")),
        "start" | "end" => NaiveTime::parse_from_str(raw, TIME_FMT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map(Cell::Time)
            .map_err(|e| format!("'{raw}': {e}")),
        "completed" => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "x" => Ok(Cell::Bool(true)),
            "false" | "no" | "0" | "" => Ok(Cell::Bool(false)),
            _ => Err(format!("'{raw}' is not a boolean")),
        },
        _ => raw
            .parse::<u64>()
            .map(Cell::Int)
            .map_err(|e| format!("'{raw}': {e}")),
    }
}

fn csv_err(e: csv::Error) -> QuestError {
    QuestError::malformed(format!("csv: {e}"))
}

fn at(row: usize, column: &str, msg: &str) -> QuestError {
    QuestError::malformed(format!("row {row}, column '{column}': {msg}"))
}

struct RowReader<'a> {
    table: &'a TaskTable,
    row: &'a [Cell],
    r: usize,
}

impl RowReader<'_> {
    fn cell(&self, name: &str) -> Option<&Cell> {
        self.table.column(name).map(|i| &self.row[i])
    }

    fn mismatch(&self, name: &str, want: &str, got: &Cell) -> QuestError {
        at(self.r, name, &format!("expected {want}, found {got:?}"))
    }

    fn text(&self, name: &str) -> Result<Option<String>, QuestError> {
        match self.cell(name) {
            None => Ok(None),
            Some(Cell::Text(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(name, "text", other)),
        }
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>, QuestError> {
        match self.cell(name) {
            None => Ok(None),
            Some(Cell::Date(d)) => Ok(Some(*d)),
            Some(other) => Err(self.mismatch(name, "date", other)),
        }
    }

    fn time(&self, name: &str) -> Result<Option<NaiveTime>, QuestError> {
        match self.cell(name) {
            None => Ok(None),
            Some(Cell::Time(t)) => Ok(Some(*t)),
            Some(other) => Err(self.mismatch(name, "time", other)),
        }
    }

    fn bool(&self, name: &str) -> Result<Option<bool>, QuestError> {
        match self.cell(name) {
            None => Ok(None),
            Some(Cell::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(name, "bool", other)),
        }
    }

    fn xp(&self, name: &str) -> Result<Option<u64>, QuestError> {
        match self.cell(name) {
            None => Ok(None),
            Some(Cell::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(self.mismatch(name, "integer", other)),
        }
    }
}
