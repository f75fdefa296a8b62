use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use questlog_core::{
    AppState, GamificationEngine, NewTask, Outcome, Scoreboard, StateStore, TaskTable,
    events_to_ics, timeline,
};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod state;
mod time;

#[derive(Parser, Debug)]
#[command(
    name = "questlog",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("QUESTLOG_BUILD_SHA"), ")"),
    about = "Earn XP, keep streaks and slay bosses by finishing your tasks"
)]
struct Cli {
    /// Save file to use instead of the configured one
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Level, XP progress, streak and boss health
    Status {
        #[arg(long)]
        json: bool,
    },

    /// List quests in board order
    List,

    /// Add a quest
    Add {
        title: String,

        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        /// HH:MM (default: 09:00)
        #[arg(long)]
        start: Option<String>,

        /// HH:MM (default: 10:00)
        #[arg(long)]
        end: Option<String>,

        #[arg(long, default_value = "")]
        description: String,

        /// #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },

    /// Complete a quest
    Done { id: String },

    /// Reopen a completed quest, taking its rewards back
    Undo { id: String },

    /// Delete a quest (earned XP is kept)
    Remove { id: String },

    /// Boss commands
    Boss {
        #[command(subcommand)]
        command: BossCommand,
    },

    /// Write the save (json) or the quest grid (csv)
    Export {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Load a save (json) or apply an edited quest grid (csv)
    Import {
        path: PathBuf,

        /// Inferred from the file extension when omitted
        #[arg(long, value_enum)]
        format: Option<Format>,
    },

    /// Show quests on a timeline
    Calendar {
        /// Emit an ICS calendar instead
        #[arg(long)]
        ics: bool,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BossCommand {
    /// Summon a boss at full health, replacing the current one
    Summon {
        name: String,

        #[arg(long, allow_negative_numbers = true)]
        hp: i64,
    },

    /// Leave the current fight
    Flee,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,

    /// Print the effective config
    Show,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Csv,
}

/// One command's worth of context: the engine, the date, and where the save
/// lives. Holds the only mutable copy of the state.
struct Session {
    engine: GamificationEngine,
    today: NaiveDate,
    home: PathBuf,
    save_path: PathBuf,
    state: AppState,
}

impl Session {
    /// Print what happened and persist if anything changed.
    fn commit(&mut self, outcome: Outcome) -> Result<()> {
        render::print_outcome(&outcome);
        if outcome.is_applied() {
            self.state = outcome.state;
            state::save_state(&self.save_path, &self.state)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let home = state::ensure_questlog_home()?;

    // Config commands must work even when the save file is unreadable.
    if let Command::Config { command } = cli.command {
        return run_config(&home, command);
    }

    let cfg = config::load_config(&home)?;
    let engine = GamificationEngine::new(cfg.rules);

    let today = match &cli.today {
        Some(s) => time::parse_date(s)?,
        None => time::local_today(Utc::now(), time::parse_timezone(&cfg.timezone)?),
    };

    let save_path = cli
        .file
        .clone()
        .or_else(|| cfg.save_file.clone())
        .unwrap_or_else(|| state::default_save_path(&home));
    debug!(save = %save_path.display(), %today, "session");

    let loaded = state::load_state(&save_path)?;
    let mut session = Session {
        state: engine.normalize(&loaded),
        engine,
        today,
        home,
        save_path,
    };

    run(&mut session, cli.command)
}

fn run(session: &mut Session, command: Command) -> Result<()> {
    let engine = session.engine;
    let today = session.today;

    match command {
        Command::Status { json } => {
            let board = Scoreboard::new(&session.state, engine.rules(), today);
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                print!("{}", render::scoreboard_text(&board));
            }
        }

        Command::List => {
            if session.state.tasks.is_empty() {
                println!("No quests yet. Add one: questlog add \"<title>\"");
            }
            for t in &session.state.tasks {
                println!("{}", render::task_line(t));
            }
        }

        Command::Add {
            title,
            date,
            start,
            end,
            description,
            color,
        } => {
            let mut new = NewTask::new(title, today);
            if let Some(d) = date {
                new.date = time::parse_date(&d)?;
            }
            if let Some(s) = start {
                new.start = time::parse_time(&s)?;
            }
            if let Some(e) = end {
                new.end = time::parse_time(&e)?;
            }
            if let Some(c) = color {
                new.color = c;
            }
            new.description = description;
            let outcome = engine.add_task(&session.state, new);
            session.commit(outcome)?;
        }

        Command::Done { id } => {
            let outcome = engine.complete_task(&session.state, &id, today);
            session.commit(outcome)?;
        }

        Command::Undo { id } => {
            let outcome = engine.uncomplete_task(&session.state, &id);
            session.commit(outcome)?;
        }

        Command::Remove { id } => {
            let outcome = engine.remove_task(&session.state, &id);
            session.commit(outcome)?;
        }

        Command::Boss { command } => match command {
            BossCommand::Summon { name, hp } => {
                let outcome = engine.summon_boss(&session.state, &name, hp)?;
                session.commit(outcome)?;
            }
            BossCommand::Flee => {
                let outcome = engine.flee_boss(&session.state);
                session.commit(outcome)?;
            }
        },

        Command::Export { format, out } => {
            let mut buf = Vec::new();
            match format {
                Format::Json => {
                    buf.extend_from_slice(StateStore::to_json_string(&session.state).as_bytes());
                    buf.push(b'\n');
                }
                Format::Csv => StateStore::to_tabular(&session.state.tasks).write_csv(&mut buf)?,
            }
            match out {
                Some(p) => {
                    fs::write(&p, &buf).with_context(|| format!("write {}", p.display()))?;
                    println!("Wrote {}", p.display());
                }
                None => std::io::stdout().write_all(&buf)?,
            }
        }

        Command::Import { path, format } => {
            let format = match format {
                Some(f) => f,
                None => infer_format(&path)?,
            };
            match format {
                Format::Json => {
                    let s = fs::read_to_string(&path)
                        .with_context(|| format!("read {}", path.display()))?;
                    let imported = StateStore::from_json_str(&s)
                        .with_context(|| format!("import {}", path.display()))?;
                    session.state = engine.normalize(&imported);
                    state::save_state(&session.save_path, &session.state)?;
                    println!(
                        "Loaded {} quests from {}",
                        session.state.tasks.len(),
                        path.display()
                    );
                }
                Format::Csv => {
                    let f = fs::File::open(&path)
                        .with_context(|| format!("open {}", path.display()))?;
                    let rows = TaskTable::read_csv(f)
                        .and_then(|table| StateStore::from_tabular(&table))
                        .with_context(|| format!("import {}", path.display()))?;
                    let outcome = engine.apply_edits(&session.state, rows, today);
                    session.commit(outcome)?;
                }
            }
        }

        Command::Calendar { ics } => {
            let events = timeline(&session.state.tasks);
            if ics {
                print!("{}", events_to_ics(&events));
            } else {
                for e in &events {
                    println!("{}", render::event_line(e));
                }
            }
        }

        Command::Config { command } => run_config(&session.home, command)?,
    }

    Ok(())
}

fn run_config(home: &std::path::Path, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => config::init_config(home),
        ConfigCommand::Show => {
            let cfg = config::load_config(home)?;
            print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            Ok(())
        }
    }
}

fn infer_format(path: &std::path::Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Format::Csv),
        _ => {
            warn!(path = %path.display(), "cannot infer import format");
            bail!("cannot tell the format of {} (pass --format json|csv)", path.display())
        }
    }
}
