use anyhow::{Context, Result};
use questlog_core::{AppState, StateStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn questlog_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("QUESTLOG_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".questlog"))
}

pub fn ensure_questlog_home() -> Result<PathBuf> {
    let dir = questlog_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_save_path(home: &Path) -> PathBuf {
    home.join("save.json")
}

/// A missing save file is a fresh game.
pub fn load_state(path: &Path) -> Result<AppState> {
    if !path.exists() {
        info!(path = %path.display(), "no save file yet, starting fresh");
        return Ok(AppState::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let state =
        StateStore::from_json_str(&s).with_context(|| format!("load {}", path.display()))?;
    info!(path = %path.display(), tasks = state.tasks.len(), "state loaded");
    Ok(state)
}

/// Replace the whole save file. Writes a sibling temp file first and renames
/// it into place, so a crash never leaves half a document behind.
pub fn save_state(path: &Path, state: &AppState) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, StateStore::to_json_string(state))
        .with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    info!(path = %path.display(), "state saved");
    Ok(())
}
