//! Operator commands over a file-backed progression store
//!
//! Each command returns its printable output so the binary stays a thin
//! argument parser.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use xp_core::{
    dispatch_level_up, FileStore, LevelCurve, LogLevelUpHandler, ProgressionConfig,
    ProgressionEngine, ProgressionOutcome, UserId, XpAction,
};

/// Config from an explicit path, else `XP_CONFIG_PATH`, else defaults
pub fn resolve_config(path: Option<&Path>) -> Result<ProgressionConfig> {
    match path {
        Some(path) => ProgressionConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => xp_core::load_from_env().context("Failed to load config from environment"),
    }
}

pub fn open_engine(store: &Path, config: ProgressionConfig) -> Result<ProgressionEngine<FileStore>> {
    tracing::debug!(store = %store.display(), max_level = config.max_level, "opening engine");
    let store = FileStore::open(store)
        .with_context(|| format!("Failed to open store {}", store.display()))?;
    ProgressionEngine::new(store, config).context("Invalid progression config")
}

/// Level roadmap as an aligned table
pub fn render_table(config: &ProgressionConfig) -> Result<String> {
    let curve = LevelCurve::from_config(config).context("Invalid progression config")?;

    let mut out = String::new();
    writeln!(out, "{:>5}  {:>12}  {:>14}", "Level", "XP required", "Total XP")?;
    for row in curve.xp_table() {
        writeln!(out, "{:>5}  {:>12}  {:>14}", row.level, row.xp_required, row.total_xp)?;
    }
    Ok(out)
}

pub fn render_info(config: &ProgressionConfig, xp: u64) -> Result<String> {
    let curve = LevelCurve::from_config(config).context("Invalid progression config")?;
    Ok(serde_json::to_string_pretty(&curve.level_info(xp))?)
}

/// Create a profile; returns the user id and whether it was new
pub fn init_user(store: &Path, user: Option<String>) -> Result<(UserId, bool)> {
    let store = FileStore::open(store)
        .with_context(|| format!("Failed to open store {}", store.display()))?;
    let user_id = user.map(UserId::from).unwrap_or_else(UserId::generate);
    let created = store.create_profile(&user_id)?;
    Ok((user_id, created))
}

pub fn award(
    engine: &ProgressionEngine<FileStore>,
    user: &str,
    action: &str,
) -> Result<ProgressionOutcome> {
    let action: XpAction = action.parse()?;
    let outcome = engine.award_xp(&UserId::from(user), action)?;
    dispatch_level_up(&outcome, &LogLevelUpHandler);
    Ok(outcome)
}

pub fn grant(
    engine: &ProgressionEngine<FileStore>,
    user: &str,
    amount: i64,
    reason: &str,
) -> Result<ProgressionOutcome> {
    let outcome = engine.award_arbitrary_xp(&UserId::from(user), amount, reason)?;
    dispatch_level_up(&outcome, &LogLevelUpHandler);
    Ok(outcome)
}

pub fn render_status(engine: &ProgressionEngine<FileStore>, user: &str) -> Result<String> {
    let info = engine.get_level_info(&UserId::from(user))?;
    Ok(serde_json::to_string_pretty(&info)?)
}

pub fn render_history(
    engine: &ProgressionEngine<FileStore>,
    user: &str,
    limit: usize,
) -> Result<String> {
    let entries = engine.xp_history(&UserId::from(user), limit)?;
    if entries.is_empty() {
        return Ok(format!("No XP history for {}\n", user));
    }

    let mut out = String::new();
    for entry in entries {
        write!(
            out,
            "{}  {:<16} +{:<6} total {:<8} level {}",
            entry.timestamp_ms, entry.action, entry.xp_gained, entry.total_xp, entry.level
        )?;
        if let Some(reason) = entry.reason {
            write!(out, "  ({})", reason)?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

pub fn describe_outcome(outcome: &ProgressionOutcome) -> String {
    let mut text = format!(
        "+{} XP → {} total, level {}",
        outcome.xp_awarded, outcome.new_cumulative_xp, outcome.new_level
    );
    if outcome.leveled_up {
        text.push_str(&format!(
            " (level up from {}, +{})",
            outcome.previous_level, outcome.levels_gained
        ));
    }
    text
}

pub fn default_store_path() -> PathBuf {
    PathBuf::from("progression.dat")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_table_lists_every_level() {
        let table = render_table(&ProgressionConfig::default()).unwrap();
        // header + 50 levels
        assert_eq!(table.lines().count(), 51);
        assert!(table.lines().nth(2).unwrap().contains("100"));
    }

    #[test]
    fn test_info_json() {
        let json = render_info(&ProgressionConfig::default(), 0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["current_level"], 1);
        assert_eq!(value["xp_to_next_level"], 100);
    }

    #[test]
    fn test_award_flow_on_file_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.dat");

        let (user, created) = init_user(&path, Some("alice".to_string())).unwrap();
        assert!(created);
        assert_eq!(user.as_str(), "alice");
        assert!(!init_user(&path, Some("alice".to_string())).unwrap().1);

        let engine = open_engine(&path, ProgressionConfig::default()).unwrap();
        let outcome = award(&engine, "alice", "module").unwrap();
        assert_eq!(outcome.new_cumulative_xp, 50);

        let outcome = grant(&engine, "alice", 100, "launch bonus").unwrap();
        assert!(outcome.leveled_up);
        assert!(describe_outcome(&outcome).contains("level up from 1"));

        let status = render_status(&engine, "alice").unwrap();
        assert!(status.contains("\"current_level\": 2"));

        let history = render_history(&engine, "alice", 10).unwrap();
        assert_eq!(history.lines().count(), 3);
        assert!(history.contains("launch bonus"));
        assert!(history.contains(&format!("{:<16} +0", "level_up")));
    }

    #[test]
    fn test_unknown_action_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.dat");
        init_user(&path, Some("bob".to_string())).unwrap();

        let engine = open_engine(&path, ProgressionConfig::default()).unwrap();
        let err = award(&engine, "bob", "level_up").unwrap_err();
        assert!(err.to_string().contains("Unknown XP action"));
    }

    #[test]
    fn test_missing_user_is_reported() {
        let dir = TempDir::new().unwrap();
        let engine = open_engine(&dir.path().join("progress.dat"), ProgressionConfig::default())
            .unwrap();
        let err = render_status(&engine, "nobody").unwrap_err();
        assert!(err.to_string().contains("User not found"));
    }
}
