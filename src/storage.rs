//! Saved-plan persistence and exports.
//!
//! All saved plans live in one JSON document, newest first, rewritten in
//! full on every mutation. A missing or undecodable document reads as an
//! empty list rather than an error.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::SavedPlan;

/// Persistence port for the saved-plan list. The production store writes
/// a JSON file; tests inject a temp-dir-backed instance.
pub trait PlanStore {
    fn load(&self) -> Vec<SavedPlan>;
    fn save(&self, plans: &[SavedPlan]) -> Result<()>;

    /// Load, prepend, save. Not atomic across crashes; the data is
    /// recoverable by regenerating the plan.
    fn append_newest(&self, plan: SavedPlan) -> Result<()> {
        let mut plans = self.load();
        plans.insert(0, plan);
        self.save(&plans)
    }

    /// Returns whether a plan with that id existed.
    fn delete(&self, id: &str) -> Result<bool> {
        let plans = self.load();
        let before = plans.len();
        let remaining: Vec<SavedPlan> = plans.into_iter().filter(|p| p.id != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.save(&remaining)?;
        Ok(true)
    }

    fn find(&self, id: &str) -> Option<SavedPlan> {
        self.load().into_iter().find(|p| p.id == id)
    }
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default store under the platform data dir, e.g.
    /// `~/.local/share/travel-planner/plans.json` on Linux.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("could not determine the platform data directory")?
            .join("travel-planner");
        Ok(Self::new(dir.join("plans.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for JsonFileStore {
    fn load(&self) -> Vec<SavedPlan> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no readable plan store");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(plans) => plans,
            Err(e) => {
                // Corrupt state is deliberately treated as empty.
                debug!(path = %self.path.display(), error = %e, "plan store undecodable, treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, plans: &[SavedPlan]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(plans)?;
        std::fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))
    }
}

/// Export a single saved plan as pretty-printed JSON.
pub fn export_json(path: &Path, plan: &SavedPlan) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

/// Write PDF bytes fetched from the backend.
pub fn export_pdf(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TravelRequest;
    use chrono::NaiveDate;

    fn request(destination: &str) -> TravelRequest {
        TravelRequest {
            origin: "Porto".to_string(),
            destination: destination.to_string(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            return_date: None,
            total_budget: 2500.0,
            nightly_budget: 150.0,
            preferences: "quiet neighborhoods, coffee, bookshops".to_string(),
        }
    }

    fn saved(id: &str, destination: &str) -> SavedPlan {
        SavedPlan {
            id: id.to_string(),
            request: request(destination),
            plan_text: format!("Trip to {destination}### Flights\nTBD"),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("plans.json"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn round_trip_preserves_the_head_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let plan = saved("2026-08-07T10:00:00Z", "Lisbon");

        store.append_newest(plan.clone()).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], plan);
    }

    #[test]
    fn append_puts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append_newest(saved("a", "Lisbon")).unwrap();
        store.append_newest(saved("b", "Madrid")).unwrap();

        let ids: Vec<_> = store.load().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn delete_removes_only_the_matching_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append_newest(saved("a", "Lisbon")).unwrap();
        store.append_newest(saved("b", "Madrid")).unwrap();

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());

        let ids: Vec<_> = store.load().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn find_returns_the_stored_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let plan = saved("a", "Lisbon");
        store.append_newest(plan.clone()).unwrap();

        assert_eq!(store.find("a"), Some(plan));
        assert_eq!(store.find("zzz"), None);
    }

    #[test]
    fn export_json_writes_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        export_json(&path, &saved("a", "Lisbon")).unwrap();

        let back: SavedPlan =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.id, "a");
    }
}
