//! Per-visitor session storage.
//!
//! Each browser session owns its own copy of the two uploaded datasets. The
//! store lock only keeps sessions apart; every request recomputes from the
//! stored tables.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use stories_core::models::{AnalysisOptions, Dataset};
use uuid::Uuid;

// ── DashboardSession ──────────────────────────────────────────────────────────

/// Validated uploads belonging to one visitor.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    pub id: String,
    pub current: Dataset,
    pub prior: Dataset,
    /// Options in force when the data was uploaded.
    pub options: AnalysisOptions,
    pub uploaded_at: DateTime<Utc>,
}

// ── SessionStore ──────────────────────────────────────────────────────────────

/// Thread-safe map of session id to [`DashboardSession`].
///
/// Sessions live for the lifetime of the process.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<DashboardSession>>>,
}

impl SessionStore {
    /// Generate a fresh, unused session id.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn get(&self, id: &str) -> Option<Arc<DashboardSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Store `session`, replacing any previous data under the same id.
    pub fn replace(&self, session: DashboardSession) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id.clone(), Arc::new(session));
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stories_core::models::Period;

    fn session(id: &str, age_minutes: i64) -> DashboardSession {
        DashboardSession {
            id: id.to_string(),
            current: Dataset::new(Period::Current, "cur.csv", Vec::new()),
            prior: Dataset::new(Period::Prior, "pri.csv", Vec::new()),
            options: AnalysisOptions::default(),
            uploaded_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(SessionStore::new_id(), SessionStore::new_id());
    }

    #[test]
    fn test_replace_and_get() {
        let store = SessionStore::default();
        assert!(store.is_empty());
        store.replace(session("a", 0));
        assert_eq!(store.get("a").unwrap().current.source_name, "cur.csv");
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_replace_overwrites_wholesale() {
        let store = SessionStore::default();
        store.replace(session("a", 0));
        let mut newer = session("a", 0);
        newer.current.source_name = "new.csv".to_string();
        store.replace(newer);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().current.source_name, "new.csv");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::default();
        store.replace(session("a", 0));
        let mut other = session("b", 0);
        other.current.source_name = "other.csv".to_string();
        store.replace(other);
        assert_eq!(store.get("a").unwrap().current.source_name, "cur.csv");
        assert_eq!(store.get("b").unwrap().current.source_name, "other.csv");
    }

    #[test]
    fn test_store_keeps_every_session() {
        let store = SessionStore::default();
        for i in 0..300 {
            store.replace(session(&format!("s{i}"), i));
        }
        assert_eq!(store.len(), 300);
        assert!(store.get("s299").is_some());
        assert!(store.get("s0").is_some());
    }
}
