use crate::config::AppConfig;
use crate::llm::{Backend, LlmManager};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

/// Shared application state for the web server.
///
/// The server hosts exactly one interactive session; all session state lives
/// here and disappears when the process exits.
pub struct AppState {
    pub config: AppConfig,
    pub session: RwLock<SessionState>,
    /// Adapter for the currently configured backend, if any. Replaced
    /// wholesale when the user selects a backend.
    pub llm_manager: Mutex<Option<LlmManager>>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

/// Session-scoped state mutated by the user's actions.
#[derive(Default)]
pub struct SessionState {
    /// Backend picked in the UI. Tracked separately from the adapter so the
    /// status endpoint can report it without locking the manager.
    pub backend: Option<Backend>,
    /// Column names from the most recently uploaded spreadsheet. Overwritten
    /// on every upload, never merged.
    pub columns: Vec<String>,
    /// Generated SQL in insertion order, append-only.
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub question: String,
    pub sql: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SessionState {
    pub fn record_generation(&mut self, question: &str, sql: String) {
        self.history.push(HistoryEntry {
            question: question.to_string(),
            sql,
            created_at: chrono::Utc::now(),
        });
    }

    /// History entries for display, most recent first.
    pub fn history_newest_first(&self) -> Vec<HistoryEntry> {
        self.history.iter().rev().cloned().collect()
    }

    /// Export payload: every generated statement in insertion order, joined
    /// with a single newline and no trailing newline.
    pub fn export_payload(&self) -> String {
        self.history
            .iter()
            .map(|entry| entry.sql.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: RwLock::new(SessionState::default()),
            llm_manager: Mutex::new(None),
            startup_time: chrono::Utc::now(),
        }
    }
}
