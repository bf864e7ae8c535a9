use contracts::usecases::u505_match_nomenclature::progress::{
    MatchError, MatchProgress, MatchStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Счетчики прогона для обновления прогресса
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchCounters {
    pub loaded: i32,
    pub skipped: i32,
    pub matched: i32,
    pub unmatched: i32,
    pub auto_linked: i32,
}

/// Трекер прогресса сопоставления (in-memory, для real-time мониторинга)
#[derive(Clone)]
pub struct ProgressTracker {
    sessions: Arc<RwLock<HashMap<String, MatchProgress>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn update(&self, session_id: &str, f: impl FnOnce(&mut MatchProgress)) {
        match self.sessions.write() {
            Ok(mut sessions) => {
                if let Some(progress) = sessions.get_mut(session_id) {
                    f(progress);
                }
            }
            Err(e) => tracing::error!("Progress tracker lock poisoned: {}", e),
        }
    }

    /// Создать новую сессию сопоставления
    pub fn create_session(&self, session_id: String) {
        let progress = MatchProgress {
            session_id: session_id.clone(),
            status: MatchStatus::InProgress,
            total: None,
            loaded: 0,
            skipped: 0,
            matched: 0,
            unmatched: 0,
            auto_linked: 0,
            errors: 0,
            error_list: Vec::new(),
            current_item: None,
            started_at: chrono::Utc::now(),
            completed_at: None,
        };
        match self.sessions.write() {
            Ok(mut sessions) => {
                sessions.insert(session_id, progress);
            }
            Err(e) => tracing::error!("Progress tracker lock poisoned: {}", e),
        }
    }

    /// Получить текущий прогресс сессии
    pub fn get_progress(&self, session_id: &str) -> Option<MatchProgress> {
        let sessions = self.sessions.read().ok()?;
        sessions.get(session_id).cloned()
    }

    pub fn set_total(&self, session_id: &str, total: i32) {
        self.update(session_id, |p| p.total = Some(total));
    }

    /// Обновить прогресс
    pub fn update_progress(&self, session_id: &str, counters: MatchCounters) {
        self.update(session_id, |p| {
            p.loaded = counters.loaded;
            p.skipped = counters.skipped;
            p.matched = counters.matched;
            p.unmatched = counters.unmatched;
            p.auto_linked = counters.auto_linked;
        });
    }

    /// Установить текущий этап
    pub fn set_current_item(&self, session_id: &str, label: Option<String>) {
        self.update(session_id, |p| p.current_item = label);
    }

    /// Добавить ошибку
    pub fn add_error(
        &self,
        session_id: &str,
        message: String,
        details: Option<String>,
        listing_id: Option<String>,
    ) {
        self.update(session_id, |p| {
            p.errors += 1;
            p.error_list.push(MatchError {
                message,
                details,
                listing_id,
            });
        });
    }

    /// Завершить сессию. Статус с ошибками выбирается по счетчику ошибок.
    pub fn complete_session(&self, session_id: &str, status: MatchStatus) {
        self.update(session_id, |p| {
            p.status = match status {
                MatchStatus::Completed if p.errors > 0 => MatchStatus::CompletedWithErrors,
                other => other,
            };
            p.completed_at = Some(chrono::Utc::now());
            p.current_item = None;
        });
    }

    /// Удалить старые сессии (для очистки памяти)
    pub fn cleanup_old_sessions(&self, max_age_hours: i64) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let before = sessions.len();
        let now = chrono::Utc::now();
        sessions.retain(|_, progress| match progress.completed_at {
            Some(completed_at) => (now - completed_at).num_hours() < max_age_hours,
            // Активные сессии не удаляем
            None => true,
        });
        before - sessions.len()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
