use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

struct Entry<T> {
    value: Arc<Mutex<T>>,
    touched_at: DateTime<Utc>,
}

/// Реестр сессий пользовательского интерфейса (in-memory)
///
/// Сессия живет, пока ее не закроют или пока она не простаивает дольше
/// срока очистки. Доступ к одной сессии последовательный.
pub struct SessionRegistry<T> {
    name: &'static str,
    sessions: RwLock<HashMap<String, Entry<T>>>,
}

impl<T> SessionRegistry<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Зарегистрировать сессию, вернуть ее ID
    pub fn open(&self, value: T) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        match self.sessions.write() {
            Ok(mut sessions) => {
                sessions.insert(
                    session_id.clone(),
                    Entry {
                        value: Arc::new(Mutex::new(value)),
                        touched_at: Utc::now(),
                    },
                );
                tracing::info!("Opened {} session {}", self.name, session_id);
            }
            Err(e) => tracing::error!("{} registry lock poisoned: {}", self.name, e),
        }
        session_id
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Mutex<T>>> {
        let mut sessions = self.sessions.write().ok()?;
        let entry = sessions.get_mut(session_id)?;
        entry.touched_at = Utc::now();
        Some(Arc::clone(&entry.value))
    }

    pub fn close(&self, session_id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .map(|mut sessions| sessions.remove(session_id).is_some())
            .unwrap_or(false);
        if removed {
            tracing::info!("Closed {} session {}", self.name, session_id);
        }
        removed
    }

    /// Удалить сессии, к которым не обращались дольше `max_idle_hours`
    pub fn cleanup_idle(&self, max_idle_hours: i64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::hours(max_idle_hours);
        match self.sessions.write() {
            Ok(mut sessions) => {
                let before = sessions.len();
                sessions.retain(|_, entry| entry.touched_at > cutoff);
                before - sessions.len()
            }
            Err(e) => {
                tracing::error!("{} registry lock poisoned: {}", self.name, e);
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_get_close() {
        let registry = SessionRegistry::new("test");
        let id = registry.open(vec![1]);

        let session = registry.get(&id).unwrap();
        session.lock().await.push(2);
        assert_eq!(*registry.get(&id).unwrap().lock().await, vec![1, 2]);

        assert!(registry.close(&id));
        assert!(!registry.close(&id));
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cleanup_removes_only_idle_sessions() {
        let registry = SessionRegistry::new("test");
        let idle = registry.open("idle");
        let active = registry.open("active");
        if let Some(entry) = registry.sessions.write().unwrap().get_mut(&idle) {
            entry.touched_at = Utc::now() - chrono::Duration::hours(3);
        }

        assert_eq!(registry.cleanup_idle(2), 1);
        assert!(registry.get(&idle).is_none());
        assert!(registry.get(&active).is_some());
    }
}
