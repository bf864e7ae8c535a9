use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Результат запроса, прошедшего окно тишины
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<T> {
    pub query: String,
    pub generation: u64,
    pub value: T,
}

/// Отложенный запуск поиска при наборе текста
///
/// Каждый вызов [`schedule`](Self::schedule) увеличивает поколение и отменяет
/// предыдущую задачу. Результат публикуется, только если поколение
/// не изменилось за время ожидания и выполнения запроса.
pub struct DebouncedScheduler<T> {
    window: Duration,
    min_len: usize,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    latest: Arc<watch::Sender<Option<QueryResult<T>>>>,
}

impl<T> DebouncedScheduler<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(window: Duration, min_len: usize) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            window,
            min_len,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            latest: Arc::new(tx),
        }
    }

    /// Запланировать запрос. Возвращает false, если запрос короче
    /// минимальной длины: такой ввод означает "поиска нет" и очищает результат.
    pub fn schedule<F, Fut>(&self, query: &str, fetch: F) -> bool
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_pending();

        let query = query.trim().to_string();
        if query.chars().count() < self.min_len {
            tracing::debug!("Query '{}' is shorter than {} chars, search cleared", query, self.min_len);
            self.latest.send_replace(None);
            return false;
        }

        let window = self.window;
        let current = Arc::clone(&self.generation);
        let latest = Arc::clone(&self.latest);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            tracing::debug!("Debounced query '{}' (generation {}) started", query, generation);
            let value = fetch(query.clone()).await;

            if current.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding stale result for '{}'", query);
                return;
            }
            latest.send_replace(Some(QueryResult {
                query,
                generation,
                value,
            }));
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(handle);
        }
        true
    }

    /// Отменить ожидающий или выполняющийся запрос без публикации результата
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending();
    }

    fn abort_pending(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> DebouncedScheduler<T> {
    /// Последний опубликованный результат
    pub fn latest(&self) -> Option<QueryResult<T>> {
        self.latest.borrow().clone()
    }
}

impl<T> Drop for DebouncedScheduler<T> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}
