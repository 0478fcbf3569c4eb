//! Debounced suggestion requests.
//!
//! While a user types, each new query replaces the pending one: the previous
//! timer is cleared and a new one started. Once a timer fires its request is
//! never cancelled, so a slow response can still arrive after a newer query
//! was typed.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::analysis::Analyzer;

struct Pending {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// Runs only the most recently scheduled task, after a quiet period.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<Pending>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `task` to run after the delay, clearing any timer that has
    /// not fired yet.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let fired = Arc::new(AtomicBool::new(false));
        let delay = self.delay;
        let flag = fired.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
            task.await;
        });

        let previous = self.lock().replace(Pending { handle, fired });
        if let Some(previous) = previous {
            clear_timer(previous);
        }
    }

    /// Clears the pending timer, if it has not fired.
    pub fn cancel(&self) {
        if let Some(previous) = self.lock().take() {
            clear_timer(previous);
        }
    }

    /// Waits for the most recently scheduled task to finish.
    pub async fn settle(&self) {
        let pending = self.lock().take();
        if let Some(pending) = pending {
            let _ = pending.handle.await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Pending>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn clear_timer(pending: Pending) {
    if !pending.fired.load(Ordering::SeqCst) {
        pending.handle.abort();
    }
}

/// Suggestions delivered for one typed query.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionBatch {
    pub query: String,
    pub suggestions: Vec<String>,
}

/// Feeds typed input through a [`Debouncer`] into [`Analyzer::suggest`].
///
/// Results arrive on the receiver returned by [`SuggestionFeed::new`].
pub struct SuggestionFeed {
    analyzer: Analyzer,
    debouncer: Debouncer,
    tx: mpsc::UnboundedSender<SuggestionBatch>,
}

impl SuggestionFeed {
    pub fn new(analyzer: Analyzer) -> (Self, mpsc::UnboundedReceiver<SuggestionBatch>) {
        let delay = Duration::from_millis(analyzer.search_config().suggest_debounce_ms);
        let (tx, rx) = mpsc::unbounded_channel();
        let feed = Self {
            analyzer,
            debouncer: Debouncer::new(delay),
            tx,
        };
        (feed, rx)
    }

    /// Records the current input. Blank input clears the pending request
    /// and issues none.
    pub fn update(&self, input: &str) {
        let query = input.trim().to_string();
        if query.is_empty() {
            self.debouncer.cancel();
            return;
        }

        let analyzer = self.analyzer.clone();
        let tx = self.tx.clone();
        self.debouncer.schedule(async move {
            let suggestions = analyzer.suggest(&query).await;
            let _ = tx.send(SuggestionBatch { query, suggestions });
        });
    }

    /// Waits for the last scheduled request to complete.
    pub async fn settle(&self) {
        self.debouncer.settle().await;
    }
}
