//! Shared pipeline stages: search, extract, synthesize.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, instrument};

use topiclens_extract::{PageExtractor, synthesize};
use topiclens_search::SearchClient;
use topiclens_shared::{Result, TopicLensError, topic_key};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once extraction has settled.
    fn pages_extracted(&self, kept: usize, total: usize);
    /// Called when a stored record answered the request.
    fn cache_hit(&self, topic: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn pages_extracted(&self, _kept: usize, _total: usize) {}
    fn cache_hit(&self, _topic: &str) {}
}

/// Trimmed topic, or a validation error when blank.
pub(crate) fn validate_topic(topic: &str) -> Result<&str> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(TopicLensError::validation("topic must not be blank"));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Gathering
// ---------------------------------------------------------------------------

/// Source material collected for one topic.
#[derive(Debug, Clone, Default)]
pub struct Gathered {
    /// URLs of kept pages, in search-rank order.
    pub source_urls: Vec<String>,
    /// Concatenated text of kept pages.
    pub corpus: String,
    /// Number of URLs the search returned.
    pub candidates: usize,
}

impl Gathered {
    pub fn is_empty(&self) -> bool {
        self.source_urls.is_empty()
    }
}

/// Search and extraction backends shared by both orchestrators.
pub struct Sources {
    search: SearchClient,
    extractor: PageExtractor,
}

impl Sources {
    pub fn new(search: SearchClient, extractor: PageExtractor) -> Self {
        Self { search, extractor }
    }

    /// Search for `topic`, then fetch and keep pages of at least `min_chars`.
    ///
    /// A search failure propagates; page failures only shrink the result.
    #[instrument(skip_all, fields(topic = %topic, min_chars = min_chars))]
    pub async fn gather(
        &self,
        topic: &str,
        min_chars: usize,
        progress: &dyn ProgressReporter,
    ) -> Result<Gathered> {
        progress.phase("Searching");
        let response = self.search.search(topic).await?;
        let links = response.links();
        info!(results = links.len(), "search complete");

        progress.phase("Extracting pages");
        let pages = self.extractor.extract(&links, min_chars).await;
        progress.pages_extracted(pages.len(), links.len());
        info!(kept = pages.len(), candidates = links.len(), "extraction complete");

        let texts: Vec<&str> = pages.iter().map(|p| p.text.as_str()).collect();
        Ok(Gathered {
            corpus: synthesize(&texts),
            source_urls: pages.into_iter().map(|p| p.url).collect(),
            candidates: links.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Single-flight
// ---------------------------------------------------------------------------

/// Per-topic async locks keyed by the normalized topic.
///
/// Holding a topic's guard across lookup, generation and persistence means
/// concurrent requests for one topic compute it at most once. An entry lives
/// only while some request holds or waits on it.
#[derive(Default)]
pub struct TopicLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TopicLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait for exclusive access to `topic`.
    pub async fn acquire(&self, topic: &str) -> TopicGuard<'_> {
        let key = topic_key(topic);
        let lock = self.table().entry(key.clone()).or_default().clone();
        let guard = lock.lock_owned().await;
        TopicGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of topics currently held or awaited.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one topic; releases and prunes its entry on drop.
pub struct TopicGuard<'a> {
    locks: &'a TopicLocks,
    key: String,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for TopicGuard<'_> {
    fn drop(&mut self) {
        // Waiters clone the entry under the table lock, so a count of one
        // here means nobody else can reach it.
        let mut table = self.locks.table();
        self.guard.take();
        if table
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn topic_locks_fold_case() {
        let locks = Arc::new(TopicLocks::new());
        let guard = locks.acquire("Rust").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("  rust ").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("lock released")
            .expect("task");
    }

    #[tokio::test]
    async fn distinct_topics_do_not_block() {
        let locks = TopicLocks::new();
        let _a = locks.acquire("rust").await;
        let b = tokio::time::timeout(Duration::from_millis(200), locks.acquire("go")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn released_topics_leave_no_entries() {
        let locks = TopicLocks::new();
        for i in 0..1000 {
            let _guard = locks.acquire(&format!("topic {i}")).await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn entry_survives_while_a_waiter_remains() {
        let locks = Arc::new(TopicLocks::new());
        let guard = locks.acquire("rust").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("Rust").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        drop(guard);
        assert_eq!(locks.len(), 1);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("lock released")
            .expect("task");
        assert!(locks.is_empty());
    }
}
