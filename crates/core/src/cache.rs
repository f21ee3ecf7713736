//! Parse results keyed by document content.

use indexmap::IndexMap;
use parking_lot::Mutex;
use srcsync_api::{ParseOutcome, SourceParser};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Small LRU of parse outcomes keyed by the xxh3 hash of the parsed text.
///
/// Typing back and forth between a few states (undo/redo) reuses earlier
/// parses. `release` drops everything and starts a new generation.
pub struct ParseCache {
    capacity: usize,
    entries: Mutex<IndexMap<u64, Arc<ParseOutcome>>>,
    generation: AtomicU64,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn key(text: &str) -> u64 {
        xxh3_64(text.as_bytes())
    }

    /// The cached outcome for `text`, parsing it on a miss. The parser runs
    /// without the cache lock held.
    pub fn get_or_parse(&self, text: &str, parser: &dyn SourceParser) -> Arc<ParseOutcome> {
        let key = Self::key(text);
        {
            let mut entries = self.entries.lock();
            if let Some(hit) = entries.shift_remove(&key) {
                entries.insert(key, hit.clone());
                debug!("Parse cache hit for {:016x}", key);
                return hit;
            }
        }

        let outcome = Arc::new(parser.parse(text));
        if self.capacity > 0 {
            let mut entries = self.entries.lock();
            entries.insert(key, outcome.clone());
            while entries.len() > self.capacity {
                entries.shift_remove_index(0);
            }
        }
        outcome
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn release(&self) {
        self.entries.lock().clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
