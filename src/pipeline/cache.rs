// src/pipeline/cache.rs

use crate::pipeline::engine::EngineOutput;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Identifies one engine run: same segment, same engine setup, same data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub segment: String,
    /// [`ForecastEngine::fingerprint`](crate::pipeline::engine::ForecastEngine::fingerprint).
    pub engine_key: u64,
    pub series_fingerprint: u64,
    pub horizon: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, EngineOutput>,
    // Insertion order, oldest first.
    order: VecDeque<CacheKey>,
}

/// Bounded memo of engine outputs.
///
/// Entries are evicted oldest-first past `capacity`. A changed series hashes to a new
/// key, so stale entries are never returned; `invalidate_segment` and `clear` free
/// them when the underlying data is reloaded.
#[derive(Debug)]
pub struct ForecastCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl ForecastCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &CacheKey) -> Option<EngineOutput> {
        self.lock().entries.get(key).cloned()
    }

    pub fn insert(&self, key: CacheKey, output: EngineOutput) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.lock();
        if state.entries.insert(key.clone(), output).is_none() {
            state.order.push_back(key);
        }
        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
            }
        }
    }

    /// Drops every entry for `segment`.
    pub fn invalidate_segment(&self, segment: &str) {
        let mut state = self.lock();
        state.entries.retain(|key, _| key.segment != segment);
        state.order.retain(|key| key.segment != segment);
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
