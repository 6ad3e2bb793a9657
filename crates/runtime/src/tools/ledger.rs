//! Replay protection for side-effecting tools.
//!
//! Failover restarts an exchange from scratch, so a vendor inquiry sent on a
//! model that then failed would be sent again on the next one. The ledger
//! remembers the result of each side-effecting call per exchange and hands it
//! back on replay.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How long a recorded result stays replayable.
pub const LEDGER_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    exchange: String,
    tool: String,
    /// Canonical JSON of the arguments.
    args: String,
}

#[derive(Debug)]
struct Entry {
    result: Map<String, Value>,
    recorded_at: Instant,
}

#[derive(Debug)]
pub struct IdempotencyLedger {
    entries: Mutex<HashMap<Key, Entry>>,
    ttl: Duration,
}

impl Default for IdempotencyLedger {
    fn default() -> Self {
        Self::with_ttl(LEDGER_TTL)
    }
}

impl IdempotencyLedger {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Return the recorded result for this call, or run `f` and record it.
    ///
    /// The lock is held while `f` runs so two concurrent replays of the same
    /// call cannot both execute it.
    pub fn get_or_run(
        &self,
        exchange: &str,
        tool: &str,
        args: &Value,
        f: impl FnOnce() -> Map<String, Value>,
    ) -> Map<String, Value> {
        let key = Key {
            exchange: exchange.to_string(),
            tool: tool.to_string(),
            args: canonical(args),
        };
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(&key) {
            if now.duration_since(entry.recorded_at) <= self.ttl {
                tracing::info!(tool, exchange, "replayed side-effecting tool from ledger");
                return entry.result.clone();
            }
        }

        let ttl = self.ttl;
        entries.retain(|_, e| now.duration_since(e.recorded_at) <= ttl);
        let result = f();
        entries.insert(
            key,
            Entry {
                result: result.clone(),
                recorded_at: now,
            },
        );
        result
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serialize with object keys sorted at every level.
fn canonical(value: &Value) -> String {
    fn sort(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut sorted = Map::new();
                for key in keys {
                    sorted.insert(key.clone(), sort(&map[key]));
                }
                Value::Object(sorted)
            }
            Value::Array(items) => Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    sort(value).to_string()
}
