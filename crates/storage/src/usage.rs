//! Daily message counters per identifier.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Quota status after a check or an increment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStatus {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub used: u32,
    /// Next UTC midnight.
    pub resets_at: DateTime<Utc>,
}

/// Counts messages per identifier (user id or client address) per UTC day.
#[derive(Debug, Default)]
pub struct UsageTracker {
    records: Mutex<HashMap<(String, NaiveDate), u32>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status against `limit` without counting a message.
    pub fn check(&self, identifier: &str, limit: u32) -> UsageStatus {
        self.check_at(identifier, limit, Utc::now())
    }

    /// Count one message and return the updated status.
    pub fn increment(&self, identifier: &str, limit: u32) -> UsageStatus {
        self.increment_at(identifier, limit, Utc::now())
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_at(&self, identifier: &str, limit: u32, now: DateTime<Utc>) -> UsageStatus {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let used = records
            .get(&(identifier.to_string(), now.date_naive()))
            .copied()
            .unwrap_or_default();
        status(used, limit, now)
    }

    /// Counters from earlier days are dropped before counting.
    fn increment_at(&self, identifier: &str, limit: u32, now: DateTime<Utc>) -> UsageStatus {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let today = now.date_naive();
        let before = records.len();
        records.retain(|(_, day), _| *day == today);
        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!(removed, "stale usage counters swept");
        }

        let count = records
            .entry((identifier.to_string(), today))
            .or_default();
        *count += 1;
        status(*count, limit, now)
    }

}

fn status(used: u32, limit: u32, now: DateTime<Utc>) -> UsageStatus {
    let remaining = limit.saturating_sub(used);
    UsageStatus {
        allowed: remaining > 0,
        remaining,
        limit,
        used,
        resets_at: next_midnight(now),
    }
}

fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
