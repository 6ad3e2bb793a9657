//! Saved product shortlists.

use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// A product saved to a shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

/// Optional metadata for a new shortlist.
#[derive(Debug, Clone, Default)]
pub struct ShortlistOptions {
    pub title: Option<String>,
    pub style: Option<String>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shortlist {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub style: String,
    pub budget: Option<f64>,
    pub items: Vec<ShortlistItem>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shortlist {
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|i| i.price).sum()
    }

    pub fn shareable_link(&self) -> String {
        format!("/shortlist/{}", self.id)
    }

    pub fn comparison_link(&self) -> String {
        format!("https://weddingease.com/compare/{}", self.id)
    }

    /// Distinct categories in insertion order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for category in self.items.iter().filter_map(|i| i.category.as_ref()) {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }
}

/// Outcome of adding an item to an existing shortlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Days a shortlist is kept after creation.
pub const SHORTLIST_RETENTION_DAYS: i64 = 30;

/// Shortlists keyed by id. Lists older than [`SHORTLIST_RETENTION_DAYS`] are
/// invisible to lookups and dropped on the next create.
#[derive(Debug, Default)]
pub struct ShortlistStore {
    lists: RwLock<HashMap<String, Shortlist>>,
}

impl ShortlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shortlist. Duplicate item ids in `items` are kept once.
    pub fn create(
        &self,
        owner: impl Into<String>,
        items: Vec<ShortlistItem>,
        options: ShortlistOptions,
    ) -> Shortlist {
        self.create_at(owner.into(), items, options, Utc::now())
    }

    pub fn get(&self, id: &str) -> Option<Shortlist> {
        self.get_at(id, Utc::now())
    }

    /// Add an item unless one with the same id is already saved.
    pub fn add(&self, id: &str, item: ShortlistItem) -> Result<AddOutcome> {
        self.update(id, |list| {
            if list.items.iter().any(|i| i.id == item.id) {
                return AddOutcome::AlreadyPresent;
            }
            list.items.push(item);
            list.updated_at = Utc::now();
            AddOutcome::Added
        })
    }

    pub fn make_public(&self, id: &str) -> Result<Shortlist> {
        self.update(id, |list| {
            list.is_public = true;
            list.updated_at = Utc::now();
            list.clone()
        })
    }

    pub fn len(&self) -> usize {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn create_at(
        &self,
        owner: String,
        items: Vec<ShortlistItem>,
        options: ShortlistOptions,
        now: DateTime<Utc>,
    ) -> Shortlist {
        self.sweep_expired_at(now);
        let mut unique: Vec<ShortlistItem> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|i| i.id == item.id) {
                unique.push(item);
            }
        }

        let shortlist = Shortlist {
            id: new_shortlist_id(now),
            owner,
            title: options.title.unwrap_or_else(|| "My Wedding Picks".to_string()),
            style: options.style.unwrap_or_else(|| "mixed".to_string()),
            budget: options.budget,
            items: unique,
            is_public: false,
            created_at: now,
            updated_at: now,
        };

        self.lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(shortlist.id.clone(), shortlist.clone());
        tracing::info!(shortlist = %shortlist.id, items = shortlist.items.len(), "shortlist created");
        shortlist
    }

    fn get_at(&self, id: &str, now: DateTime<Utc>) -> Option<Shortlist> {
        self.lists
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .filter(|list| !is_expired(list, now))
            .cloned()
    }

    fn update<T>(&self, id: &str, f: impl FnOnce(&mut Shortlist) -> T) -> Result<T> {
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        let list = lists
            .get_mut(id)
            .filter(|list| !is_expired(list, Utc::now()))
            .ok_or_else(|| Error::ShortlistNotFound(id.to_string()))?;
        Ok(f(list))
    }

    fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        let before = lists.len();
        lists.retain(|_, list| !is_expired(list, now));
        let removed = before - lists.len();
        if removed > 0 {
            tracing::debug!(removed, "old shortlists swept");
        }
        removed
    }
}

fn is_expired(list: &Shortlist, now: DateTime<Utc>) -> bool {
    now - list.created_at > Duration::days(SHORTLIST_RETENTION_DAYS)
}

/// `SL-YYYYMMDD-XXXXXX`
fn new_shortlist_id(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "SL-{}-{}",
        now.format("%Y%m%d"),
        random[..6].to_uppercase()
    )
}
