// Cache of the months discovered on the planning page.
//
// Bump CACHE_VERSION whenever MonthSource or the layout below changes,
// so stale files are ignored instead of misread.
use crate::client::discovery::MonthSource;
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CACHE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
struct CacheFile {
    // Missing in older files, so they read as version 0.
    #[serde(default)]
    version: u32,
    planning_url: String,
    fetched_at: DateTime<Utc>,
    sources: Vec<MonthSource>,
}

/// Discovered month sources, valid for one planning URL during `ttl`.
#[derive(Debug, Clone)]
pub struct DiscoveryCache {
    path: Option<PathBuf>,
    ttl: Duration,
    entry: Option<CacheFile>,
}

impl DiscoveryCache {
    /// A cache that lives only in memory.
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            path: None,
            ttl,
            entry: None,
        }
    }

    /// Loads the persisted cache. Unreadable or outdated files give an empty cache.
    pub fn load(ctx: &dyn AppContext, ttl: Duration) -> Self {
        let path = ctx.get_discovery_cache_path();
        let entry = path
            .as_ref()
            .filter(|p| p.exists())
            .and_then(|p| {
                LocalStorage::with_lock(p, || Ok(fs::read_to_string(p)?))
                    .map_err(|e| log::warn!("Could not read discovery cache: {}", e))
                    .ok()
            })
            .and_then(|json| serde_json::from_str::<CacheFile>(&json).ok())
            .filter(|c| c.version == CACHE_VERSION);

        Self { path, ttl, entry }
    }

    /// Sources for `planning_url` if they were fetched less than `ttl` ago.
    pub fn get(&self, planning_url: &str, now: DateTime<Utc>) -> Option<&[MonthSource]> {
        let entry = self.entry.as_ref()?;
        if entry.planning_url != planning_url {
            return None;
        }
        let age = now.signed_duration_since(entry.fetched_at).to_std().ok()?;
        if age >= self.ttl {
            return None;
        }
        Some(&entry.sources)
    }

    pub fn store(&mut self, planning_url: &str, sources: Vec<MonthSource>, now: DateTime<Utc>) {
        self.entry = Some(CacheFile {
            version: CACHE_VERSION,
            planning_url: planning_url.to_string(),
            fetched_at: now,
            sources,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Persists the entry. A no-op for in-memory caches.
    pub fn save(&self) -> Result<()> {
        let (Some(path), Some(entry)) = (&self.path, &self.entry) else {
            return Ok(());
        };
        LocalStorage::with_lock(path, || {
            let json = serde_json::to_string_pretty(entry)?;
            LocalStorage::atomic_write(path, json)?;
            Ok(())
        })
    }
}
