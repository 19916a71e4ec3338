use crate::config::Config;
use crate::pipeline::itinerary::Roadbook;
use crate::types::plan::{LegKey, LegOptions, LegOptionsEntry};
use crate::types::settings::Settings;
use crate::types::track::{Segment, Track};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A processed upload: the GPX text and raw segments it was built from, the
/// settings used, the resulting track, the roadbook marks and the options the
/// user attached to legs.
#[derive(Debug, Clone)]
pub struct Plan {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub segments: Vec<Segment>,
    pub settings: Settings,
    pub track: Track,
    pub roadbook: Roadbook,
    pub legs: HashMap<LegKey, LegOptions>,
}

impl Plan {
    /// Stores leg options with their indices clamped onto the track. A later
    /// entry for the same leg replaces the earlier one.
    pub fn merge_leg_options(&mut self, entries: Vec<LegOptionsEntry>) {
        let last = self.track.last_index().unwrap_or(0);
        for entry in entries {
            let key = LegKey::new(entry.start.min(last), entry.end.min(last));
            self.legs.insert(key, entry.options);
        }
    }

    pub fn leg_option_entries(&self) -> Vec<LegOptionsEntry> {
        let mut entries: Vec<LegOptionsEntry> = self
            .legs
            .iter()
            .map(|(key, options)| LegOptionsEntry {
                start: key.start,
                end: key.end,
                options: options.clone(),
            })
            .collect();
        entries.sort_by_key(|entry| (entry.start, entry.end));
        entries
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    cache: Arc<DashMap<String, CachedPlan>>,
}

struct CachedPlan {
    plan: Plan,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn insert(&self, plan_id: String, plan: Plan) {
        self.cache.insert(
            plan_id,
            CachedPlan {
                plan,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, plan_id: &str) -> Option<Plan> {
        self.cache.get(plan_id).map(|entry| entry.plan.clone())
    }

    /// Swaps in a new plan value for an existing id. The previous value is
    /// returned; nothing is updated in place.
    pub fn replace(&self, plan_id: &str, plan: Plan) -> Option<Plan> {
        let mut entry = self.cache.get_mut(plan_id)?;
        entry.inserted_at = Instant::now();
        Some(std::mem::replace(&mut entry.plan, plan))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.cache
            .retain(|_, cached| now.duration_since(cached.inserted_at) < ttl);
        tracing::info!("Cache eviction complete. Current size: {}", self.cache.len());
    }
}
