//! Nutrition Goals Store
//!
//! Call-site adapter for the `nutrition_goals` table: one row per user with
//! daily targets. When the backend is unreachable the store falls back to
//! the cached goals, or to the stock defaults, so the dashboard always has
//! targets to render against.

use crate::remote::{QueryExecutor, RemoteClient, RemoteResult, RetryPolicy};
use crate::store::cache::SnapshotCache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const READ_ATTEMPTS: u32 = 3;
const WRITE_ATTEMPTS: u32 = 2;

/// Daily nutrition targets for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionGoals {
    /// The user these goals belong to
    pub user_id: Uuid,
    /// Daily energy target in kilocalories
    pub daily_calories: u32,
    /// Daily protein target in grams
    pub protein_g: u32,
    /// Daily carbohydrate target in grams
    pub carbs_g: u32,
    /// Daily fat target in grams
    pub fat_g: u32,
    /// Daily water target in glasses
    pub water_glasses: u32,
}

impl NutritionGoals {
    /// Stock defaults shown before a user has saved their own goals
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            daily_calories: 2000,
            protein_g: 150,
            carbs_g: 250,
            fat_g: 70,
            water_glasses: 8,
        }
    }

    /// Remaining calories for a day given the logged total
    pub fn remaining_calories(&self, consumed: f64) -> f64 {
        (self.daily_calories as f64 - consumed).max(0.0)
    }
}

/// Store for nutrition goals
#[derive(Debug, Clone)]
pub struct GoalsStore {
    executor: Arc<QueryExecutor>,
    cache: Option<Arc<SnapshotCache>>,
}

impl GoalsStore {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self {
            executor,
            cache: None,
        }
    }

    /// Mirror successful reads into a snapshot cache
    pub fn with_cache(mut self, cache: Arc<SnapshotCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn cache_key(user_id: Uuid) -> String {
        format!("goals:{}", user_id)
    }

    /// Fetch a user's goals, falling back to cached then default goals
    pub async fn fetch_goals(&self, user_id: Uuid) -> RemoteResult<NutritionGoals> {
        let key = Self::cache_key(user_id);
        let fallback: NutritionGoals = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(&key))
            .unwrap_or_else(|| NutritionGoals::defaults_for(user_id));

        let goals = self
            .executor
            .execute(
                move |client: RemoteClient| async move {
                    let query = format!("select=*&user_id=eq.{}&limit=1", user_id);
                    let rows = client.select::<NutritionGoals>("nutrition_goals", &query).await?;
                    Ok(rows
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| NutritionGoals::defaults_for(user_id)))
                },
                RetryPolicy::with_fallback(READ_ATTEMPTS, fallback),
            )
            .await?;

        if let Some(cache) = &self.cache {
            if !self.executor.is_offline() {
                cache.put(&key, &goals);
            }
        }
        Ok(goals)
    }

    /// Save a user's goals. Idempotent upsert keyed on user_id.
    pub async fn save_goals(&self, goals: NutritionGoals) -> RemoteResult<NutritionGoals> {
        let saved = self
            .executor
            .execute(
                move |client: RemoteClient| {
                    let goals = goals.clone();
                    async move {
                        client
                            .upsert::<NutritionGoals, _>("nutrition_goals", &goals)
                            .await
                    }
                },
                RetryPolicy::attempts(WRITE_ATTEMPTS),
            )
            .await?;

        if let Some(cache) = &self.cache {
            cache.put(&Self::cache_key(saved.user_id), &saved);
        }
        Ok(saved)
    }
}
