//! Water Intake Store
//!
//! Call-site adapter for the `water_intake` table. One row per user per day
//! holding the number of glasses drunk; updates are upserts keyed on
//! (user_id, day), so retrying a write is safe.

use crate::remote::{QueryExecutor, RemoteClient, RemoteResult, RetryPolicy};
use crate::store::cache::SnapshotCache;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const READ_ATTEMPTS: u32 = 3;
const WRITE_ATTEMPTS: u32 = 2;

/// A day's water intake for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterIntakeRecord {
    /// Unique row ID
    pub id: Uuid,
    /// The user this row belongs to
    pub user_id: Uuid,
    /// Day of intake
    pub day: NaiveDate,
    /// Glasses drunk that day
    pub glasses: u32,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for a day's intake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterIntakeUpdate {
    pub user_id: Uuid,
    pub day: NaiveDate,
    pub glasses: u32,
}

/// Store for water intake
#[derive(Debug, Clone)]
pub struct WaterStore {
    executor: Arc<QueryExecutor>,
    cache: Option<Arc<SnapshotCache>>,
}

impl WaterStore {
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

    fn cache_key(user_id: Uuid, day: NaiveDate) -> String {
        format!("water:{}:{}", user_id, day)
    }

    /// Glasses drunk on a given day. Falls back to the cached count, or
    /// zero, when the backend is unreachable.
    pub async fn glasses_for_day(&self, user_id: Uuid, day: NaiveDate) -> RemoteResult<u32> {
        let key = Self::cache_key(user_id, day);
        let fallback: u32 = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(&key))
            .unwrap_or(0);

        let glasses = self
            .executor
            .execute(
                move |client: RemoteClient| async move {
                    let query = format!(
                        "select=*&user_id=eq.{}&day=eq.{}&limit=1",
                        user_id, day
                    );
                    let rows = client.select::<WaterIntakeRecord>("water_intake", &query).await?;
                    Ok(rows.first().map(|row| row.glasses).unwrap_or(0))
                },
                RetryPolicy::with_fallback(READ_ATTEMPTS, fallback),
            )
            .await?;

        if let Some(cache) = &self.cache {
            if !self.executor.is_offline() {
                cache.put(&key, &glasses);
            }
        }
        Ok(glasses)
    }

    /// Set the glass count for a day. Idempotent upsert, so a short retry
    /// budget is safe.
    pub async fn set_glasses(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        glasses: u32,
    ) -> RemoteResult<WaterIntakeRecord> {
        let update = WaterIntakeUpdate {
            user_id,
            day,
            glasses,
        };
        let record = self
            .executor
            .execute(
                move |client: RemoteClient| {
                    let update = update.clone();
                    async move {
                        client
                            .upsert::<WaterIntakeRecord, _>("water_intake", &update)
                            .await
                    }
                },
                RetryPolicy::attempts(WRITE_ATTEMPTS),
            )
            .await?;

        if let Some(cache) = &self.cache {
            cache.put(&Self::cache_key(user_id, day), &record.glasses);
        }
        Ok(record)
    }

    /// Record one more glass for the day
    pub async fn log_glass(&self, user_id: Uuid, day: NaiveDate) -> RemoteResult<WaterIntakeRecord> {
        let current = self.glasses_for_day(user_id, day).await?;
        self.set_glasses(user_id, day, current + 1).await
    }
}
