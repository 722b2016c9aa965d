//! Meal Logging Store
//!
//! Call-site adapter for the `meals` table: fetch a day's meals, log a new
//! meal, delete a logged meal. Reads go through the resilient executor with
//! the cached day (or an empty list) as fallback; deletes and inserts are
//! not retried, so a flaky network cannot double-log a meal.

use crate::remote::{QueryExecutor, RemoteClient, RemoteResult, RetryPolicy};
use crate::store::cache::SnapshotCache;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const READ_ATTEMPTS: u32 = 3;

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealRecord {
    /// Unique meal ID
    pub id: Uuid,
    /// The user who logged the meal
    pub user_id: Uuid,
    /// Meal name, e.g. "oatmeal with berries"
    pub name: String,
    /// Slot within the day: breakfast, lunch, dinner, snack
    pub meal_type: String,
    /// Energy in kilocalories
    pub calories: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Day the meal belongs to
    pub eaten_on: NaiveDate,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Payload for logging a new meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeal {
    pub user_id: Uuid,
    pub name: String,
    pub meal_type: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub eaten_on: NaiveDate,
}

/// Store for meal records
#[derive(Debug, Clone)]
pub struct MealStore {
    executor: Arc<QueryExecutor>,
    cache: Option<Arc<SnapshotCache>>,
}

impl MealStore {
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
        format!("meals:{}:{}", user_id, day)
    }

    /// Fetch the meals a user logged on a given day.
    ///
    /// Falls back to the cached day, or an empty list, when the backend is
    /// unreachable.
    pub async fn meals_for_day(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> RemoteResult<Vec<MealRecord>> {
        let key = Self::cache_key(user_id, day);
        let fallback: Vec<MealRecord> = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(&key))
            .unwrap_or_default();

        let meals = self
            .executor
            .execute(
                move |client: RemoteClient| async move {
                    let query = format!(
                        "select=*&user_id=eq.{}&eaten_on=eq.{}&order=created_at.asc",
                        user_id, day
                    );
                    client.select::<MealRecord>("meals", &query).await
                },
                RetryPolicy::with_fallback(READ_ATTEMPTS, fallback),
            )
            .await?;

        if let Some(cache) = &self.cache {
            if !self.executor.is_offline() {
                cache.put(&key, &meals);
            }
        }
        Ok(meals)
    }

    /// Log a new meal. Not retried: a duplicate insert would double-count
    /// the meal's calories.
    pub async fn log_meal(&self, meal: NewMeal) -> RemoteResult<MealRecord> {
        self.executor
            .execute(
                move |client: RemoteClient| {
                    let meal = meal.clone();
                    async move { client.insert::<MealRecord, _>("meals", &meal).await }
                },
                RetryPolicy::attempts(1),
            )
            .await
    }

    /// Delete a logged meal
    pub async fn delete_meal(&self, meal_id: Uuid) -> RemoteResult<()> {
        self.executor
            .execute(
                move |client: RemoteClient| async move {
                    client.delete("meals", &format!("id=eq.{}", meal_id)).await
                },
                RetryPolicy::attempts(1),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_record_round_trip() {
        let record = MealRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "oatmeal with berries".to_string(),
            meal_type: "breakfast".to_string(),
            calories: 320.0,
            protein_g: 12.0,
            carbs_g: 54.0,
            fat_g: 6.0,
            eaten_on: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: MealRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_cache_key_is_scoped_per_user_and_day() {
        let user = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let key = MealStore::cache_key(user, day);
        assert!(key.starts_with("meals:"));
        assert!(key.contains(&user.to_string()));
        assert!(key.ends_with("2025-03-14"));
    }
}
