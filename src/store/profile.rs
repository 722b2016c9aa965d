//! User Profile Store
//!
//! Call-site adapter for the `profiles` table. Unlike the other stores
//! there is no sensible synthetic default for a profile, so a fetch with a
//! cold cache propagates the failure instead of fabricating one.

use crate::remote::{QueryExecutor, RemoteClient, RemoteResult, RetryPolicy};
use crate::store::cache::SnapshotCache;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const READ_ATTEMPTS: u32 = 3;

/// A user's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Matches the auth user ID
    pub id: Uuid,
    /// Name shown in the app
    pub display_name: String,
    /// Contact email
    pub email: Option<String>,
    /// Height in centimeters
    pub height_cm: Option<f64>,
    /// Weight in kilograms
    pub weight_kg: Option<f64>,
    /// Birth date, used for calorie estimates
    pub birth_date: Option<NaiveDate>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Store for user profiles
#[derive(Debug, Clone)]
pub struct ProfileStore {
    executor: Arc<QueryExecutor>,
    cache: Option<Arc<SnapshotCache>>,
}

impl ProfileStore {
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
        format!("profile:{}", user_id)
    }

    /// Fetch a user's profile. Falls back to the cached profile when one
    /// exists; with a cold cache the underlying error propagates.
    pub async fn fetch_profile(&self, user_id: Uuid) -> RemoteResult<UserProfile> {
        let key = Self::cache_key(user_id);
        let cached: Option<UserProfile> = self.cache.as_ref().and_then(|cache| cache.get(&key));

        let policy = match cached {
            Some(profile) => RetryPolicy::with_fallback(READ_ATTEMPTS, profile),
            None => RetryPolicy::attempts(READ_ATTEMPTS),
        };

        let profile = self
            .executor
            .execute(
                move |client: RemoteClient| async move {
                    let query = format!("select=*&id=eq.{}&limit=1", user_id);
                    let rows = client.select::<UserProfile>("profiles", &query).await?;
                    rows.into_iter().next().ok_or_else(|| {
                        crate::error::RemoteError::permanent(format!(
                            "profile not found for user {}",
                            user_id
                        ))
                    })
                },
                policy,
            )
            .await?;

        if let Some(cache) = &self.cache {
            if !self.executor.is_offline() {
                cache.put(&key, &profile);
            }
        }
        Ok(profile)
    }

    /// Save profile changes. Idempotent upsert keyed on id.
    pub async fn update_profile(&self, profile: UserProfile) -> RemoteResult<UserProfile> {
        let saved = self
            .executor
            .execute(
                move |client: RemoteClient| {
                    let profile = profile.clone();
                    async move { client.upsert::<UserProfile, _>("profiles", &profile).await }
                },
                RetryPolicy::attempts(2),
            )
            .await?;

        if let Some(cache) = &self.cache {
            cache.put(&Self::cache_key(saved.id), &saved);
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            display_name: "Jess".to_string(),
            email: Some("jess@example.com".to_string()),
            height_cm: Some(172.0),
            weight_kg: Some(64.5),
            birth_date: NaiveDate::from_ymd_opt(1994, 6, 2),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_round_trip() {
        let profile = test_profile();
        let json = serde_json::to_string(&profile).unwrap();
        let parsed: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn test_optional_fields_accept_null() {
        let raw = r#"{
            "id": "7f1ed1d8-7b6a-4f5e-9f65-2d9f9a2a3c11",
            "display_name": "Sam",
            "email": null,
            "height_cm": null,
            "weight_kg": null,
            "birth_date": null,
            "updated_at": "2025-03-14T09:00:00Z"
        }"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.display_name, "Sam");
        assert!(profile.height_cm.is_none());
    }
}
