//! Feature-area stores: thin adapters that build operation closures and
//! per-call retry policies, then delegate to the query executor.

pub mod cache;
pub mod goals;
pub mod meals;
pub mod profile;
pub mod water;

pub use cache::SnapshotCache;
pub use goals::{GoalsStore, NutritionGoals};
pub use meals::{MealRecord, MealStore, NewMeal};
pub use profile::{ProfileStore, UserProfile};
pub use water::{WaterIntakeRecord, WaterStore};

use crate::remote::QueryExecutor;
use std::sync::Arc;

/// Bundle of all stores over one shared executor and snapshot cache
#[derive(Debug, Clone)]
pub struct Stores {
    pub meals: MealStore,
    pub water: WaterStore,
    pub goals: GoalsStore,
    pub profile: ProfileStore,
}

impl Stores {
    /// Build all stores over a shared executor, without caching
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self {
            meals: MealStore::new(executor.clone()),
            water: WaterStore::new(executor.clone()),
            goals: GoalsStore::new(executor.clone()),
            profile: ProfileStore::new(executor),
        }
    }

    /// Build all stores sharing one snapshot cache
    pub fn with_cache(executor: Arc<QueryExecutor>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            meals: MealStore::new(executor.clone()).with_cache(cache.clone()),
            water: WaterStore::new(executor.clone()).with_cache(cache.clone()),
            goals: GoalsStore::new(executor.clone()).with_cache(cache.clone()),
            profile: ProfileStore::new(executor).with_cache(cache),
        }
    }
}
