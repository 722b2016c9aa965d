//! FitTrack Data-Access Layer
//!
//! This library is the data-access layer of the FitTrack fitness/nutrition
//! tracker. It mediates between application state containers (meal,
//! nutrition, water, profile panels) and a hosted BaaS, providing
//! retry-with-backoff, offline-mode detection, and fallback-value
//! substitution so the UI keeps working when the backend does not.
//!
//! # Module Structure
//!
//! - **`config`** - Remote endpoint/credentials resolution (env or TOML file)
//! - **`error`** - The `RemoteError` taxonomy and the retryable-error
//!   classifier
//! - **`remote`** - The BaaS client, connection-state tracking, and the
//!   resilient query executor at the heart of the crate
//! - **`store`** - Call-site adapters per feature area (meals, water,
//!   goals, profile) plus the local snapshot cache they use for fallbacks
//!
//! # Usage
//!
//! ```rust,no_run
//! use fittrack::config::RemoteConfig;
//! use fittrack::remote::{QueryExecutor, RemoteClient};
//! use fittrack::store::Stores;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RemoteConfig::from_env()?;
//! let executor = Arc::new(QueryExecutor::new(RemoteClient::new(config)?));
//!
//! // Manual "Retry" action in the UI binds to this
//! executor.test_connection().await;
//!
//! let stores = Stores::new(executor.clone());
//! let today = chrono::Utc::now().date_naive();
//! let meals = stores.meals.meals_for_day(uuid::Uuid::new_v4(), today).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Failure Handling
//!
//! All remote calls pass through [`remote::QueryExecutor::execute`], which
//! owns the only deliberate failure-handling policy in the app: skip the
//! network while offline, retry transient failures with capped exponential
//! backoff, substitute the caller's fallback once attempts are exhausted,
//! and never swallow an error when no fallback exists.
//!
//! # Thread Safety
//!
//! The executor, client, and connection tracker are cheap to clone and safe
//! to share across tasks; clones observe the same session token and the
//! same process-wide connection state.

/// Remote endpoint configuration
pub mod config;

/// Error taxonomy and retryable-error classifier
pub mod error;

/// Remote client, connection state, and the resilient query executor
pub mod remote;

/// Feature-area stores and the local snapshot cache
pub mod store;

pub use error::RemoteError;
pub use remote::{ConnectionState, QueryExecutor, RemoteClient, RetryPolicy};
