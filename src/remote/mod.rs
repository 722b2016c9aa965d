//! Remote data access: client, connection tracking, and the resilient
//! query executor.

pub mod client;
pub mod connection;
pub mod executor;

pub use client::{AuthUser, RemoteClient, RemoteResult};
pub use connection::{ConnectionState, ConnectionTracker};
pub use executor::{BackoffConfig, QueryExecutor, RetryPolicy};
