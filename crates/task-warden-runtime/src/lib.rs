//! # Task-Warden Runtime
//!
//! Engine-facing half of the Task-Warden orchestration backend: resolved
//! settings value objects, live engine handles, and the [`BackendFactory`]
//! that owns the process-lifetime default engine.
//!
//! The factory guarantees two things the hosting process relies on:
//!
//! 1. **Exactly one engine for the host.** The default engine is built once,
//!    at factory construction, from the single active provider in the
//!    configuration. Construction either fully succeeds or fails; there is
//!    no partially initialized factory.
//! 2. **Clients share the host engine when they target it.** A client
//!    request that resolves to the same task hub and connection as the
//!    default engine receives the *same instance*, so its sends are observed
//!    by the host immediately instead of on the next poll cycle.
//!
//! ## Module Organization
//!
//! - [`settings`] - Resolved engine-settings value objects
//! - [`builder`] - Connection/hub resolution and settings construction
//! - [`engine`] - Engine handle types and backend capability traits
//! - [`factory`] - The backend factory

pub mod builder;
pub mod engine;
pub mod factory;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use builder::{ClientBinding, SettingsBuilder};
pub use engine::{BusEngine, ClientBackend, EngineHandle, RunnableBackend, StorageEngine};
pub use factory::BackendFactory;
pub use settings::{
    BlobStoreSettings, BusEngineSettings, InstanceStoreSettings, StorageEngineSettings,
    TrackingStoreSettings,
};
