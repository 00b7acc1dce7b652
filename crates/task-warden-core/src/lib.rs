//! # Task-Warden Core
//!
//! Configuration model for the Task-Warden durable orchestration backend:
//! provider option blocks, single-active-provider selection, and symbolic
//! connection-name resolution.
//!
//! This crate decides *which* backend is active and *which* connection values
//! it runs against. It performs no queue or storage I/O of its own; the live
//! engine types built from these decisions live in `task-warden-runtime`.
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for configuration and provider selection
//! - [`connection`] - Connection strings and the resolver capability
//! - [`options`] - Provider option blocks, the configuration root, and the
//!   active-provider selector
//!
//! ## Usage
//!
//! ```rust
//! use task_warden_core::{
//!     BackendConfig, ProviderSelector, SelectionPolicy, StorageOptions,
//! };
//!
//! let config = BackendConfig {
//!     storage: Some(StorageOptions {
//!         hub_name: Some("orders".to_string()),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//!
//! let selector = ProviderSelector::new(SelectionPolicy::RequireHubName);
//! let active = selector.select(&config).expect("one provider is configured");
//! assert_eq!(active.hub_name(), Some("orders"));
//! ```

pub mod connection;
pub mod error;
pub mod options;

// Re-export commonly used types at crate root for convenience
pub use connection::{
    ConnectionResolver, ConnectionString, EnvConnectionResolver, StaticConnectionResolver,
    DEFAULT_CONNECTION_NAME,
};
pub use error::{ConfigurationError, ConnectionRole, UnsupportedProviderError};
pub use options::{
    ActiveProvider, BackendConfig, BusOptions, ProviderKind, ProviderSelector, RuntimeOptions,
    SelectionPolicy, StorageOptions,
};
