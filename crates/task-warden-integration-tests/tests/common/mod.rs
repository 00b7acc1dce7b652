//! Shared helpers for the integration tests.

use std::sync::Arc;
use task_warden_core::{StaticConnectionResolver, DEFAULT_CONNECTION_NAME};

/// Resolver with every connection the scenario configs refer to.
pub fn standard_resolver() -> Arc<StaticConnectionResolver> {
    Arc::new(
        StaticConnectionResolver::new()
            .with(DEFAULT_CONNECTION_NAME, "CS")
            .with("reporting-storage", "cs-reporting")
            .with("billing-bus", "cs-bus")
            .with("billing-tables", "cs-tables")
            .with("billing-blobs", "cs-blobs"),
    )
}

/// Minimal storage-backed configuration document.
pub const STORAGE_CONFIG: &str = r#"
[storage]
hub_name = "demo"
"#;

/// Fully specified bus-backed configuration document.
pub const BUS_CONFIG: &str = r#"
[bus]
hub_name = "billing"
connection_name = "billing-bus"
instance_table_connection_name = "billing-tables"
blob_connection_name = "billing-blobs"
max_queue_size_mb = 2048
"#;
