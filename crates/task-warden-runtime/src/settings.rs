//! Resolved engine-settings value objects.
//!
//! A settings value is the fully resolved input an engine is constructed
//! from: live connection values, the effective task-hub name, and every
//! tuning knob filled in. Settings are built by
//! [`SettingsBuilder`](crate::builder::SettingsBuilder) and are not mutated
//! afterwards.
//!
//! Backend defaults live here, on the constructors, because the backend owns
//! them; the builder only copies option fields that are actually present.

use std::time::Duration;
use task_warden_core::ConnectionString;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

const DEFAULT_PARTITION_COUNT: u16 = 4;
const DEFAULT_CONTROL_QUEUE_BATCH_SIZE: u32 = 32;
const DEFAULT_CONTROL_QUEUE_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_WORK_ITEM_QUEUE_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_MAX_QUEUE_POLLING_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_TRACKING_STORE_NAME_PREFIX: &str = "TrackingStore";

const DEFAULT_MAX_DELIVERY_COUNT: u32 = 5;
const DEFAULT_MAX_QUEUE_SIZE_MB: u64 = 1024;

// ============================================================================
// Storage-backed settings
// ============================================================================

/// Settings for the optional tracking store of the storage-backed provider.
#[derive(Debug, Clone)]
pub struct TrackingStoreSettings {
    /// Resolved tracking-store connection.
    pub connection: ConnectionString,

    /// Prefix applied to tracking-store table names.
    pub name_prefix: String,
}

impl TrackingStoreSettings {
    /// Create tracking-store settings with the default table-name prefix.
    pub fn new(connection: ConnectionString) -> Self {
        Self {
            connection,
            name_prefix: DEFAULT_TRACKING_STORE_NAME_PREFIX.to_string(),
        }
    }
}

/// Resolved settings for a storage-backed engine.
#[derive(Debug, Clone)]
pub struct StorageEngineSettings {
    /// Resolved primary connection.
    pub connection: ConnectionString,

    /// Effective task-hub name (request override wins over configuration).
    pub hub_name: String,

    /// Number of control-queue partitions.
    pub partition_count: u16,

    /// Messages fetched per control-queue poll.
    pub control_queue_batch_size: u32,

    /// Control-queue message visibility timeout.
    pub control_queue_visibility_timeout: Duration,

    /// Work-item-queue message visibility timeout.
    pub work_item_queue_visibility_timeout: Duration,

    /// Upper bound for the queue polling backoff.
    pub max_queue_polling_interval: Duration,

    /// Orchestration work items processed concurrently by the host.
    pub max_concurrent_orchestrations: u32,

    /// Activity work items processed concurrently by the host.
    pub max_concurrent_activities: u32,

    /// Keep orchestration sessions resident between messages.
    pub extended_sessions_enabled: bool,

    /// Idle time before an extended session is unloaded.
    pub extended_session_idle_timeout: Duration,

    /// Optional tracking store; absent means history lives in the primary
    /// store.
    pub tracking_store: Option<TrackingStoreSettings>,
}

impl StorageEngineSettings {
    /// Create settings with the backend's defaults for every tuning field.
    pub fn new(connection: ConnectionString, hub_name: impl Into<String>) -> Self {
        Self {
            connection,
            hub_name: hub_name.into(),
            partition_count: DEFAULT_PARTITION_COUNT,
            control_queue_batch_size: DEFAULT_CONTROL_QUEUE_BATCH_SIZE,
            control_queue_visibility_timeout: DEFAULT_CONTROL_QUEUE_VISIBILITY_TIMEOUT,
            work_item_queue_visibility_timeout: DEFAULT_WORK_ITEM_QUEUE_VISIBILITY_TIMEOUT,
            max_queue_polling_interval: DEFAULT_MAX_QUEUE_POLLING_INTERVAL,
            max_concurrent_orchestrations: 10,
            max_concurrent_activities: 10,
            extended_sessions_enabled: false,
            extended_session_idle_timeout: Duration::from_secs(30),
            tracking_store: None,
        }
    }

    /// Check whether two settings address the same backend target.
    ///
    /// Identity is the (task hub, connection) pair compared
    /// case-insensitively; tuning fields do not participate. Two
    /// differently-shaped configurations that resolve to the same pair are
    /// the same target.
    pub fn is_same_target(&self, other: &StorageEngineSettings) -> bool {
        self.hub_name.eq_ignore_ascii_case(&other.hub_name)
            && self.connection.matches(&other.connection)
    }
}

// ============================================================================
// Bus-backed settings
// ============================================================================

/// Settings for the instance table of the bus-backed provider.
#[derive(Debug, Clone)]
pub struct InstanceStoreSettings {
    /// Resolved instance-table connection.
    pub connection: ConnectionString,
}

/// Settings for the blob store of the bus-backed provider.
#[derive(Debug, Clone)]
pub struct BlobStoreSettings {
    /// Resolved blob-store connection.
    pub connection: ConnectionString,
}

/// Resolved settings for a bus-backed engine.
///
/// The bus provider always carries its two auxiliary stores: orchestration
/// state does not fit in broker queues, so instance tracking and large
/// payloads land in the instance table and blob store respectively.
#[derive(Debug, Clone)]
pub struct BusEngineSettings {
    /// Resolved primary broker connection.
    pub connection: ConnectionString,

    /// Effective task-hub name (request override wins over configuration).
    pub hub_name: String,

    /// Delivery attempts for an orchestration message before giving up.
    pub max_orchestration_delivery_count: u32,

    /// Delivery attempts for an activity message before giving up.
    pub max_activity_delivery_count: u32,

    /// Delivery attempts for a tracking message before giving up.
    pub max_tracking_delivery_count: u32,

    /// Maximum broker queue size, in megabytes.
    pub max_queue_size_mb: u64,

    /// Instance-table store.
    pub instance_store: InstanceStoreSettings,

    /// Blob store for large payloads.
    pub blob_store: BlobStoreSettings,
}

impl BusEngineSettings {
    /// Create settings with the backend's defaults for every tuning field.
    pub fn new(
        connection: ConnectionString,
        hub_name: impl Into<String>,
        instance_store: InstanceStoreSettings,
        blob_store: BlobStoreSettings,
    ) -> Self {
        Self {
            connection,
            hub_name: hub_name.into(),
            max_orchestration_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
            max_activity_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
            max_tracking_delivery_count: DEFAULT_MAX_DELIVERY_COUNT,
            max_queue_size_mb: DEFAULT_MAX_QUEUE_SIZE_MB,
            instance_store,
            blob_store,
        }
    }

    /// Check whether two settings address the same backend target.
    ///
    /// Same contract as
    /// [`StorageEngineSettings::is_same_target`]: the case-insensitive
    /// (task hub, connection) pair, nothing else.
    pub fn is_same_target(&self, other: &BusEngineSettings) -> bool {
        self.hub_name.eq_ignore_ascii_case(&other.hub_name)
            && self.connection.matches(&other.connection)
    }
}
