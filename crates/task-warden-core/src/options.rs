//! Provider option blocks, the configuration root, and provider selection.
//!
//! A [`BackendConfig`] carries at most one option block per supported backend
//! kind. Exactly one block must count as "configured"; the
//! [`ProviderSelector`] enforces that invariant and memoizes the decision for
//! the lifetime of the selector.
//!
//! ## Configuration Structure
//!
//! ```toml
//! [runtime]
//! max_concurrent_orchestrations = 20
//!
//! [storage]
//! hub_name = "orders"
//! connection_name = "orders-storage"
//! partition_count = 8
//! ```
//!
//! Tuning fields are all optional: a field is copied into the engine
//! settings only when present, and the backend's own defaults apply
//! otherwise.

use crate::error::{ConfigurationError, UnsupportedProviderError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::OnceLock};
use tracing::debug;

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;

// ============================================================================
// ProviderKind
// ============================================================================

/// Enumeration of supported backend providers.
///
/// This is a closed set: the selector and the settings builder both match on
/// it exhaustively, so adding a kind forces every dispatch site to be
/// updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Durable-storage-backed provider (partitioned control queues over a
    /// storage account).
    Storage,
    /// Message-bus-backed provider (broker queues plus instance-table and
    /// blob auxiliary stores).
    Bus,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Storage => "storage",
            Self::Bus => "bus",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = UnsupportedProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "storage" => Ok(Self::Storage),
            "bus" => Ok(Self::Bus),
            _ => Err(UnsupportedProviderError {
                kind: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Provider option blocks
// ============================================================================

/// Options for the durable-storage-backed provider.
///
/// Every tuning field is optional; absent fields fall back to the backend's
/// own defaults at settings-build time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    /// Symbolic name of the primary connection. Falls back to
    /// [`DEFAULT_CONNECTION_NAME`](crate::connection::DEFAULT_CONNECTION_NAME)
    /// when absent.
    pub connection_name: Option<String>,

    /// Logical task-hub identifier. Required for the block to count as
    /// configured under [`SelectionPolicy::RequireHubName`].
    pub hub_name: Option<String>,

    /// Number of control-queue partitions (1..=16).
    pub partition_count: Option<u16>,

    /// Messages fetched per control-queue poll.
    pub control_queue_batch_size: Option<u32>,

    /// Control-queue message visibility timeout, in seconds. Negative input
    /// is clamped to zero at settings-build time.
    pub control_queue_visibility_timeout_secs: Option<i64>,

    /// Work-item-queue message visibility timeout, in seconds. Negative
    /// input is clamped to zero at settings-build time.
    pub work_item_queue_visibility_timeout_secs: Option<i64>,

    /// Upper bound for the queue polling backoff, in seconds.
    pub max_queue_polling_interval_secs: Option<i64>,

    /// Symbolic name of the optional tracking-store connection. Resolved
    /// only when present; a present-but-unresolvable name is an error.
    pub tracking_store_connection_name: Option<String>,

    /// Prefix applied to tracking-store table names. Applied only when
    /// non-empty.
    pub tracking_store_name_prefix: Option<String>,
}

impl StorageOptions {
    /// Validate the block structurally.
    ///
    /// Idempotent and side-effect-free. Timeout fields are deliberately not
    /// validated here: negative values are sanitized, not rejected.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(hub_name) = &self.hub_name {
            validate_hub_name("storage.hub_name", hub_name)?;
        }

        if let Some(count) = self.partition_count {
            if count == 0 || count > 16 {
                return Err(ConfigurationError::InvalidOption {
                    field: "storage.partition_count".to_string(),
                    reason: "must be between 1 and 16".to_string(),
                });
            }
        }

        if self.control_queue_batch_size == Some(0) {
            return Err(ConfigurationError::InvalidOption {
                field: "storage.control_queue_batch_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Options for the message-bus-backed provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusOptions {
    /// Symbolic name of the primary broker connection. Falls back to
    /// [`DEFAULT_CONNECTION_NAME`](crate::connection::DEFAULT_CONNECTION_NAME)
    /// when absent.
    pub connection_name: Option<String>,

    /// Logical task-hub identifier. Required for the block to count as
    /// configured under [`SelectionPolicy::RequireHubName`].
    pub hub_name: Option<String>,

    /// Delivery attempts for an orchestration message before giving up.
    pub max_orchestration_delivery_count: Option<u32>,

    /// Delivery attempts for an activity message before giving up.
    pub max_activity_delivery_count: Option<u32>,

    /// Delivery attempts for a tracking message before giving up.
    pub max_tracking_delivery_count: Option<u32>,

    /// Maximum broker queue size, in megabytes.
    pub max_queue_size_mb: Option<u64>,

    /// Symbolic name of the instance-table connection. Required at
    /// settings-build time.
    pub instance_table_connection_name: Option<String>,

    /// Symbolic name of the blob-store connection. Required at
    /// settings-build time.
    pub blob_connection_name: Option<String>,
}

impl BusOptions {
    /// Validate the block structurally.
    ///
    /// Idempotent and side-effect-free. The instance-table and blob
    /// connection names are checked at settings-build time, where their
    /// absence can be reported per role.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(hub_name) = &self.hub_name {
            validate_hub_name("bus.hub_name", hub_name)?;
        }

        for (field, value) in [
            (
                "bus.max_orchestration_delivery_count",
                self.max_orchestration_delivery_count,
            ),
            (
                "bus.max_activity_delivery_count",
                self.max_activity_delivery_count,
            ),
            (
                "bus.max_tracking_delivery_count",
                self.max_tracking_delivery_count,
            ),
        ] {
            if value == Some(0) {
                return Err(ConfigurationError::InvalidOption {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if self.max_queue_size_mb == Some(0) {
            return Err(ConfigurationError::InvalidOption {
                field: "bus.max_queue_size_mb".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Validate a task-hub identifier.
///
/// Hub names become part of queue, table, and blob-container names on every
/// backend, so the charset is the intersection the backends accept: ASCII
/// alphanumeric, starting with a letter.
fn validate_hub_name(field: &str, hub_name: &str) -> Result<(), ConfigurationError> {
    let starts_with_letter = hub_name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic());

    if !starts_with_letter || !hub_name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigurationError::InvalidOption {
            field: field.to_string(),
            reason: "task hub names must be alphanumeric and start with a letter".to_string(),
        });
    }

    Ok(())
}

// ============================================================================
// RuntimeOptions
// ============================================================================

/// Global tuning shared by every provider kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Orchestration work items processed concurrently by the host.
    pub max_concurrent_orchestrations: u32,

    /// Activity work items processed concurrently by the host.
    pub max_concurrent_activities: u32,

    /// Keep orchestration sessions resident between messages.
    pub extended_sessions_enabled: bool,

    /// Idle time before an extended session is unloaded, in seconds.
    /// Negative input is clamped to zero at settings-build time.
    pub extended_session_idle_timeout_secs: i64,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_concurrent_orchestrations: 10,
            max_concurrent_activities: 10,
            extended_sessions_enabled: false,
            extended_session_idle_timeout_secs: 30,
        }
    }
}

// ============================================================================
// BackendConfig
// ============================================================================

/// Configuration root for the orchestration backend.
///
/// Holds at most one option block per provider kind plus the global runtime
/// tuning. Exactly one block must count as configured (see
/// [`ProviderSelector`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Durable-storage-backed provider block.
    pub storage: Option<StorageOptions>,

    /// Message-bus-backed provider block.
    pub bus: Option<BusOptions>,

    /// Global runtime tuning.
    pub runtime: RuntimeOptions,
}

impl BackendConfig {
    /// Parse a configuration document from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] when the document is not valid
    /// TOML or does not match the configuration shape.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(document).map_err(|e| ConfigurationError::Parse {
            message: e.to_string(),
        })
    }

    /// Validate the configuration under a selection policy.
    ///
    /// Selects the active provider (enforcing the exactly-one invariant) and
    /// validates its option block structurally.
    pub fn validate(&self, policy: SelectionPolicy) -> Result<(), ConfigurationError> {
        ProviderSelector::new(policy).select(self)?.validate()
    }
}

// ============================================================================
// Provider selection
// ============================================================================

/// The option block selected as the single active provider.
///
/// Borrowed from the [`BackendConfig`] it was selected from.
#[derive(Debug, Clone, Copy)]
pub enum ActiveProvider<'a> {
    Storage(&'a StorageOptions),
    Bus(&'a BusOptions),
}

impl ActiveProvider<'_> {
    /// Kind of the active provider.
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Storage(_) => ProviderKind::Storage,
            Self::Bus(_) => ProviderKind::Bus,
        }
    }

    /// Configured task-hub name, when present.
    pub fn hub_name(&self) -> Option<&str> {
        match self {
            Self::Storage(options) => options.hub_name.as_deref(),
            Self::Bus(options) => options.hub_name.as_deref(),
        }
    }

    /// Configured primary-connection name, when present.
    pub fn connection_name(&self) -> Option<&str> {
        match self {
            Self::Storage(options) => options.connection_name.as_deref(),
            Self::Bus(options) => options.connection_name.as_deref(),
        }
    }

    /// Validate the active option block structurally.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::Storage(options) => options.validate(),
            Self::Bus(options) => options.validate(),
        }
    }
}

/// Policy deciding when a provider block counts as "configured".
///
/// Which policy is right depends on the host's configuration-loading
/// contract. Loaders built on `#[serde(default)]` (including
/// [`BackendConfig::from_toml_str`]) materialize an empty `[storage]` table
/// as a present-but-empty block, so presence alone is too weak a signal for
/// them; [`SelectionPolicy::RequireHubName`] is the default. Hosts whose
/// loaders never produce empty blocks can opt into
/// [`SelectionPolicy::AnyPresent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// A block is configured when it is present and names a task hub.
    #[default]
    RequireHubName,
    /// A block is configured whenever it is present.
    AnyPresent,
}

/// Selects the single active provider from a [`BackendConfig`].
///
/// The successful decision is memoized in a compute-once cell: selection is
/// a pure function of the (immutable) configuration, so concurrent
/// first-call races at worst recompute the same value and the overwrite is
/// idempotent. Failures are not cached; they are deterministic and cheap to
/// recompute.
#[derive(Debug)]
pub struct ProviderSelector {
    policy: SelectionPolicy,
    selected: OnceLock<ProviderKind>,
}

impl ProviderSelector {
    /// Create a selector with the given policy.
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            selected: OnceLock::new(),
        }
    }

    /// Policy this selector applies.
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Determine the single active provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ProviderSelection`] when zero or more
    /// than one block counts as configured under the selector's policy.
    pub fn select<'a>(
        &self,
        config: &'a BackendConfig,
    ) -> Result<ActiveProvider<'a>, ConfigurationError> {
        if let Some(kind) = self.selected.get() {
            return Self::active_for(*kind, config);
        }

        let mut found = 0;
        let mut selected = None;

        if let Some(options) = &config.storage {
            if self.counts_as_configured(options.hub_name.as_deref()) {
                found += 1;
                selected.get_or_insert(ProviderKind::Storage);
            }
        }

        if let Some(options) = &config.bus {
            if self.counts_as_configured(options.hub_name.as_deref()) {
                found += 1;
                selected.get_or_insert(ProviderKind::Bus);
            }
        }

        let kind = match (found, selected) {
            (1, Some(kind)) => kind,
            _ => return Err(ConfigurationError::ProviderSelection { found }),
        };

        debug!(provider = %kind, "selected active backend provider");
        let _ = self.selected.set(kind);

        Self::active_for(kind, config)
    }

    fn counts_as_configured(&self, hub_name: Option<&str>) -> bool {
        match self.policy {
            SelectionPolicy::AnyPresent => true,
            SelectionPolicy::RequireHubName => hub_name.is_some(),
        }
    }

    fn active_for(
        kind: ProviderKind,
        config: &BackendConfig,
    ) -> Result<ActiveProvider<'_>, ConfigurationError> {
        let active = match kind {
            ProviderKind::Storage => config.storage.as_ref().map(ActiveProvider::Storage),
            ProviderKind::Bus => config.bus.as_ref().map(ActiveProvider::Bus),
        };
        active.ok_or(ConfigurationError::ProviderSelection { found: 0 })
    }
}
