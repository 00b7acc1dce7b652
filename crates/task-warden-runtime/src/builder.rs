//! Connection/hub resolution and settings construction.
//!
//! The builder turns an option block plus the global runtime options into a
//! fully resolved settings value, consulting the host's
//! [`ConnectionResolver`] for every connection-bearing field.
//!
//! Every primary connection resolves through the same three-tier fallback:
//! request override, then the per-provider `connection_name`, then the
//! [`DEFAULT_CONNECTION_NAME`] convention. Auxiliary connections
//! (tracking store, instance table, blob store) resolve independently and
//! fail independently, each error naming its role.

use crate::settings::{
    BlobStoreSettings, BusEngineSettings, InstanceStoreSettings, StorageEngineSettings,
    TrackingStoreSettings,
};
use std::time::Duration;
use task_warden_core::{
    BusOptions, ConfigurationError, ConnectionResolver, ConnectionRole, ConnectionString,
    ProviderKind, RuntimeOptions, StorageOptions, DEFAULT_CONNECTION_NAME,
};

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;

// ============================================================================
// ClientBinding
// ============================================================================

/// Per-request overrides a client supplies when asking for a backend handle.
///
/// Both fields are optional; an empty binding targets the host's own hub and
/// connection.
#[derive(Debug, Clone, Default)]
pub struct ClientBinding {
    /// Task hub to operate against; wins over the configured hub name.
    pub hub_name: Option<String>,

    /// Symbolic connection name to resolve; wins over the configured name
    /// and the convention fallback.
    pub connection_name: Option<String>,
}

impl ClientBinding {
    /// Binding that targets the host's own hub and connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the task-hub override.
    pub fn with_hub_name(mut self, hub_name: impl Into<String>) -> Self {
        self.hub_name = Some(hub_name.into());
        self
    }

    /// Set the connection-name override.
    pub fn with_connection_name(mut self, connection_name: impl Into<String>) -> Self {
        self.connection_name = Some(connection_name.into());
        self
    }
}

// ============================================================================
// SettingsBuilder
// ============================================================================

/// Builds resolved engine settings for either provider kind.
///
/// Stateless apart from the borrowed runtime options and resolver; building
/// is a pure function of its inputs and the resolver's contents.
pub struct SettingsBuilder<'a> {
    runtime: &'a RuntimeOptions,
    resolver: &'a dyn ConnectionResolver,
}

impl<'a> SettingsBuilder<'a> {
    /// Create a builder over the host's runtime options and resolver.
    pub fn new(runtime: &'a RuntimeOptions, resolver: &'a dyn ConnectionResolver) -> Self {
        Self { runtime, resolver }
    }

    /// Build storage-backed engine settings.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::UnresolvedConnection`] when the primary
    ///   connection name (or a configured tracking-store name) does not
    ///   resolve to a non-empty value.
    /// - [`ConfigurationError::MissingHubName`] when neither the binding nor
    ///   the options name a task hub.
    pub fn storage_settings(
        &self,
        options: &StorageOptions,
        binding: &ClientBinding,
    ) -> Result<StorageEngineSettings, ConfigurationError> {
        let connection = self.resolve_primary(
            binding.connection_name.as_deref(),
            options.connection_name.as_deref(),
        )?;
        let hub_name =
            effective_hub_name(ProviderKind::Storage, binding, options.hub_name.as_deref())?;

        let mut settings = StorageEngineSettings::new(connection, hub_name);

        if let Some(count) = options.partition_count {
            settings.partition_count = count;
        }
        if let Some(batch_size) = options.control_queue_batch_size {
            settings.control_queue_batch_size = batch_size;
        }
        if let Some(secs) = options.control_queue_visibility_timeout_secs {
            settings.control_queue_visibility_timeout = non_negative_duration(secs);
        }
        if let Some(secs) = options.work_item_queue_visibility_timeout_secs {
            settings.work_item_queue_visibility_timeout = non_negative_duration(secs);
        }
        if let Some(secs) = options.max_queue_polling_interval_secs {
            settings.max_queue_polling_interval = non_negative_duration(secs);
        }

        settings.max_concurrent_orchestrations = self.runtime.max_concurrent_orchestrations;
        settings.max_concurrent_activities = self.runtime.max_concurrent_activities;
        settings.extended_sessions_enabled = self.runtime.extended_sessions_enabled;
        settings.extended_session_idle_timeout =
            non_negative_duration(self.runtime.extended_session_idle_timeout_secs);

        if let Some(name) = options.tracking_store_connection_name.as_deref() {
            let connection = self.resolve(ConnectionRole::TrackingStore, name)?;
            let mut store = TrackingStoreSettings::new(connection);
            if let Some(prefix) = options.tracking_store_name_prefix.as_deref() {
                if !prefix.is_empty() {
                    store.name_prefix = prefix.to_string();
                }
            }
            settings.tracking_store = Some(store);
        }

        Ok(settings)
    }

    /// Build bus-backed engine settings.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingConnectionName`] when the
    ///   instance-table or blob connection has no configured name.
    /// - [`ConfigurationError::UnresolvedConnection`] when any named
    ///   connection does not resolve to a non-empty value.
    /// - [`ConfigurationError::MissingHubName`] when neither the binding nor
    ///   the options name a task hub.
    pub fn bus_settings(
        &self,
        options: &BusOptions,
        binding: &ClientBinding,
    ) -> Result<BusEngineSettings, ConfigurationError> {
        let connection = self.resolve_primary(
            binding.connection_name.as_deref(),
            options.connection_name.as_deref(),
        )?;
        let hub_name = effective_hub_name(ProviderKind::Bus, binding, options.hub_name.as_deref())?;

        let instance_store = InstanceStoreSettings {
            connection: self.resolve_required_auxiliary(
                ConnectionRole::InstanceTable,
                options.instance_table_connection_name.as_deref(),
            )?,
        };
        let blob_store = BlobStoreSettings {
            connection: self.resolve_required_auxiliary(
                ConnectionRole::BlobStore,
                options.blob_connection_name.as_deref(),
            )?,
        };

        let mut settings = BusEngineSettings::new(connection, hub_name, instance_store, blob_store);

        if let Some(count) = options.max_orchestration_delivery_count {
            settings.max_orchestration_delivery_count = count;
        }
        if let Some(count) = options.max_activity_delivery_count {
            settings.max_activity_delivery_count = count;
        }
        if let Some(count) = options.max_tracking_delivery_count {
            settings.max_tracking_delivery_count = count;
        }
        if let Some(size) = options.max_queue_size_mb {
            settings.max_queue_size_mb = size;
        }

        Ok(settings)
    }

    /// Resolve the primary connection through the canonical three-tier
    /// fallback: override, per-provider name, convention.
    fn resolve_primary(
        &self,
        override_name: Option<&str>,
        configured_name: Option<&str>,
    ) -> Result<ConnectionString, ConfigurationError> {
        let name = override_name
            .or(configured_name)
            .unwrap_or(DEFAULT_CONNECTION_NAME);
        self.resolve(ConnectionRole::Primary, name)
    }

    /// Resolve an auxiliary connection that must be configured.
    fn resolve_required_auxiliary(
        &self,
        role: ConnectionRole,
        configured_name: Option<&str>,
    ) -> Result<ConnectionString, ConfigurationError> {
        let name = configured_name.ok_or(ConfigurationError::MissingConnectionName {
            provider: ProviderKind::Bus,
            role,
        })?;
        self.resolve(role, name)
    }

    /// Resolve one symbolic name, treating an empty value as unresolved.
    fn resolve(
        &self,
        role: ConnectionRole,
        name: &str,
    ) -> Result<ConnectionString, ConfigurationError> {
        match self.resolver.resolve(name) {
            Some(connection) if !connection.is_empty() => Ok(connection),
            _ => Err(ConfigurationError::UnresolvedConnection {
                role,
                name: name.to_string(),
            }),
        }
    }
}

/// Effective task-hub name: request override wins over configuration.
///
/// There is no convention fallback at the hub layer; hosts that want one
/// apply it before the options reach this builder.
fn effective_hub_name(
    provider: ProviderKind,
    binding: &ClientBinding,
    configured: Option<&str>,
) -> Result<String, ConfigurationError> {
    binding
        .hub_name
        .as_deref()
        .or(configured)
        .map(str::to_string)
        .ok_or(ConfigurationError::MissingHubName { provider })
}

/// Clamp a seconds value to non-negative and convert it to a duration.
///
/// Negative input is a guardrail case, not an error: it becomes zero.
fn non_negative_duration(secs: i64) -> Duration {
    Duration::from_secs(secs.max(0) as u64)
}
