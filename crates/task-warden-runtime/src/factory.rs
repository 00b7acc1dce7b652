//! The backend factory.
//!
//! [`BackendFactory`] owns the process-lifetime default engine for the
//! single active provider. Construction either fully succeeds or fails;
//! a factory that failed to construct must not be retried with the same
//! inputs expecting a different outcome, since every failure it reports is
//! deterministic and caller-fixable.

use crate::builder::{ClientBinding, SettingsBuilder};
use crate::engine::{BusEngine, EngineHandle, StorageEngine};
use crate::settings::{BusEngineSettings, StorageEngineSettings};
use std::fmt;
use std::sync::Arc;
use task_warden_core::{
    ActiveProvider, BackendConfig, ConfigurationError, ConnectionResolver, ProviderSelector,
    SelectionPolicy,
};
use tracing::{debug, info};

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;

/// Factory for the host-owned default engine and per-request client handles.
///
/// Thread-safe by construction: the default engine is built before the
/// factory is shared, [`engine`](BackendFactory::engine) is read-only, and
/// [`client`](BackendFactory::client) creates no shared mutable state.
pub struct BackendFactory {
    config: BackendConfig,
    resolver: Arc<dyn ConnectionResolver>,
    selector: ProviderSelector,
    default_engine: EngineHandle,
}

impl fmt::Debug for BackendFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendFactory")
            .field("config", &self.config)
            .field("resolver", &"<dyn ConnectionResolver>")
            .field("selector", &self.selector)
            .field("default_engine", &self.default_engine)
            .finish()
    }
}

impl BackendFactory {
    /// Construct the factory and its default engine under the default
    /// selection policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when zero or multiple providers are
    /// configured, the active option block is structurally invalid, or a
    /// required connection does not resolve. Any error leaves no usable
    /// factory behind.
    pub fn new(
        config: BackendConfig,
        resolver: Arc<dyn ConnectionResolver>,
    ) -> Result<Self, ConfigurationError> {
        Self::with_policy(config, resolver, SelectionPolicy::default())
    }

    /// Construct the factory under an explicit selection policy.
    pub fn with_policy(
        config: BackendConfig,
        resolver: Arc<dyn ConnectionResolver>,
        policy: SelectionPolicy,
    ) -> Result<Self, ConfigurationError> {
        let selector = ProviderSelector::new(policy);

        let default_engine = {
            let active = selector.select(&config)?;
            active.validate()?;

            let builder = SettingsBuilder::new(&config.runtime, resolver.as_ref());
            match active {
                ActiveProvider::Storage(options) => {
                    let settings = builder.storage_settings(options, &ClientBinding::new())?;
                    info!(
                        hub_name = %settings.hub_name,
                        provider = %active.kind(),
                        "constructed default orchestration engine"
                    );
                    EngineHandle::Storage(Arc::new(StorageEngine::new(settings)))
                }
                ActiveProvider::Bus(options) => {
                    let settings = builder.bus_settings(options, &ClientBinding::new())?;
                    info!(
                        hub_name = %settings.hub_name,
                        provider = %active.kind(),
                        "constructed default orchestration engine"
                    );
                    EngineHandle::Bus(Arc::new(BusEngine::new(settings)))
                }
            }
        };

        Ok(Self {
            config,
            resolver,
            selector,
            default_engine,
        })
    }

    /// The host-owned default engine.
    ///
    /// Returns the same instance for the lifetime of the factory; cannot
    /// fail once construction succeeded.
    pub fn engine(&self) -> EngineHandle {
        self.default_engine.clone()
    }

    /// Build a client handle for the requested hub/connection target.
    ///
    /// When the request resolves to the same task hub and connection as the
    /// default engine (case-insensitively), the default engine itself is
    /// returned so client sends are observed by the host immediately rather
    /// than on its next poll cycle. Otherwise a fresh engine is constructed
    /// and the caller owns its lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] under the same conditions as settings
    /// building: unresolvable or missing connection names (the bus provider
    /// additionally requires its instance-table and blob connections), or a
    /// missing hub name.
    pub fn client(&self, binding: &ClientBinding) -> Result<EngineHandle, ConfigurationError> {
        let active = self.selector.select(&self.config)?;
        let builder = SettingsBuilder::new(&self.config.runtime, self.resolver.as_ref());

        match active {
            ActiveProvider::Storage(options) => {
                let settings = builder.storage_settings(options, binding)?;
                Ok(self.storage_client(settings))
            }
            ActiveProvider::Bus(options) => {
                let settings = builder.bus_settings(options, binding)?;
                Ok(self.bus_client(settings))
            }
        }
    }

    fn storage_client(&self, settings: StorageEngineSettings) -> EngineHandle {
        if let EngineHandle::Storage(default_engine) = &self.default_engine {
            if settings.is_same_target(default_engine.settings()) {
                debug!(
                    hub_name = %settings.hub_name,
                    "client targets the host engine, reusing shared instance"
                );
                return self.default_engine.clone();
            }
        }

        debug!(
            hub_name = %settings.hub_name,
            "constructing dedicated client engine"
        );
        EngineHandle::Storage(Arc::new(StorageEngine::new(settings)))
    }

    fn bus_client(&self, settings: BusEngineSettings) -> EngineHandle {
        if let EngineHandle::Bus(default_engine) = &self.default_engine {
            if settings.is_same_target(default_engine.settings()) {
                debug!(
                    hub_name = %settings.hub_name,
                    "client targets the host engine, reusing shared instance"
                );
                return self.default_engine.clone();
            }
        }

        debug!(
            hub_name = %settings.hub_name,
            "constructing dedicated client engine"
        );
        EngineHandle::Bus(Arc::new(BusEngine::new(settings)))
    }
}
