//! Engine handle types and backend capability traits.
//!
//! An engine handle is the live, constructed object representing a running
//! or connectable backend for one (task hub, connection) target. This
//! subsystem constructs handles and hands them out; it never invokes their
//! message-dispatch, history, or partition operations. Those belong to the
//! backend implementation behind the handle.

use crate::settings::{BusEngineSettings, StorageEngineSettings};
use std::sync::Arc;
use task_warden_core::{ConnectionString, ProviderKind};

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

// ============================================================================
// Capability traits
// ============================================================================

/// Capability consumed by the host's dispatch loop.
///
/// The host runs exactly one runnable backend: the factory's default engine.
pub trait RunnableBackend: Send + Sync {
    /// Kind of the backend behind this handle.
    fn provider_kind(&self) -> ProviderKind;

    /// Task hub this backend operates.
    fn hub_name(&self) -> &str;
}

/// Capability consumed by external callers issuing orchestration commands.
///
/// A client backend may be the host's own engine (shared instance) or an
/// independent engine for a different hub/connection target.
pub trait ClientBackend: Send + Sync {
    /// Kind of the backend behind this handle.
    fn provider_kind(&self) -> ProviderKind;

    /// Task hub this backend operates against.
    fn hub_name(&self) -> &str;
}

// ============================================================================
// Engines
// ============================================================================

/// Storage-backed engine handle.
#[derive(Debug)]
pub struct StorageEngine {
    settings: StorageEngineSettings,
}

impl StorageEngine {
    /// Construct an engine for the given resolved settings.
    pub fn new(settings: StorageEngineSettings) -> Self {
        Self { settings }
    }

    /// Resolved settings this engine was constructed from.
    pub fn settings(&self) -> &StorageEngineSettings {
        &self.settings
    }
}

impl RunnableBackend for StorageEngine {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Storage
    }

    fn hub_name(&self) -> &str {
        &self.settings.hub_name
    }
}

impl ClientBackend for StorageEngine {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Storage
    }

    fn hub_name(&self) -> &str {
        &self.settings.hub_name
    }
}

/// Bus-backed engine handle.
#[derive(Debug)]
pub struct BusEngine {
    settings: BusEngineSettings,
}

impl BusEngine {
    /// Construct an engine for the given resolved settings.
    pub fn new(settings: BusEngineSettings) -> Self {
        Self { settings }
    }

    /// Resolved settings this engine was constructed from.
    pub fn settings(&self) -> &BusEngineSettings {
        &self.settings
    }
}

impl RunnableBackend for BusEngine {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Bus
    }

    fn hub_name(&self) -> &str {
        &self.settings.hub_name
    }
}

impl ClientBackend for BusEngine {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Bus
    }

    fn hub_name(&self) -> &str {
        &self.settings.hub_name
    }
}

// ============================================================================
// EngineHandle
// ============================================================================

/// Cheap-to-clone handle to a constructed engine.
///
/// Clones share the underlying engine; the factory's instance-sharing
/// contract is expressed through this sharing, and
/// [`shares_instance_with`](EngineHandle::shares_instance_with) makes it
/// observable.
#[derive(Debug, Clone)]
pub enum EngineHandle {
    Storage(Arc<StorageEngine>),
    Bus(Arc<BusEngine>),
}

impl EngineHandle {
    /// Kind of the backend behind this handle.
    pub fn provider_kind(&self) -> ProviderKind {
        match self {
            Self::Storage(_) => ProviderKind::Storage,
            Self::Bus(_) => ProviderKind::Bus,
        }
    }

    /// Task hub this handle operates against.
    pub fn hub_name(&self) -> &str {
        match self {
            Self::Storage(engine) => &engine.settings().hub_name,
            Self::Bus(engine) => &engine.settings().hub_name,
        }
    }

    /// Resolved primary connection of the backend.
    pub fn connection(&self) -> &ConnectionString {
        match self {
            Self::Storage(engine) => &engine.settings().connection,
            Self::Bus(engine) => &engine.settings().connection,
        }
    }

    /// Check whether two handles point at the same live engine instance.
    pub fn shares_instance_with(&self, other: &EngineHandle) -> bool {
        match (self, other) {
            (Self::Storage(a), Self::Storage(b)) => Arc::ptr_eq(a, b),
            (Self::Bus(a), Self::Bus(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// View the handle through the runnable-backend capability.
    pub fn as_runnable(&self) -> Arc<dyn RunnableBackend> {
        match self {
            Self::Storage(engine) => engine.clone(),
            Self::Bus(engine) => engine.clone(),
        }
    }

    /// View the handle through the client-operable capability.
    pub fn as_client(&self) -> Arc<dyn ClientBackend> {
        match self {
            Self::Storage(engine) => engine.clone(),
            Self::Bus(engine) => engine.clone(),
        }
    }
}
