//! Connection strings and the resolver capability.
//!
//! Backend configuration refers to connections by symbolic name; the host
//! supplies a [`ConnectionResolver`] that maps those names to live values at
//! settings-build time. The resolver is an opaque, externally owned
//! capability: it may read process settings, a secret store, or anything
//! else, as long as lookups complete synchronously.

use std::{collections::HashMap, fmt};

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;

/// Connection name used when neither a request override nor the provider
/// options name one.
///
/// Hosts that follow the convention only have to register a single
/// connection under this name to cover every primary-connection lookup.
pub const DEFAULT_CONNECTION_NAME: &str = "default-storage";

// ============================================================================
// ConnectionString
// ============================================================================

/// Resolved connection value.
///
/// Holds the live connection string or secret a provider connects with.
/// The value never appears in `Debug` output or logs; the buffer is cleared
/// when the value is dropped.
#[derive(Clone)]
pub struct ConnectionString {
    inner: String,
}

impl ConnectionString {
    /// Wrap a resolved connection value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Get the connection value (only for immediate use when connecting).
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Check whether the resolved value is empty.
    ///
    /// Resolvers that distinguish "unknown name" from "known but blank" can
    /// return either; callers treat both as unresolved.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the value length without exposing content.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Compare two connection values for backend-target identity.
    ///
    /// Comparison is case-insensitive: two configurations that resolve to
    /// the same connection under case folding address the same backend.
    pub fn matches(&self, other: &ConnectionString) -> bool {
        self.inner.eq_ignore_ascii_case(&other.inner)
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl From<String> for ConnectionString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ConnectionString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// Clear the buffer before deallocation
impl Drop for ConnectionString {
    fn drop(&mut self) {
        self.inner.clear();
    }
}

// ============================================================================
// ConnectionResolver
// ============================================================================

/// Interface for resolving symbolic connection names.
///
/// Supplied by the host at factory-construction time. Implementations decide
/// where connection values come from; this subsystem only asks for them by
/// name and fails fast when a required name does not resolve.
pub trait ConnectionResolver: Send + Sync {
    /// Resolve a symbolic connection name to a live connection value.
    ///
    /// Returns `None` when the name is unknown. Returning an empty value is
    /// treated the same as `None` by every caller in this workspace.
    fn resolve(&self, name: &str) -> Option<ConnectionString>;
}

// ============================================================================
// StaticConnectionResolver
// ============================================================================

/// In-memory resolver backed by a name → value map.
///
/// Intended for hosts that already materialized their connections (and for
/// tests). Lookups are exact-match on the symbolic name.
#[derive(Default)]
pub struct StaticConnectionResolver {
    connections: HashMap<String, String>,
}

impl StaticConnectionResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, replacing any previous value under the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.connections.insert(name.into(), value.into());
    }

    /// Builder-style registration for test and host setup code.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }
}

impl ConnectionResolver for StaticConnectionResolver {
    fn resolve(&self, name: &str) -> Option<ConnectionString> {
        self.connections
            .get(name)
            .map(|value| ConnectionString::new(value.clone()))
    }
}

// ============================================================================
// EnvConnectionResolver
// ============================================================================

/// Resolver that reads connection values from environment variables.
///
/// A symbolic name is mangled into a variable name by upper-casing it and
/// replacing `-` with `_`, then prefixing it: with prefix `WARDEN_CONN_`,
/// the name `default-storage` reads `WARDEN_CONN_DEFAULT_STORAGE`.
pub struct EnvConnectionResolver {
    prefix: String,
}

impl EnvConnectionResolver {
    /// Conventional prefix used by [`EnvConnectionResolver::default`].
    pub const DEFAULT_PREFIX: &'static str = "WARDEN_CONN_";

    /// Create a resolver with a custom variable prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Environment variable name a symbolic connection name maps to.
    pub fn variable_name(&self, name: &str) -> String {
        let mangled: String = name
            .chars()
            .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() })
            .collect();
        format!("{}{}", self.prefix, mangled)
    }
}

impl Default for EnvConnectionResolver {
    fn default() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }
}

impl ConnectionResolver for EnvConnectionResolver {
    fn resolve(&self, name: &str) -> Option<ConnectionString> {
        std::env::var(self.variable_name(name))
            .ok()
            .map(ConnectionString::new)
    }
}
