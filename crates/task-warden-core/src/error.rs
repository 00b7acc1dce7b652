//! Error types for configuration and provider selection.

use crate::options::ProviderKind;
use std::fmt;
use thiserror::Error;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

/// Role a resolved connection plays for a backend provider.
///
/// Used in error messages so that a failed resolution names the exact
/// connection the operator has to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionRole {
    /// Primary storage/transport connection of the provider.
    Primary,
    /// Optional tracking store of the storage-backed provider.
    TrackingStore,
    /// Instance table of the bus-backed provider.
    InstanceTable,
    /// Blob store of the bus-backed provider.
    BlobStore,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primary => "primary",
            Self::TrackingStore => "tracking-store",
            Self::InstanceTable => "instance-table",
            Self::BlobStore => "blob",
        };
        f.write_str(name)
    }
}

/// Errors raised while resolving configuration into engine settings.
///
/// All variants are deterministic and caller-fixable: they are raised
/// synchronously at the earliest point the missing information is needed and
/// are never retried internally.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Zero or more than one provider block counted as configured.
    #[error("exactly one backend provider must be configured, found {found}")]
    ProviderSelection { found: usize },

    /// A connection name was supplied or derived but the resolver returned
    /// nothing (or an empty value) for it.
    #[error("unable to resolve the {role} connection named '{name}'")]
    UnresolvedConnection { role: ConnectionRole, name: String },

    /// A connection the provider requires has no configured name at all.
    #[error("the {provider} provider has no {role} connection name configured")]
    MissingConnectionName {
        provider: ProviderKind,
        role: ConnectionRole,
    },

    /// Neither the request override nor the provider options carry a task
    /// hub name.
    #[error("no task hub name was configured or supplied for the {provider} provider")]
    MissingHubName { provider: ProviderKind },

    /// A provider option field is structurally invalid.
    #[error("invalid value for '{field}': {reason}")]
    InvalidOption { field: String, reason: String },

    /// The configuration document could not be parsed.
    #[error("failed to parse backend configuration: {message}")]
    Parse { message: String },
}

/// Error returned when a configured provider kind matches no known backend.
///
/// Indicates a configuration/extension mismatch (for example a typo in a
/// provider table name, or configuration written for a newer build). Always
/// fatal; there is nothing to retry.
#[derive(Debug, Error)]
#[error("'{kind}' is not a supported backend provider")]
pub struct UnsupportedProviderError {
    /// The provider kind exactly as it appeared in configuration.
    pub kind: String,
}
