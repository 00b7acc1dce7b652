//! Tests for [`BackendFactory`] construction and instance sharing.

use super::*;
use task_warden_core::{
    BusOptions, ConnectionRole, ProviderKind, StaticConnectionResolver, StorageOptions,
    DEFAULT_CONNECTION_NAME,
};

fn storage_config(hub_name: &str) -> BackendConfig {
    BackendConfig {
        storage: Some(StorageOptions {
            hub_name: Some(hub_name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn bus_config(hub_name: &str) -> BackendConfig {
    BackendConfig {
        bus: Some(BusOptions {
            hub_name: Some(hub_name.to_string()),
            connection_name: Some("bus-primary".to_string()),
            instance_table_connection_name: Some("bus-tables".to_string()),
            blob_connection_name: Some("bus-blobs".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn resolver() -> Arc<StaticConnectionResolver> {
    Arc::new(
        StaticConnectionResolver::new()
            .with(DEFAULT_CONNECTION_NAME, "cs-default")
            .with("other-primary", "cs-other")
            .with("default-alias", "CS-DEFAULT")
            .with("bus-primary", "cs-bus")
            .with("bus-tables", "cs-tables")
            .with("bus-blobs", "cs-blobs"),
    )
}

// ============================================================================
// Construction tests
// ============================================================================

mod construction_tests {
    use super::*;

    /// Verify the storage happy path: the default engine carries the
    /// resolved hub and connection.
    #[test]
    fn test_storage_construction_succeeds() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let engine = factory.engine();
        assert_eq!(engine.provider_kind(), ProviderKind::Storage);
        assert_eq!(engine.hub_name(), "orders");
        assert_eq!(engine.connection().expose(), "cs-default");
    }

    /// Verify the bus happy path.
    #[test]
    fn test_bus_construction_succeeds() {
        let factory =
            BackendFactory::new(bus_config("billing"), resolver()).expect("factory constructs");

        let engine = factory.engine();
        assert_eq!(engine.provider_kind(), ProviderKind::Bus);
        assert_eq!(engine.hub_name(), "billing");
        assert_eq!(engine.connection().expose(), "cs-bus");
    }

    /// Verify that zero configured providers fail construction.
    #[test]
    fn test_no_provider_fails() {
        let error = BackendFactory::new(BackendConfig::default(), resolver()).unwrap_err();
        assert!(
            matches!(error, ConfigurationError::ProviderSelection { found: 0 }),
            "got: {error:?}"
        );
    }

    /// Verify that two configured providers fail construction.
    #[test]
    fn test_two_providers_fail() {
        let config = BackendConfig {
            storage: storage_config("orders").storage,
            bus: bus_config("billing").bus,
            ..Default::default()
        };
        let error = BackendFactory::new(config, resolver()).unwrap_err();
        assert!(
            matches!(error, ConfigurationError::ProviderSelection { found: 2 }),
            "got: {error:?}"
        );
    }

    /// Verify that an unresolvable default connection is fatal at
    /// construction time, not deferred to first use.
    #[test]
    fn test_unresolvable_connection_fails_construction() {
        let empty_resolver = Arc::new(StaticConnectionResolver::new());
        let error = BackendFactory::new(storage_config("orders"), empty_resolver).unwrap_err();
        assert!(
            matches!(&error, ConfigurationError::UnresolvedConnection { role, name }
                if *role == ConnectionRole::Primary && name == DEFAULT_CONNECTION_NAME),
            "got: {error:?}"
        );
    }

    /// Verify that structural validation runs before engine construction.
    #[test]
    fn test_invalid_options_fail_construction() {
        let mut config = storage_config("orders");
        config.storage.as_mut().unwrap().partition_count = Some(0);

        let error = BackendFactory::new(config, resolver()).unwrap_err();
        assert!(
            matches!(error, ConfigurationError::InvalidOption { .. }),
            "got: {error:?}"
        );
    }

    /// Verify that the bus provider's missing auxiliary connections are
    /// fatal at construction time.
    #[test]
    fn test_bus_missing_auxiliary_fails_construction() {
        let mut config = bus_config("billing");
        config.bus.as_mut().unwrap().instance_table_connection_name = None;

        let error = BackendFactory::new(config, resolver()).unwrap_err();
        assert!(
            matches!(
                error,
                ConfigurationError::MissingConnectionName {
                    role: ConnectionRole::InstanceTable,
                    ..
                }
            ),
            "got: {error:?}"
        );
    }

    /// Verify that the AnyPresent policy selects an empty block and then
    /// fails on the missing hub name, still at construction time.
    #[test]
    fn test_any_present_policy_fails_on_missing_hub() {
        let config = BackendConfig {
            storage: Some(StorageOptions::default()),
            ..Default::default()
        };
        let error =
            BackendFactory::with_policy(config, resolver(), SelectionPolicy::AnyPresent)
                .unwrap_err();
        assert!(
            matches!(
                error,
                ConfigurationError::MissingHubName {
                    provider: ProviderKind::Storage
                }
            ),
            "got: {error:?}"
        );
    }
}

// ============================================================================
// Engine accessor tests
// ============================================================================

mod engine_tests {
    use super::*;

    /// Verify that engine() returns the same instance on every call.
    #[test]
    fn test_engine_is_stable() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let first = factory.engine();
        let second = factory.engine();
        assert!(first.shares_instance_with(&second));
    }
}

// ============================================================================
// Client instance-sharing tests
// ============================================================================

mod client_sharing_tests {
    use super::*;

    /// Verify that an empty binding returns the host engine itself.
    #[test]
    fn test_empty_binding_reuses_host_engine() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let client = factory
            .client(&ClientBinding::new())
            .expect("client resolves");
        assert!(client.shares_instance_with(&factory.engine()));
    }

    /// Verify that hub-name comparison for reuse is case-insensitive.
    #[test]
    fn test_hub_case_difference_still_reuses() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let client = factory
            .client(&ClientBinding::new().with_hub_name("ORDERS"))
            .expect("client resolves");
        assert!(client.shares_instance_with(&factory.engine()));
    }

    /// Verify that a differently-named connection resolving to the same
    /// value (under case folding) still reuses the host engine: identity is
    /// value equality on the resolved settings, not on the configuration
    /// shape.
    #[test]
    fn test_equivalent_connection_value_reuses() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let client = factory
            .client(&ClientBinding::new().with_connection_name("default-alias"))
            .expect("client resolves");
        assert!(client.shares_instance_with(&factory.engine()));
    }

    /// Verify that a different hub yields a distinct, caller-owned engine.
    #[test]
    fn test_different_hub_yields_distinct_engine() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let client = factory
            .client(&ClientBinding::new().with_hub_name("reporting"))
            .expect("client resolves");
        assert!(!client.shares_instance_with(&factory.engine()));
        assert_eq!(client.hub_name(), "reporting");
        assert_eq!(client.connection().expose(), "cs-default");
    }

    /// Verify that a different connection yields a distinct engine.
    #[test]
    fn test_different_connection_yields_distinct_engine() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let client = factory
            .client(&ClientBinding::new().with_connection_name("other-primary"))
            .expect("client resolves");
        assert!(!client.shares_instance_with(&factory.engine()));
        assert_eq!(client.connection().expose(), "cs-other");
    }

    /// Verify that two distinct client requests construct independent
    /// engines.
    #[test]
    fn test_distinct_clients_are_independent() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let binding = ClientBinding::new().with_hub_name("reporting");
        let first = factory.client(&binding).expect("client resolves");
        let second = factory.client(&binding).expect("client resolves");
        assert!(!first.shares_instance_with(&second));
    }

    /// Verify the sharing contract for the bus provider.
    #[test]
    fn test_bus_client_sharing() {
        let factory =
            BackendFactory::new(bus_config("billing"), resolver()).expect("factory constructs");

        let shared = factory
            .client(&ClientBinding::new().with_hub_name("Billing"))
            .expect("client resolves");
        assert!(shared.shares_instance_with(&factory.engine()));

        let distinct = factory
            .client(&ClientBinding::new().with_hub_name("audit"))
            .expect("client resolves");
        assert!(!distinct.shares_instance_with(&factory.engine()));
    }
}

// ============================================================================
// Client failure tests
// ============================================================================

mod client_failure_tests {
    use super::*;

    /// Verify that an unresolvable client override fails with the name.
    #[test]
    fn test_unresolvable_override_fails() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let error = factory
            .client(&ClientBinding::new().with_connection_name("nonexistent"))
            .unwrap_err();
        assert!(
            matches!(&error, ConfigurationError::UnresolvedConnection { name, .. }
                if name == "nonexistent"),
            "got: {error:?}"
        );
    }

    /// Verify that a failed client request leaves the factory fully usable.
    #[test]
    fn test_client_failure_does_not_poison_factory() {
        let factory =
            BackendFactory::new(storage_config("orders"), resolver()).expect("factory constructs");

        let _ = factory
            .client(&ClientBinding::new().with_connection_name("nonexistent"))
            .unwrap_err();

        let client = factory
            .client(&ClientBinding::new())
            .expect("factory still serves clients");
        assert!(client.shares_instance_with(&factory.engine()));
    }
}
