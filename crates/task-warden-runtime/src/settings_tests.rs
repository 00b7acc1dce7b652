//! Tests for the engine-settings value objects.

use super::*;

fn storage_settings(hub_name: &str, connection: &str) -> StorageEngineSettings {
    StorageEngineSettings::new(ConnectionString::new(connection), hub_name)
}

fn bus_settings(hub_name: &str, connection: &str) -> BusEngineSettings {
    BusEngineSettings::new(
        ConnectionString::new(connection),
        hub_name,
        InstanceStoreSettings {
            connection: ConnectionString::new("table-cs"),
        },
        BlobStoreSettings {
            connection: ConnectionString::new("blob-cs"),
        },
    )
}

// ============================================================================
// Backend default tests
// ============================================================================

mod default_tests {
    use super::*;

    /// Verify the storage backend's tuning defaults.
    #[test]
    fn test_storage_defaults() {
        let settings = storage_settings("orders", "cs1");

        assert_eq!(settings.partition_count, 4);
        assert_eq!(settings.control_queue_batch_size, 32);
        assert_eq!(
            settings.control_queue_visibility_timeout,
            Duration::from_secs(300)
        );
        assert_eq!(
            settings.work_item_queue_visibility_timeout,
            Duration::from_secs(300)
        );
        assert_eq!(settings.max_queue_polling_interval, Duration::from_secs(30));
        assert!(!settings.extended_sessions_enabled);
        assert!(settings.tracking_store.is_none());
    }

    /// Verify the bus backend's tuning defaults.
    #[test]
    fn test_bus_defaults() {
        let settings = bus_settings("billing", "bus-cs");

        assert_eq!(settings.max_orchestration_delivery_count, 5);
        assert_eq!(settings.max_activity_delivery_count, 5);
        assert_eq!(settings.max_tracking_delivery_count, 5);
        assert_eq!(settings.max_queue_size_mb, 1024);
    }

    /// Verify that tracking-store settings default their table-name prefix.
    #[test]
    fn test_tracking_store_default_prefix() {
        let store = TrackingStoreSettings::new(ConnectionString::new("track-cs"));
        assert_eq!(store.name_prefix, "TrackingStore");
    }
}

// ============================================================================
// Target-identity tests
// ============================================================================

mod target_identity_tests {
    use super::*;

    /// Verify that equal hub and connection mean the same target.
    #[test]
    fn test_equal_pair_is_same_target() {
        let a = storage_settings("orders", "cs1");
        let b = storage_settings("orders", "cs1");
        assert!(a.is_same_target(&b));
    }

    /// Verify that hub and connection compare case-insensitively.
    #[test]
    fn test_identity_is_case_insensitive() {
        let a = storage_settings("orders", "Account=One");
        let b = storage_settings("ORDERS", "account=one");
        assert!(a.is_same_target(&b));
    }

    /// Verify that a different hub is a different target.
    #[test]
    fn test_different_hub_is_different_target() {
        let a = storage_settings("orders", "cs1");
        let b = storage_settings("billing", "cs1");
        assert!(!a.is_same_target(&b));
    }

    /// Verify that a different connection is a different target.
    #[test]
    fn test_different_connection_is_different_target() {
        let a = storage_settings("orders", "cs1");
        let b = storage_settings("orders", "cs2");
        assert!(!a.is_same_target(&b));
    }

    /// Verify that tuning fields do not participate in target identity.
    #[test]
    fn test_tuning_fields_do_not_affect_identity() {
        let a = storage_settings("orders", "cs1");
        let mut b = storage_settings("orders", "cs1");
        b.partition_count = 16;
        b.extended_sessions_enabled = true;
        assert!(a.is_same_target(&b));
    }

    /// Verify the same contract on bus settings.
    #[test]
    fn test_bus_identity_contract() {
        let a = bus_settings("billing", "bus-cs");
        let b = bus_settings("Billing", "BUS-CS");
        let c = bus_settings("billing", "other-cs");
        assert!(a.is_same_target(&b));
        assert!(!a.is_same_target(&c));
    }
}

// ============================================================================
// Redaction tests
// ============================================================================

mod redaction_tests {
    use super::*;

    /// Verify that settings Debug output never leaks connection values.
    #[test]
    fn test_settings_debug_redacts_connections() {
        let mut settings = storage_settings("orders", "AccountKey=secret123");
        settings.tracking_store = Some(TrackingStoreSettings::new(ConnectionString::new(
            "TrackingKey=secret456",
        )));

        let debug_output = format!("{:?}", settings);
        assert!(!debug_output.contains("secret123"), "{debug_output}");
        assert!(!debug_output.contains("secret456"), "{debug_output}");
        assert!(debug_output.contains("orders"));
    }
}
