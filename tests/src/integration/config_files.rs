//! # Config Files
//!
//! JSON config files for stores and consumers, loaded the way a deployment
//! would load them.

#[cfg(test)]
mod tests {
    use super::super::fixtures::write_json;
    use bl_01_storage_access::{
        ConfigError, FileStoreConfig, NetworkStoreConfig, RocksDbSupplier, DEFAULT_NETWORK_PORT,
    };
    use bl_02_write_consumer::{ConsumerConfig, WriteFailurePolicy};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_missing_keys_error_names_file_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "mysql.json", &json!({ "host": "db", "port": 3306 }));

        let err = NetworkStoreConfig::from_file(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("mysql.json"));
        assert!(message.contains("database"));
        assert!(message.contains("username"));
        assert!(message.contains("password"));
        assert!(!message.contains("\"host\""));
    }

    #[test]
    fn test_network_config_is_never_defaulted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "mysql.json",
            &json!({ "host": "db", "database": "bl", "username": "u", "password": "p" }),
        );
        assert!(matches!(
            NetworkStoreConfig::from_file(&path),
            Err(ConfigError::MissingKeys { ref keys, .. }) if keys == &vec!["port"]
        ));
        // The default port only applies to configs built in code.
        assert_eq!(NetworkStoreConfig::new("db", "bl").port, DEFAULT_NETWORK_PORT);
    }

    #[test]
    fn test_malformed_and_non_object_files() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            FileStoreConfig::from_file(&broken),
            Err(ConfigError::Malformed { .. })
        ));

        let list = write_json(dir.path(), "list.json", &json!(["file"]));
        assert!(matches!(
            FileStoreConfig::from_file(&list),
            Err(ConfigError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RocksDbSupplier::from_config_file(dir.path().join("absent.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_consumer_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "consumer.json",
            &json!({
                "flush_threshold": 256,
                "base_poll_interval_ms": 20,
                "write_failure_policy": "requeue"
            }),
        );

        let raw = std::fs::read_to_string(path).unwrap();
        let config: ConsumerConfig = serde_json::from_str(&raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.flush_threshold, 256);
        assert_eq!(config.base_poll_interval, Duration::from_millis(20));
        assert_eq!(config.idle_cycles_before_reset, 10);
        assert_eq!(config.write_failure_policy, WriteFailurePolicy::Requeue);
    }
}
