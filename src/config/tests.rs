//! Tests for config functionality.

use crate::config::GatewayConfig;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = GatewayConfig::default();

    assert!(config.allowed_roots.is_empty());
    assert!(config.inherit_env);
    assert_eq!(config.default_timeout_ms, 300_000);
    assert_eq!(config.grace_period_ms, 5_000);
    assert_eq!(config.read_chunk_size, 8192);
    assert_eq!(config.channel_capacity, 64);
    assert_eq!(config.max_concurrent, None);
    assert_eq!(config.bind, "127.0.0.1:8700");
}

#[test]
fn test_parse_minimal_yaml() {
    let config = GatewayConfig::from_yaml("").unwrap();

    // Should use all defaults
    assert_eq!(config, GatewayConfig::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
allowed_roots:
  - /srv/app
grace_period_ms: 250
"#;
    let config = GatewayConfig::from_yaml(yaml).unwrap();

    // Specified values should be used
    assert_eq!(config.allowed_roots, vec![PathBuf::from("/srv/app")]);
    assert_eq!(config.grace_period_ms, 250);

    // Unspecified values should use defaults
    assert_eq!(config.default_timeout_ms, 300_000);
    assert_eq!(config.read_chunk_size, 8192);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
allowed_roots:
  - /srv/app
  - /srv/scripts
inherit_env: false
default_timeout_ms: 0
grace_period_ms: 1000
read_chunk_size: 4096
channel_capacity: 8
max_concurrent: 4
bind: 0.0.0.0:9000
"#;
    let config = GatewayConfig::from_yaml(yaml).unwrap();

    assert_eq!(config.allowed_roots.len(), 2);
    assert!(!config.inherit_env);
    assert_eq!(config.default_timeout_ms, 0);
    assert_eq!(config.grace_period_ms, 1000);
    assert_eq!(config.read_chunk_size, 4096);
    assert_eq!(config.channel_capacity, 8);
    assert_eq!(config.max_concurrent, Some(4));
    assert_eq!(config.bind, "0.0.0.0:9000");
    config.validate().unwrap();
}

#[test]
fn test_parse_yaml_with_unknown_fields() {
    let yaml = r#"
allowed_roots: [/srv/app]
future_option: true
nested:
  thing: 1
"#;
    let config = GatewayConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.allowed_roots, vec![PathBuf::from("/srv/app")]);
}

#[test]
fn test_parse_invalid_yaml() {
    let result = GatewayConfig::from_yaml("grace_period_ms: [not, a, number]");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_validate_requires_roots() {
    let err = GatewayConfig::default().validate().unwrap_err();
    assert!(err.to_string().contains("no allowed_roots"));
}

#[test]
fn test_validate_zero_grace_period() {
    let config = GatewayConfig {
        allowed_roots: vec![PathBuf::from("/srv/app")],
        grace_period_ms: 0,
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("grace_period_ms"));
}

#[test]
fn test_validate_zero_chunk_size_and_capacity() {
    let base = GatewayConfig {
        allowed_roots: vec![PathBuf::from("/srv/app")],
        ..Default::default()
    };

    let config = GatewayConfig {
        read_chunk_size: 0,
        ..base.clone()
    };
    assert!(config.validate().unwrap_err().to_string().contains("read_chunk_size"));

    let config = GatewayConfig {
        channel_capacity: 0,
        ..base.clone()
    };
    assert!(config.validate().unwrap_err().to_string().contains("channel_capacity"));

    let config = GatewayConfig {
        max_concurrent: Some(0),
        ..base
    };
    assert!(config.validate().unwrap_err().to_string().contains("max_concurrent"));
}

#[test]
fn test_validate_max_concurrent_above_semaphore_limit() {
    let yaml = "allowed_roots: [/srv/app]\nmax_concurrent: 18446744073709551615\n";
    let config = GatewayConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.max_concurrent, Some(usize::MAX));

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_concurrent"));
    assert!(err.to_string().contains("exceeds the limit"));

    let at_limit = GatewayConfig {
        max_concurrent: Some(tokio::sync::Semaphore::MAX_PERMITS),
        ..config
    };
    at_limit.validate().unwrap();
}

#[test]
fn test_validate_bad_bind() {
    let config = GatewayConfig {
        allowed_roots: vec![PathBuf::from("/srv/app")],
        bind: "localhost".to_string(),
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("not a socket address"));
}

#[test]
fn test_with_extra_roots_deduplicates() {
    let config = GatewayConfig {
        allowed_roots: vec![PathBuf::from("/srv/app")],
        ..Default::default()
    }
    .with_extra_roots(vec![PathBuf::from("/srv/app"), PathBuf::from("/srv/other")]);

    assert_eq!(
        config.allowed_roots,
        vec![PathBuf::from("/srv/app"), PathBuf::from("/srv/other")]
    );
}

#[test]
fn test_yaml_roundtrip() {
    let config = GatewayConfig {
        allowed_roots: vec![PathBuf::from("/srv/app")],
        max_concurrent: Some(2),
        ..Default::default()
    };
    let yaml = config.to_yaml().unwrap();
    let parsed = GatewayConfig::from_yaml(&yaml).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("execgate.yaml");
    std::fs::write(&path, "allowed_roots: [/srv/app]\ndefault_timeout_ms: 1500\n").unwrap();

    let config = GatewayConfig::load(&path).unwrap();
    assert_eq!(config.default_timeout_ms, 1500);
}

#[test]
fn test_discover_explicit_missing_file_errors() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.yaml");

    let err = GatewayConfig::discover(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
#[serial_test::serial]
fn test_discover_uses_local_file_then_defaults() {
    use crate::config::DEFAULT_CONFIG_FILE;
    use crate::test_support::DirGuard;

    let temp_dir = TempDir::new().unwrap();
    let _guard = DirGuard::new(temp_dir.path());

    let config = GatewayConfig::discover(None).unwrap();
    assert_eq!(config, GatewayConfig::default());

    std::fs::write(DEFAULT_CONFIG_FILE, "grace_period_ms: 75\n").unwrap();
    let config = GatewayConfig::discover(None).unwrap();
    assert_eq!(config.grace_period_ms, 75);
}
