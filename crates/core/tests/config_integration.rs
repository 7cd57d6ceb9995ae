//! logsift.toml 통합 설정 테스트
//!
//! - logsift.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use logsift_core::config::LogsiftConfig;
use logsift_core::error::{ConfigError, LogsiftError};
use logsift_core::types::IngestMode;

// =============================================================================
// logsift.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../logsift.toml.example");
    let config = LogsiftConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.server.mode, "tcp");
    assert_eq!(config.server.port, 514);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../logsift.toml.example");
    let config = LogsiftConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_has_correct_sink_defaults() {
    let content = include_str!("../../../logsift.toml.example");
    let config = LogsiftConfig::parse(content).expect("should parse");

    assert_eq!(config.sinks.local.path, "syslog.log");
    assert!(!config.sinks.database.enabled);
    assert_eq!(config.sinks.database.addr, "127.0.0.1");
    assert_eq!(config.sinks.database.port, 3306);
    assert_eq!(config.sinks.database.table, "syslog");
    assert!(config.sinks.forward.addr.is_empty());
    assert!(!config.sinks.forward.dispatch);
}

#[test]
fn example_config_matches_code_defaults() {
    let content = include_str!("../../../logsift.toml.example");
    let example = LogsiftConfig::parse(content).expect("should parse");
    let defaults = LogsiftConfig::default();

    assert_eq!(example.server.bind_addr, defaults.server.bind_addr);
    assert_eq!(example.server.rules_dir, defaults.server.rules_dir);
    assert_eq!(example.server.rules_file, defaults.server.rules_file);
    assert_eq!(
        example.server.max_message_size,
        defaults.server.max_message_size
    );
    assert_eq!(
        example.server.read_timeout_secs,
        defaults.server.read_timeout_secs
    );
    assert_eq!(
        example.server.max_concurrency,
        defaults.server.max_concurrency
    );
    assert_eq!(example.sinks.database.user, defaults.sinks.database.user);
    assert_eq!(example.sinks.forward.port, defaults.sinks.forward.port);
    assert_eq!(example.metrics.port, defaults.metrics.port);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_server_only() {
    let toml = r#"
[server]
mode = "udp"
rules_dir = "/opt/rules"
"#;
    let config = LogsiftConfig::parse(toml).expect("should parse");
    assert_eq!(config.server.ingest_mode().unwrap(), IngestMode::Udp);
    assert_eq!(
        config.server.rules_path(),
        std::path::PathBuf::from("/opt/rules/syslog.rules")
    );
    assert_eq!(config.sinks.local.path, "syslog.log");
}

#[test]
fn partial_config_nested_sink_only() {
    let toml = r#"
[sinks.forward]
addr = "collector.internal"
dispatch = true
"#;
    let config = LogsiftConfig::parse(toml).expect("should parse");
    assert_eq!(config.sinks.forward.addr, "collector.internal");
    assert_eq!(config.sinks.forward.port, 514);
    assert!(config.sinks.forward.dispatch);
    assert!(!config.sinks.database.enabled);
}

#[test]
fn unknown_mode_fails_validation_not_parsing() {
    let toml = r#"
[server]
mode = "quic"
"#;
    let config = LogsiftConfig::parse(toml).expect("should parse");
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        LogsiftError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "server.mode"
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;

    let original = std::env::var("LOGSIFT_GENERAL_LOG_LEVEL").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGSIFT_GENERAL_LOG_LEVEL", "error");
    }

    let mut config = LogsiftConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.general.log_level.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGSIFT_GENERAL_LOG_LEVEL", val),
            None => std::env::remove_var("LOGSIFT_GENERAL_LOG_LEVEL"),
        }
    }

    assert_eq!(result, "error");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let original = std::env::var("LOGSIFT_SERVER_MAX_CONCURRENCY").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGSIFT_SERVER_MAX_CONCURRENCY", "64");
    }

    let mut config = LogsiftConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.server.max_concurrency;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGSIFT_SERVER_MAX_CONCURRENCY", val),
            None => std::env::remove_var("LOGSIFT_SERVER_MAX_CONCURRENCY"),
        }
    }

    assert_eq!(result, 64);
}

#[test]
#[serial_test::serial]
fn env_override_password_is_applied() {
    let original = std::env::var("LOGSIFT_DATABASE_PASSWORD").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGSIFT_DATABASE_PASSWORD", "s3cret");
    }

    let mut config = LogsiftConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.sinks.database.password.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOGSIFT_DATABASE_PASSWORD", val),
            None => std::env::remove_var("LOGSIFT_DATABASE_PASSWORD"),
        }
    }

    assert_eq!(result, "s3cret");
}

#[tokio::test]
#[serial_test::serial]
async fn load_applies_env_then_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logsift.toml");
    tokio::fs::write(&path, "[server]\nmode = \"tcp\"\n")
        .await
        .unwrap();

    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOGSIFT_SERVER_MODE", "bogus");
    }
    let result = LogsiftConfig::load(&path).await;
    // SAFETY: 테스트 정리
    unsafe {
        std::env::remove_var("LOGSIFT_SERVER_MODE");
    }

    assert!(matches!(
        result.unwrap_err(),
        LogsiftError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 에러 케이스
// =============================================================================

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[server]
port = "five-one-four"
"#;
    let result = LogsiftConfig::parse(toml);
    assert!(matches!(
        result.unwrap_err(),
        LogsiftError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[general]
log_level = "debug"

[unknown_section]
foo = "bar"
"#;
    let config = LogsiftConfig::parse(toml).expect("unknown sections are ignored");
    assert_eq!(config.general.log_level, "debug");
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let result = LogsiftConfig::from_file("/tmp/logsift_test_nonexistent_12345.toml").await;
    assert!(matches!(
        result.unwrap_err(),
        LogsiftError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn load_example_config_from_disk() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let example_path = format!("{manifest_dir}/../../logsift.toml.example");

    let config = LogsiftConfig::from_file(&example_path)
        .await
        .expect("example should load");
    config.validate().expect("loaded example should validate");
    assert_eq!(config.general.log_level, "info");
}

// =============================================================================
// 직렬화 라운드트립 테스트
// =============================================================================

#[test]
fn example_config_serialize_roundtrip() {
    let content = include_str!("../../../logsift.toml.example");
    let config = LogsiftConfig::parse(content).expect("should parse");
    let serialized = toml::to_string_pretty(&config).expect("should serialize");
    let reparsed = LogsiftConfig::parse(&serialized).expect("should reparse");
    reparsed.validate().expect("should validate");

    assert_eq!(config.server.mode, reparsed.server.mode);
    assert_eq!(config.sinks.database.table, reparsed.sinks.database.table);
}
