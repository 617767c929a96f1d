use crate::config::{LogFormat, LogLevel, LoggingConfig};
use crate::logging::{level_to_log_level, log_level_to_level, parse_log_level, LogError};
use std::sync::Once;
use tempfile::tempdir;

// Use this to ensure init is only called once across all tests
static INIT: Once = Once::new();

#[test]
fn test_init_console_logging() {
    INIT.call_once(|| {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            file: None,
            stdout: true,
        };
        assert!(crate::logging::init(&config).is_ok());
    });

    // A second initialisation is not an error
    let again = LoggingConfig {
        format: LogFormat::Json,
        ..LoggingConfig::default()
    };
    assert!(crate::logging::init(&again).is_ok());
}

#[test]
fn test_file_writer_creates_directories() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("nested").join("eventfeed.log");

    let writer = super::create_non_blocking_file(&log_path);
    assert!(writer.is_ok());
    assert!(log_path.parent().unwrap().exists());
}

#[test]
fn test_level_conversion() {
    assert_eq!(parse_log_level("trace").unwrap(), LogLevel::Trace);
    assert_eq!(parse_log_level("DEBUG").unwrap(), LogLevel::Debug);
    assert!(parse_log_level("info").is_ok());
    assert!(parse_log_level("warn").is_ok());
    assert!(parse_log_level("error").is_ok());
    assert!(matches!(
        parse_log_level("invalid"),
        Err(LogError::InvalidLogLevel(_))
    ));

    for level in [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ] {
        assert_eq!(level_to_log_level(log_level_to_level(level)), level);
    }
}
