//! Logger initialization when another `log` backend owns the facade

mod common;

use nexus::sys::{Logger, LoggerConfig, LoggerErrorCode};

#[test]
fn test_foreign_backend_leaves_log_file_untouched() {
    common::install();
    let directory = std::env::temp_dir().join(format!("nexus-foreign-{}", std::process::id()));
    std::fs::create_dir_all(&directory).unwrap();
    let path = directory.join("previous.log");
    std::fs::write(&path, "previous run contents\n").unwrap();

    let error = Logger::init("forge", &path).unwrap_err();

    assert!(error.is(LoggerErrorCode::BackendAlreadySet));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run contents\n");
    assert!(!Logger::is_initialized());

    let appending = LoggerConfig::new("forge", &path).with_append(true);
    let error = Logger::init_with(&appending).unwrap_err();
    assert!(error.is(LoggerErrorCode::BackendAlreadySet));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run contents\n");
}
