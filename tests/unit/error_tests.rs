//! Unit tests for `AppError` display formats and conversions.

use devserve::AppError;

#[test]
fn config_error_display() {
    let err = AppError::Config("bad value".into());
    assert_eq!(err.to_string(), "config: bad value");
}

#[test]
fn no_port_available_display_includes_range() {
    let err = AppError::NoPortAvailable {
        start: 8000,
        count: 100,
    };
    let text = err.to_string();
    assert!(text.contains("8000..8100"), "got: {text}");
    assert!(text.contains("100 probed"), "got: {text}");
}

#[test]
fn no_port_available_display_does_not_overflow_at_max_port() {
    let err = AppError::NoPortAvailable {
        start: u16::MAX,
        count: 10,
    };
    assert!(err.to_string().contains("65535..65545"));
}

#[test]
fn launch_error_display() {
    let err = AppError::Launch("php not found".into());
    assert_eq!(err.to_string(), "launch failed: php not found");
}

#[test]
fn io_error_display_and_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = AppError::from(io);
    assert!(matches!(err, AppError::Io(_)));
    assert!(err.to_string().starts_with("io: "));
}

#[test]
fn implements_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(AppError::Launch("x".into()));
    assert!(!err.to_string().is_empty());
}
