//! Settings file loading.

use noughts_server::{RELAY_URL_VAR, Settings};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
relay_url = "ws://relay.example:4000/ws"
bind_port = 4000
default_names = ["Ann", "Bob"]
"#
    )
    .unwrap();

    let settings = Settings::from_file(file.path()).unwrap();
    assert_eq!(settings.relay_url(), "ws://relay.example:4000/ws");
    assert_eq!(*settings.bind_port(), 4000);
    assert_eq!(settings.default_names(), &["Ann".to_string(), "Bob".to_string()]);
    assert_eq!(settings.bind_host(), "127.0.0.1");
    assert_eq!(
        settings.invite_link("ab12"),
        "http://127.0.0.1:3000/?game=ab12"
    );
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(*settings.bind_port(), 3000);
    assert_eq!(settings.log_file(), &PathBuf::from("noughts.log"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bind_port = \"not a number\"").unwrap();

    let err = Settings::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_environment_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"relay_url = "ws://from-file/ws""#).unwrap();

    let settings = Settings::from_file(file.path())
        .unwrap()
        .with_overrides(|key| (key == RELAY_URL_VAR).then(|| "ws://from-env/ws".to_string()));
    assert_eq!(settings.relay_url(), "ws://from-env/ws");
}
