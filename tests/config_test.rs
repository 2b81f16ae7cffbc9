//! Configuration file tests

use std::path::PathBuf;
use tapp_import::config::Config;
use tempfile::tempdir;

/// No config file yet
#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();
    assert_eq!(config, Config::default());
    assert!(config.log_unrecognized_headers);
    assert!(!config.collect_all_missing);
}

/// Saved settings load back unchanged
#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = Config {
        log_unrecognized_headers: false,
        collect_all_missing: true,
        snapshot: Some(PathBuf::from("/data/snapshot.json")),
    };

    config.save_to(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), config);
}

/// Fields missing from the file take their defaults
#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"collect_all_missing": true}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert!(config.collect_all_missing);
    assert!(config.log_unrecognized_headers);
    assert_eq!(config.snapshot, None);

    let options = config.normalize_options();
    assert!(options.collect_all_missing);
}
