use super::*;
use rt_core::Value;

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.preferences");
    let entries = load_preferences(&path).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("profile.preferences");
    let entries = vec![
        ("theme".to_string(), Value::String("dark".to_string())),
        ("volume".to_string(), Value::String("7".to_string())),
    ];

    save_preferences(&path, &entries).unwrap();
    let loaded = load_preferences(&path).unwrap();
    assert_eq!(loaded, entries);
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.preferences");
    std::fs::write(&path, b"\xff\xff\xff\xff").unwrap();
    assert!(load_preferences(&path).is_err());
}
