use std::fs;
use std::path::PathBuf;

use taskboard::config::{Config, StorageBackend, CONFIG_FILE};
use taskboard::error::{exit_codes, Error};

#[test]
fn load_from_dir_defaults_when_file_missing() {
    let dir = tempfile::tempdir().expect("tempdir");

    let cfg = Config::load_from_dir(dir.path()).expect("defaults");
    assert_eq!(cfg.server.bind, "127.0.0.1:5000");
    assert_eq!(cfg.storage.path, PathBuf::from("tasks.json"));
}

#[test]
fn load_from_dir_rejects_unparseable_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "server = 123").expect("write invalid config");

    let err = Config::load_from_dir(dir.path()).expect_err("invalid");
    assert!(matches!(err, Error::TomlParse(_)));
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn load_from_dir_rejects_unknown_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let content = r#"
[storage]
backend = "postgres"
"#;
    fs::write(dir.path().join(CONFIG_FILE), content.trim()).expect("write config");

    assert!(matches!(
        Config::load_from_dir(dir.path()),
        Err(Error::TomlParse(_))
    ));
}

#[test]
fn load_from_dir_reads_valid_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join(CONFIG_FILE),
        "[storage]\nbackend = \"memory\"\n",
    )
    .expect("write config");

    let cfg = Config::load_from_dir(dir.path()).expect("load");
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
}

#[test]
fn load_rejects_empty_default_sort() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[tasks]\ndefault_sort = \" \"\n").expect("write config");

    let err = Config::load(&path).expect_err("invalid");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn partial_sections_keep_other_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    let content = r#"
[server]
bind = "0.0.0.0:8080"

[storage]
path = "data/board.json"
lock = true
"#;
    fs::write(&path, content.trim()).expect("write config");

    let cfg = Config::load(&path).expect("load");
    assert_eq!(cfg.server.bind, "0.0.0.0:8080");
    assert_eq!(cfg.storage.path, PathBuf::from("data/board.json"));
    assert!(cfg.storage.lock);
    assert!(!cfg.storage.atomic_write);
    assert_eq!(cfg.tasks.default_sort, "urgency");
}
