use std::path::{Path, PathBuf};

use petta_kernel::config::Config;

use super::FIXTURES_PATH;

fn config_fixture(name: &str) -> String {
    format!("{FIXTURES_PATH}/configs/{name}")
}

#[test]
fn test_load_valid_config() {
    let config = Config::from_file(config_fixture("valid_full.toml")).expect("Failed to load config");

    assert_eq!(config.petta_path, Some(PathBuf::from("/opt/snet/PeTTa")));
    assert_eq!(config.scratch_dir(), PathBuf::from("/tmp"));
    assert_eq!(config.engine.args[0], "--stack_limit=4g");
    assert_eq!(config.engine.startup_timeout, 60.0);
    assert_eq!(config.engine.env.get("LANG").map(String::as_str), Some("C.UTF-8"));
}

#[test]
fn test_load_minimal_config() {
    let path = config_fixture("valid_minimal.toml");
    let config = Config::load_with_petta_path(Some(Path::new(&path)), None)
        .expect("Failed to load config");

    assert_eq!(
        config.petta_main(),
        Some(PathBuf::from("/opt/snet/PeTTa/src/main.pl"))
    );
    // Defaults fill in everything else
    assert_eq!(config.engine.program, "swipl");
    assert_eq!(config.unit_extension.suffix(), ".metta");
}

#[test]
fn test_env_overrides_config_file() {
    let path = config_fixture("valid_minimal.toml");
    let config =
        Config::load_with_petta_path(Some(Path::new(&path)), Some("/srv/PeTTa".to_string()))
            .expect("Failed to load config");

    assert_eq!(config.petta_path, Some(PathBuf::from("/srv/PeTTa")));
}

#[test]
fn test_load_invalid_empty_program() {
    let result = Config::from_file(config_fixture("invalid_empty_program.toml"));
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_extension() {
    let result = Config::from_file(config_fixture("invalid_extension.toml"));
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_startup_timeout() {
    let result = Config::from_file(config_fixture("invalid_startup_timeout.toml"));
    assert!(result.is_err());
}
