//! Integration tests for config loading from fixture files.
//!
//! These tests verify that the sample config file parses into the expected settings.

use std::fs;
use std::path::Path;

use code_rename::config::CodeRenameConfig;
use code_rename::{CaseMode, OutputForm};

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn sample_config_has_code_rename_section() {
    let config_content = read_sample_config();
    let value: toml::Value = toml::from_str(&config_content).expect("should parse");
    let section = value.get("code_rename").expect("should have code_rename section");

    for key in ["catalog", "output", "case", "replace_spaces", "extensions", "log", "verbose"] {
        assert!(section.get(key).is_some(), "code_rename section should have '{key}'");
    }
}

#[test]
fn code_rename_config_parses_sample() {
    let config_content = read_sample_config();
    let config = CodeRenameConfig::from_toml_str(&config_content).expect("should parse code_rename config");

    let home = dirs::home_dir().expect("home directory should be known");
    assert_eq!(
        config.catalog,
        Some(home.join(".config/code-rename/country_mappings.json"))
    );
    assert_eq!(config.output, Some(OutputForm::Alpha3));
    assert_eq!(config.case, Some(CaseMode::Upper));
    assert!(config.replace_spaces);
    assert_eq!(config.extensions, vec!["pdf", "docx", "xlsx", "xls", "csv"]);
    assert!(config.log);
    assert!(!config.verbose);
}

#[test]
fn code_rename_config_ignores_other_sections() {
    let config_content = format!("{}\n[other_tool]\nverbose = true\n", read_sample_config());
    let config = CodeRenameConfig::from_toml_str(&config_content).expect("should parse code_rename config");
    assert!(!config.verbose);
}

#[test]
fn code_rename_config_rejects_unknown_output_form() {
    let config = CodeRenameConfig::from_toml_str("[code_rename]\noutput = \"alpha4\"\n");
    assert!(config.is_err());
}
