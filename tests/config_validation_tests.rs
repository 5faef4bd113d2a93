//! Config Validation Tests
//!
//! Typo detection and consistency validation of `AdvisorConfig`, exercised
//! through files on disk the way the binary loads them.

use std::io::Write;

use fertilizer_advisor::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use fertilizer_advisor::config::{AdvisorConfig, ConfigError};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_training_section_warns_with_suggestion() {
    let warnings = validate_unknown_keys("[training]\nsampels = 1000\n");
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "training.sampels");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("training.samples"));
}

#[test]
fn typo_in_section_name_warns() {
    let warnings = validate_unknown_keys("[forrest]\nn_trees = 10\n");
    assert!(warnings.iter().any(|w| w.field == "forrest" && w.suggestion.as_deref() == Some("forest")));
}

#[test]
fn typo_does_not_reject_config() {
    let file = write_config("[server]\naddr = \"127.0.0.1:8081\"\nadr = \"ignored\"\n");
    let config = AdvisorConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.addr, "127.0.0.1:8081");
}

#[test]
fn every_known_key_is_suggested_for_itself() {
    let known = known_config_keys();
    for key in &known {
        assert_eq!(suggest_correction(key, &known).as_deref(), Some(*key));
    }
}

#[test]
fn garbage_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("completely_unrelated_setting", &known), None);
}

// ============================================================================
// Consistency Validation
// ============================================================================

#[test]
fn defaults_validate() {
    assert!(AdvisorConfig::default().validate().is_ok());
}

#[test]
fn full_config_file_loads() {
    let file = write_config(
        r#"
[training]
samples = 2000
seed = 9
test_fraction = 0.25
train_on_start = false

[forest]
n_trees = 50
max_depth = 10
min_samples_split = 4
max_features = 5

[server]
addr = "127.0.0.1:3000"
"#,
    );
    let config = AdvisorConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.training.samples, 2000);
    assert_eq!(config.training.seed, 9);
    assert_eq!(config.training.test_fraction, 0.25);
    assert!(!config.training.train_on_start);
    assert_eq!(config.forest.n_trees, 50);
    assert_eq!(config.forest.max_features, Some(5));
    assert_eq!(config.forest.features_per_split(14), 5);
}

#[test]
fn out_of_range_test_fraction_rejected() {
    let file = write_config("[training]\ntest_fraction = 0.0\n");
    match AdvisorConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("test_fraction"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn too_few_samples_rejected() {
    let file = write_config("[training]\nsamples = 3\n");
    assert!(matches!(
        AdvisorConfig::load_from_file(file.path()),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn max_features_beyond_vector_rejected() {
    let file = write_config("[forest]\nmax_features = 15\n");
    match AdvisorConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => assert!(errors[0].contains("max_features")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn invalid_server_addr_rejected() {
    let file = write_config("[server]\naddr = \"localhost\"\n");
    assert!(matches!(
        AdvisorConfig::load_from_file(file.path()),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn wrong_value_type_is_parse_error() {
    let file = write_config("[forest]\nn_trees = \"many\"\n");
    assert!(matches!(
        AdvisorConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn validation_error_message_lists_problems() {
    let mut config = AdvisorConfig::default();
    config.forest.max_depth = 0;
    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("forest.max_depth"), "{message}");
}
