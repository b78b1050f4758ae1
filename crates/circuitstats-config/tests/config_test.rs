#![allow(clippy::unwrap_used)]
// Loading tests for circuitstats-config.

use std::io::Write;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Format, Toml};
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use circuitstats_config::{Config, ConfigError, from_figment};

fn from_toml(toml: &str) -> Result<Config, ConfigError> {
    from_figment(&Figment::from(Toml::string(toml)))
}

#[test]
fn test_defaults_apply_to_empty_source() {
    let config = from_toml("").unwrap();
    assert_eq!(config.host, "api.mist.com");
    assert_eq!(config.timeout, 30);
    assert_eq!(config.port, 5000);
    assert_eq!(config.bind_address, "0.0.0.0");
    assert_eq!(config.log_level, "INFO");
    assert!(config.tokens().is_empty());
    assert!(matches!(
        config.service_config(),
        Err(ConfigError::NoCredentials)
    ));
}

#[test]
fn test_comma_separated_tokens_keep_order() {
    let config = from_toml(
        r#"
        apitoken = " alpha , bravo,,charlie "
        org_id = "org-1"
        host = "api.eu.mist.com"
        timeout = 10
        "#,
    )
    .unwrap();

    let tokens: Vec<String> = config
        .tokens()
        .iter()
        .map(|t| t.expose_secret().to_owned())
        .collect();
    assert_eq!(tokens, ["alpha", "bravo", "charlie"]);

    let service = config.service_config().unwrap();
    assert_eq!(service.host, "api.eu.mist.com");
    assert_eq!(service.org_id.as_deref(), Some("org-1"));
    assert_eq!(service.timeout, Duration::from_secs(10));
    assert_eq!(service.tokens.len(), 3);
}

#[test]
fn test_blank_org_id_means_auto_detect() {
    let config = from_toml("apitoken = \"t\"\norg_id = \"  \"").unwrap();
    assert_eq!(config.org_id(), None);
    assert_eq!(config.service_config().unwrap().org_id, None);
}

#[test]
fn test_debug_output_redacts_token() {
    let config = from_toml("apitoken = \"super-secret\"").unwrap();
    assert!(!format!("{config:?}").contains("super-secret"));
}

#[test]
fn test_zero_timeout_rejected() {
    let err = from_toml("timeout = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "timeout"));
}

#[test]
fn test_wrong_type_is_figment_error() {
    let err = from_toml("port = \"eighty\"").unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
}

#[test]
fn test_reads_file_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "apitoken = \"from-file\"\nport = 8080").unwrap();

    let config = from_figment(&Figment::from(Toml::file(file.path()))).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.tokens()[0].expose_secret(), "from-file");
}
