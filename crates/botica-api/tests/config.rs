use std::collections::HashMap;
use std::time::Duration;

use botica_api::config::AppConfig;

fn load(pairs: &[(&str, &str)]) -> eyre::Result<AppConfig> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_apply_when_unset() {
    let config = load(&[]).unwrap();
    assert_eq!(config.listen_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(config.database_path.to_str(), Some("botica.db"));
    assert_eq!(config.generation.max_tokens, 1024);
    assert_eq!(config.generation.temperature, 0.0);
    assert_eq!(config.generation.timeout, Duration::from_secs(60));
    assert_eq!(config.export_bucket, None);
    assert_eq!(config.aws_region, None);
}

#[test]
fn values_are_read_from_lookup() {
    let config = load(&[
        ("BOTICA_LISTEN_ADDR", "127.0.0.1:9000"),
        ("BOTICA_DATABASE_PATH", "/var/lib/botica/botica.db"),
        ("BOTICA_MODEL_ID", "us.anthropic.claude-haiku-4-5"),
        ("BOTICA_MAX_TOKENS", "2048"),
        ("BOTICA_TEMPERATURE", "0.2"),
        ("BOTICA_GENERATION_TIMEOUT_SECS", "15"),
        ("BOTICA_EXPORT_BUCKET", "botica-exports"),
        ("AWS_REGION", "us-west-2"),
    ])
    .unwrap();

    assert_eq!(config.listen_addr.port(), 9000);
    assert_eq!(config.generation.model_id, "us.anthropic.claude-haiku-4-5");
    assert_eq!(config.generation.max_tokens, 2048);
    assert_eq!(config.generation.timeout, Duration::from_secs(15));
    assert_eq!(config.export_bucket.as_deref(), Some("botica-exports"));
    assert_eq!(config.aws_region.as_deref(), Some("us-west-2"));
}

#[test]
fn blank_values_count_as_unset() {
    let config = load(&[("BOTICA_EXPORT_BUCKET", "  "), ("BOTICA_MAX_TOKENS", "")]).unwrap();
    assert_eq!(config.export_bucket, None);
    assert_eq!(config.generation.max_tokens, 1024);
}

#[test]
fn invalid_numbers_are_rejected() {
    let err = load(&[("BOTICA_MAX_TOKENS", "lots")]).unwrap_err();
    assert!(err.to_string().contains("BOTICA_MAX_TOKENS"));
    assert!(load(&[("BOTICA_MAX_TOKENS", "0")]).is_err());
    assert!(load(&[("BOTICA_TEMPERATURE", "1.5")]).is_err());
    assert!(load(&[("BOTICA_GENERATION_TIMEOUT_SECS", "0")]).is_err());
    assert!(load(&[("BOTICA_LISTEN_ADDR", "not-an-addr")]).is_err());
}
