use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use botica_bedrock::recommend::GenerationSettings;
use eyre::{WrapErr, eyre};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_PATH: &str = "botica.db";

/// Runtime configuration, read from `BOTICA_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub database_path: PathBuf,
    pub generation: GenerationSettings,
    /// Exports are uploaded here when set.
    pub export_bucket: Option<String>,
    /// Overrides the region from the AWS profile chain.
    pub aws_region: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = GenerationSettings::default();

        let listen_addr = parse_or(get("BOTICA_LISTEN_ADDR"), "BOTICA_LISTEN_ADDR", DEFAULT_LISTEN_ADDR)?;
        let max_tokens: u32 = parse_or(get("BOTICA_MAX_TOKENS"), "BOTICA_MAX_TOKENS", "1024")?;
        if max_tokens == 0 {
            return Err(eyre!("BOTICA_MAX_TOKENS must be greater than zero"));
        }
        let temperature: f32 = parse_or(get("BOTICA_TEMPERATURE"), "BOTICA_TEMPERATURE", "0.0")?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(eyre!("BOTICA_TEMPERATURE must be between 0 and 1, got {temperature}"));
        }
        let timeout_secs: u64 = parse_or(
            get("BOTICA_GENERATION_TIMEOUT_SECS"),
            "BOTICA_GENERATION_TIMEOUT_SECS",
            "60",
        )?;
        if timeout_secs == 0 {
            return Err(eyre!("BOTICA_GENERATION_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(Self {
            listen_addr,
            database_path: PathBuf::from(
                get("BOTICA_DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            ),
            generation: GenerationSettings {
                model_id: get("BOTICA_MODEL_ID").unwrap_or(defaults.model_id),
                max_tokens,
                temperature,
                timeout: Duration::from_secs(timeout_secs),
            },
            export_bucket: get("BOTICA_EXPORT_BUCKET"),
            aws_region: get("AWS_REGION"),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: &str) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value.as_deref().unwrap_or(default);
    raw.parse::<T>()
        .wrap_err_with(|| format!("invalid value for {key}: {raw:?}"))
}
