use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

impl Env {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("dev") | None => Env::Dev,
            Some("staging") => Env::Staging,
            Some("production") => Env::Production,
            Some(other) => {
                tracing::warn!("Unknown `ENVIRONMENT` value `{other}`, falling back to dev");
                Env::Dev
            }
        }
    }

    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        Ok(Env::parse(optional_var(lookup, "ENVIRONMENT")?.as_deref()))
    }

    /// Reads `ENVIRONMENT` alone, so logging can be set up before the rest
    /// of the config is parsed.
    pub fn current() -> Self {
        Env::from_lookup(&var).unwrap_or(Env::Dev)
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    pub env: Env,
    pub port: u16,
    pub database_url: Option<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_allowed_origin: Option<String>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0}")]
    Env(String),

    #[error("Environment variable `{key}` has an invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => Ok(None),
            std::env::VarError::NotUnicode(_) => Err(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            )),
        },
    }
}

fn parsed_var<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<Option<String>, String>,
{
    match lookup(key).map_err(ConfigError::Env)? {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => {
            tracing::info!("`{key}` not set, using default");
            Ok(default)
        }
    }
}

/// Empty values count as unset
fn optional_var<F>(lookup: &F, key: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Result<Option<String>, String>,
{
    Ok(lookup(key)
        .map_err(ConfigError::Env)?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        match ServerConfig::parse(var) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Invalid server configuration: {e}");
                std::process::exit(1)
            }
        }
    }

    pub fn parse<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let env = Env::from_lookup(&lookup)?;

        let database_url = optional_var(&lookup, "DATABASE_URL")?;
        if database_url.is_none() {
            tracing::warn!("Missing environment variable `DATABASE_URL`");
        }

        let upload_dir = optional_var(&lookup, "UPLOAD_DIR")?
            .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());

        let max_upload_bytes = parsed_var(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        if max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_UPLOAD_BYTES",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }

        Ok(ServerConfig {
            port: parsed_var(&lookup, "PORT", DEFAULT_PORT)?,
            database_url,
            upload_dir: PathBuf::from(upload_dir),
            max_upload_bytes,
            cors_allowed_origin: optional_var(&lookup, "CORS_ALLOWED_ORIGIN")?,
            env,
        })
    }
}
