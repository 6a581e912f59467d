use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MEDIA_ROOT: &str = "./media";
const DEFAULT_MEDIA_URL: &str = "/media/";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Directory uploads are written under
    pub media_root: PathBuf,
    /// Public prefix uploads are served from; always ends with `/`
    pub media_url: String,
    pub enforce_unique_email: bool,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset and empty values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut media_url = get("MEDIA_URL").unwrap_or_else(|| DEFAULT_MEDIA_URL.to_owned());
        if !media_url.ends_with('/') {
            media_url.push('/');
        }

        Ok(Self {
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            media_root: PathBuf::from(
                get("MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_owned()),
            ),
            media_url,
            enforce_unique_email: parse_bool(
                "ENFORCE_UNIQUE_EMAIL",
                get("ENFORCE_UNIQUE_EMAIL"),
                false,
            )?,
            run_migrations: parse_bool("RUN_MIGRATIONS", get("RUN_MIGRATIONS"), true)?,
        })
    }
}

fn parse_bool(
    name: &'static str,
    value: Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { name, value }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert_eq!(config.media_url, "/media/");
        assert!(!config.enforce_unique_email);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_database_url_is_required() {
        assert_eq!(
            config(&[("DATABASE_URL", "  ")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/educa"),
            ("MEDIA_URL", "/uploads"),
            ("ENFORCE_UNIQUE_EMAIL", "yes"),
            ("RUN_MIGRATIONS", "0"),
        ])
        .unwrap();

        assert_eq!(config.media_url, "/uploads/");
        assert!(config.enforce_unique_email);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_invalid_bool() {
        let err = config(&[("DATABASE_URL", "x"), ("RUN_MIGRATIONS", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { name: "RUN_MIGRATIONS", .. }));
    }
}
