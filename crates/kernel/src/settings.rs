use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSTORE_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSTORE_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSTORE";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// and `BOOKSTORE_*` variables (`__` separates nested keys).
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join("config"))
                .context("unable to resolve current directory")?,
        };

        Self::load_from(&config_dir, &environment)
    }

    fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // The selector variable wins over any `environment` key in files.
        settings.environment = environment.parse()?;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    /// Deadline for a whole request; unset lets requests run to completion.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    /// Prefix every module route is mounted under; empty mounts at `/`.
    #[serde(default)]
    pub base_path: String,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: None,
            base_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://books.db".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bookstore-settings-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_database_is_sqlite_file() {
        let settings = Settings::default();
        assert_eq!(settings.database.url, "sqlite://books.db");
        assert_eq!(settings.database.max_connections, 5);
    }

    #[test]
    fn default_server_mounts_at_root() {
        let settings = Settings::default();
        assert_eq!(settings.server.base_path, "");
        assert_eq!(settings.server.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn request_timeout_is_opt_in() {
        assert_eq!(Settings::default().server.request_timeout_ms, None);

        let dir = scratch_dir("timeout");
        let _ = fs::remove_file(dir.join("local.toml"));
        fs::write(dir.join("base.toml"), "[server]\nport = 9000\n").unwrap();
        let settings = Settings::load_from(&dir, "local").unwrap();
        assert_eq!(settings.server.request_timeout_ms, None);

        fs::write(dir.join("local.toml"), "[server]\nrequest_timeout_ms = 2500\n").unwrap();
        let settings = Settings::load_from(&dir, "local").unwrap();
        assert_eq!(settings.server.request_timeout_ms, Some(2500));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }

    #[test]
    fn missing_config_files_fall_back_to_defaults() {
        let dir = scratch_dir("empty");
        let settings = Settings::load_from(&dir, "staging").unwrap();
        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.telemetry.log_format, LogFormat::Pretty);
    }

    #[test]
    fn environment_file_overrides_base_file() {
        let dir = scratch_dir("layered");
        fs::write(
            dir.join("base.toml"),
            "[server]\nport = 9000\nhost = \"127.0.0.1\"\n[telemetry]\nlog_format = \"json\"\n",
        )
        .unwrap();
        fs::write(dir.join("production.toml"), "[server]\nport = 9100\n").unwrap();

        let settings = Settings::load_from(&dir, "production").unwrap();
        assert_eq!(settings.environment, Environment::Production);
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);
    }
}
