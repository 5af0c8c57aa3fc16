//! Configuration file support for homegame.
//!
//! Loads `homegame.toml` from the working directory, falling back to the
//! user config directory (`~/.config/homegame/homegame.toml` on Linux).

use anyhow::{Context, Result};
use homegame_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::Credentials;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "homegame.toml";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

/// Single account guarding the HTTP API. Leave both unset to run open.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
    /// Directory for daily-rolling JSON log files
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config
            .auth
            .check()
            .with_context(|| format!("Invalid [auth] section in {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Resolve the configuration for this run.
    ///
    /// An explicit path must exist. Otherwise the working directory is
    /// searched first, then the user config directory, then defaults apply.
    pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path)?
                .with_context(|| format!("Config file not found: {}", path.display()));
        }

        let mut candidates = vec![working_dir.join(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("homegame").join(CONFIG_FILE_NAME));
        }

        for candidate in candidates {
            if let Some(config) = Self::load(&candidate)? {
                return Ok(config);
            }
        }

        Ok(Self::default())
    }
}

impl ServerConfig {
    /// Priority: CLI flag > config file > default
    pub fn bind(&self, flag: Option<&str>) -> String {
        flag.or(self.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
            .to_string()
    }

    /// Priority: CLI flag > config file > default
    pub fn port(&self, flag: Option<u16>) -> u16 {
        flag.or(self.port).unwrap_or(DEFAULT_PORT)
    }
}

impl DatabaseConfig {
    /// Priority: CLI flag > config file > `Database::default_path()`
    pub fn path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .unwrap_or_else(homegame_db::Database::default_path)
    }
}

impl AuthConfig {
    fn check(&self) -> Result<()> {
        match (&self.username, &self.password) {
            (Some(_), None) => anyhow::bail!("username is set but password is missing"),
            (None, Some(_)) => anyhow::bail!("password is set but username is missing"),
            (Some(username), Some(_)) if username.trim().is_empty() => {
                anyhow::bail!("username must not be empty")
            }
            _ => Ok(()),
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

impl LoggingConfig {
    /// Priority: CLI flag > config file > `fallback`
    pub fn level(&self, flag: Option<&str>, fallback: &str) -> String {
        flag.or(self.level.as_deref())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Priority: CLI flag > config file > pretty
    pub fn format(&self, flag: Option<LogFormat>) -> LogFormat {
        flag.or(self.format).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[server]
bind = "0.0.0.0"
port = 8080

[database]
path = "/var/lib/homegame/games.db"

[auth]
username = "host"
password = "river"

[logging]
level = "debug"
format = "json"
dir = "/var/log/homegame"
"#,
        );

        let config = Config::load(&path).unwrap().unwrap();
        assert_eq!(config.server.bind(None), "0.0.0.0");
        assert_eq!(config.server.port(None), 8080);
        assert_eq!(
            config.database.path(None),
            PathBuf::from("/var/lib/homegame/games.db")
        );
        assert_eq!(config.logging.level(None, "warn"), "debug");
        assert_eq!(config.logging.format(None), LogFormat::Json);

        let credentials = config.auth.credentials().unwrap();
        assert_eq!(credentials.username, "host");
        assert_eq!(credentials.password, "river");
    }

    #[test]
    fn test_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[server]\nport = 8080\n[logging]\nlevel = \"debug\"\n");

        let config = Config::load(&path).unwrap().unwrap();
        assert_eq!(config.server.port(Some(9000)), 9000);
        assert_eq!(config.server.bind(Some("::1")), "::1");
        assert_eq!(config.logging.level(Some("trace"), "warn"), "trace");
        assert_eq!(
            config.database.path(Some(Path::new("local.db"))),
            PathBuf::from("local.db")
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind(None), DEFAULT_BIND);
        assert_eq!(config.server.port(None), DEFAULT_PORT);
        assert_eq!(config.logging.level(None, DEFAULT_LOG_LEVEL), "info");
        assert_eq!(config.logging.format(None), LogFormat::Pretty);
        assert_eq!(config.database.path(None), homegame_db::Database::default_path());
        assert!(config.auth.credentials().is_none());
    }

    #[test]
    fn test_unknown_field_is_hard_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[server]\nhost = \"example\"\n");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_malformed_file_is_hard_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[server\nport = ");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_half_configured_auth_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[auth]\nusername = \"host\"\n");
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("password is missing"));
    }

    #[test]
    fn test_resolve_prefers_working_dir() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[server]\nport = 4100\n");

        let config = Config::resolve(None, dir.path()).unwrap();
        assert_eq!(config.server.port(None), 4100);
    }

    #[test]
    fn test_resolve_explicit_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::resolve(Some(&missing), dir.path()).is_err());
    }
}
