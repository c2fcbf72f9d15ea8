use std::path::{Path, PathBuf};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{db::Engine, error::Error};

pub const DEFAULT_CONFIG_FILE: &str = "authorbench.toml";
pub const ENV_PREFIX: &str = "AUTHORBENCH_";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSelection {
    Sqlx,
    Orm,
    #[default]
    Both,
}

impl BackendSelection {
    pub fn includes_sqlx(&self) -> bool {
        matches!(self, BackendSelection::Sqlx | BackendSelection::Both)
    }

    pub fn includes_orm(&self) -> bool {
        matches!(self, BackendSelection::Orm | BackendSelection::Both)
    }
}

impl std::str::FromStr for BackendSelection {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlx" => Ok(BackendSelection::Sqlx),
            "orm" => Ok(BackendSelection::Orm),
            "both" => Ok(BackendSelection::Both),
            other => Err(Error::Configuration(format!(
                "unknown backend `{other}`, expected sqlx, orm or both"
            ))),
        }
    }
}

/// libpq `sslmode` values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    #[default]
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Allow => "allow",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection url. Takes precedence over the individual parts.
    pub url:      Option<String>,
    pub host:     String,
    pub port:     u16,
    pub user:     String,
    pub password: String,
    pub name:     String,
    pub sslmode:  SslMode,
}

impl DatabaseConfig {
    fn postgres(name: &str) -> Self {
        Self {
            url:      None,
            host:     "localhost".into(),
            port:     5434,
            user:     "postgres".into(),
            password: "postgres".into(),
            name:     name.into(),
            sslmode:  SslMode::Disable,
        }
    }

    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgresql://{}:{}@{}:{}/{}?sslmode={}",
                self.user,
                self.password,
                self.host,
                self.port,
                self.name,
                self.sslmode.as_str()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub dir:      PathBuf,
    pub basename: String,
    /// `EnvFilter` directive. `RUST_LOG` takes precedence.
    pub level:    String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir:      PathBuf::from("logs"),
            basename: "benchmark.log".into(),
            level:    "info".into(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub iterations:  usize,
    pub seed:        Option<u64>,
    pub backends:    BackendSelection,
    /// Clear the table before a backend is benchmarked.
    pub fresh_start: bool,
    pub sqlx:        DatabaseConfig,
    pub orm:         DatabaseConfig,
    pub log:         LogConfig,
    pub report:      ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations:  100,
            seed:        None,
            backends:    BackendSelection::Both,
            fresh_start: true,
            sqlx:        DatabaseConfig::postgres("authors_sqlx"),
            orm:         DatabaseConfig::postgres("authors_orm"),
            log:         LogConfig::default(),
            report:      ReportConfig::default(),
        }
    }
}

impl Config {
    pub fn default_as_string() -> Result<String> {
        Ok(toml::to_string(&Self::default())?)
    }

    /// Defaults, then the TOML file, then `AUTHORBENCH_*` environment
    /// variables (`__` separates nested keys).
    ///
    /// Without an explicit `path` a missing `authorbench.toml` is skipped; an
    /// explicit path has to exist.
    pub fn read_config(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.exists() => {
                return Err(Error::Configuration(format!(
                    "config file {} does not exist",
                    path.display()
                ))
                .into())
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Self::figment(&file).extract().map_err(Into::into)
    }

    fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.iterations == 0 {
            return Err(Error::Configuration(
                "iterations must be greater than zero".into(),
            ));
        }
        if self.log.basename.trim().is_empty() {
            return Err(Error::Configuration("log.basename cannot be empty".into()));
        }
        if self.backends.includes_sqlx() {
            Engine::from_url(&self.sqlx.connection_url())?;
        }
        if self.backends.includes_orm() {
            Engine::from_url(&self.orm.connection_url())?;
        }
        Ok(())
    }
}
