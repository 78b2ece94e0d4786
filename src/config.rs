//! Configuration management for queue-board
//!
//! Values come from built-in defaults, an optional `config.toml`, and the
//! process environment, in increasing order of precedence. Environment names
//! are unprefixed (`REDIS_HOST`, `BULL_PREFIX`, `PORT`, ...).

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::auth::Credentials;
use crate::queue::Protocol;

pub const HOME_PAGE: &str = "/";
pub const LOGIN_PAGE: &str = "/login";

/// Complete dashboard configuration, loaded once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    // ═══ STORE CONNECTION ═══
    pub redis_host: String,
    pub redis_port: u16,
    /// Ignored in cluster mode
    pub redis_db: i64,
    pub redis_password: Option<String>,
    pub redis_use_tls: bool,
    pub redis_is_cluster: bool,

    // ═══ QUEUE DISCOVERY ═══
    /// Key prefix shared by every queue (`<prefix>:<name>:id`)
    pub bull_prefix: String,
    /// Queue library flavour, one per process
    pub bull_version: Protocol,
    /// Seconds between reconciliation cycles
    pub refresh_interval_secs: u64,

    // ═══ HTTP ═══
    pub bind_address: String,
    pub port: u16,
    /// Public path prefix when served behind a reverse proxy
    pub proxy_path: String,

    // ═══ AUTHENTICATION ═══
    pub user_login: Option<String>,
    pub user_password: Option<String>,
}

impl BoardConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        // Try packaged path first, then development path
        let config_paths = ["queue-board/config", "config"];

        let mut builder = Self::defaults()?;
        if let Some(path) = config_paths
            .iter()
            .find(|path| Path::new(&format!("{path}.toml")).exists())
        {
            builder = builder.add_source(File::with_name(path));
        }

        Self::build(builder.add_source(Environment::default()))
    }

    /// Builder pre-populated with every default value
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("redis_host", "localhost")?
            .set_default("redis_port", 6379_i64)?
            .set_default("redis_db", 0_i64)?
            .set_default("redis_use_tls", false)?
            .set_default("redis_is_cluster", false)?
            .set_default("bull_prefix", "bull")?
            .set_default("bull_version", "BULLMQ")?
            .set_default("refresh_interval_secs", 60_i64)?
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 3000_i64)?
            .set_default("proxy_path", "")
    }

    /// Deserialize, normalize and validate the layered sources
    pub fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let mut config: BoardConfig = builder.build()?.try_deserialize()?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn normalize(&mut self) {
        if self.proxy_path.ends_with('/') {
            self.proxy_path.pop();
        }
        self.redis_password = non_empty(self.redis_password.take());
        self.user_login = non_empty(self.user_login.take());
        self.user_password = non_empty(self.user_password.take());
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.redis_port == 0 {
            return Err(ConfigError::Message("redis_port cannot be 0".into()));
        }

        if self.bull_prefix.is_empty() {
            return Err(ConfigError::Message("bull_prefix cannot be empty".into()));
        }

        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Message(
                "refresh_interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Connection URL for the store client
    pub fn redis_url(&self) -> String {
        let scheme = if self.redis_use_tls { "rediss" } else { "redis" };
        let auth = match &self.redis_password {
            Some(password) => format!(":{}@", urlencoding::encode(password)),
            None => String::new(),
        };

        if self.redis_is_cluster {
            format!("{scheme}://{auth}{}:{}", self.redis_host, self.redis_port)
        } else {
            format!(
                "{scheme}://{auth}{}:{}/{}",
                self.redis_host, self.redis_port, self.redis_db
            )
        }
    }

    /// Expected credentials; `None` means authentication is disabled
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.user_login, &self.user_password) {
            (Some(user), Some(password)) => Some(Credentials::new(user, password)),
            _ => None,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.credentials().is_some()
    }

    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Dashboard home as seen from the browser
    pub fn proxy_home_page(&self) -> String {
        join_path(&self.proxy_path, HOME_PAGE)
    }

    /// Login page as seen from the browser
    pub fn proxy_login_page(&self) -> String {
        join_path(&self.proxy_path, LOGIN_PAGE)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn join_path(base: &str, page: &str) -> String {
    if base.is_empty() {
        return page.to_string();
    }
    let base = base.trim_end_matches('/');
    if base.starts_with('/') {
        format!("{base}{page}")
    } else {
        format!("/{base}{page}")
    }
}
