//! Database and statement configuration.

use crate::error::{SealError, SealResult};
use std::time::Duration;

/// Default environment variable prefix for [`DatabaseConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "PGSEAL_";

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_CONNECTION_LIMIT: usize = 10;
const DEFAULT_RECYCLE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection and pool settings for a [`Database`](crate::Database).
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    // Connection settings
    /// Database name.
    pub database: String,
    pub host: String,
    pub user: String,
    pub password: Option<String>,
    pub port: u16,

    // Pool settings
    /// Maximum number of pooled connections.
    pub connection_limit: usize,
    /// Whether acquisition waits for a free connection or fails immediately
    /// when the pool is exhausted.
    pub wait_for_connections: bool,
    /// Upper bound on waiting for a free connection. `None` waits forever.
    pub wait_timeout: Option<Duration>,
    /// Upper bound on health-checking a returned connection before reuse.
    pub recycle_timeout: Option<Duration>,
    /// Upper bound on establishing a new connection.
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            host: "127.0.0.1".to_string(),
            user: "postgres".to_string(),
            password: None,
            port: DEFAULT_PORT,
            connection_limit: DEFAULT_CONNECTION_LIMIT,
            wait_for_connections: true,
            wait_timeout: None,
            recycle_timeout: Some(DEFAULT_RECYCLE_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("database", &self.database)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("port", &self.port)
            .field("connection_limit", &self.connection_limit)
            .field("wait_for_connections", &self.wait_for_connections)
            .field("wait_timeout", &self.wait_timeout)
            .field("recycle_timeout", &self.recycle_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl DatabaseConfig {
    /// Configuration for `database` with defaults for everything else.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum number of pooled connections.
    pub fn connection_limit(mut self, limit: usize) -> Self {
        self.connection_limit = limit;
        self
    }

    /// Fail immediately instead of waiting when the pool is exhausted.
    pub fn wait_for_connections(mut self, wait: bool) -> Self {
        self.wait_for_connections = wait;
        self
    }

    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    pub fn recycle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recycle_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Read configuration from `{prefix}DB`, `{prefix}HOST`, `{prefix}USER`,
    /// `{prefix}PASS`, `{prefix}PORT`, `{prefix}CONNECTION_LIMIT`,
    /// `{prefix}WAIT_FOR_CONNECTIONS`, `{prefix}WAIT_TIMEOUT`,
    /// `{prefix}RECYCLE_TIMEOUT` and `{prefix}CONNECT_TIMEOUT`.
    ///
    /// Only `DB` is required. Every invalid value is reported in one
    /// [`SealError::Config`].
    pub fn from_env(prefix: &str) -> SealResult<Self> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Like [`DatabaseConfig::from_env`] with a custom variable source.
    pub fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> SealResult<Self> {
        let mut env = EnvReader {
            prefix,
            lookup,
            errors: Vec::new(),
        };
        let mut config = Self::default();

        match env.raw("DB") {
            Some(db) => config.database = db,
            None => env.error("DB", "invalid database name (was empty)"),
        }
        if let Some(host) = env.raw("HOST") {
            config.host = host;
        }
        if let Some(user) = env.raw("USER") {
            config.user = user;
        }
        config.password = env.raw("PASS");

        if let Some(port) = env.parse("PORT", parse_port) {
            config.port = port;
        }
        if let Some(limit) = env.parse("CONNECTION_LIMIT", parse_limit) {
            config.connection_limit = limit;
        }
        if let Some(wait) = env.parse("WAIT_FOR_CONNECTIONS", parse_bool) {
            config.wait_for_connections = wait;
        }
        if let Some(timeout) = env.parse("WAIT_TIMEOUT", parse_duration) {
            config.wait_timeout = Some(timeout);
        }
        if let Some(timeout) = env.parse("RECYCLE_TIMEOUT", parse_duration) {
            config.recycle_timeout = Some(timeout);
        }
        if let Some(timeout) = env.parse("CONNECT_TIMEOUT", parse_duration) {
            config.connect_timeout = timeout;
        }

        if !env.errors.is_empty() {
            return Err(SealError::config(env.errors.join("; ")));
        }
        Ok(config)
    }

    /// Driver-level connection settings.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.dbname(&self.database)
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .connect_timeout(self.connect_timeout);
        if let Some(password) = &self.password {
            pg.password(password);
        }
        pg
    }
}

/// Prefixed variable source that collects parse errors.
struct EnvReader<'a, F> {
    prefix: &'a str,
    lookup: F,
    errors: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<'_, F> {
    /// Trimmed value; empty counts as unset.
    fn raw(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{}{name}", self.prefix))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&mut self, name: &str, parse: fn(&str) -> Result<T, String>) -> Option<T> {
        let raw = self.raw(name)?;
        match parse(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                self.error(name, &e);
                None
            }
        }
    }

    fn error(&mut self, name: &str, message: &str) {
        self.errors.push(format!("{}{name}: {message}", self.prefix));
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    raw.parse::<u16>()
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| format!("invalid port (was {raw:?})"))
}

fn parse_limit(raw: &str) -> Result<usize, String> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("invalid connection limit (was {raw:?})"))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("invalid boolean (was {raw:?})")),
    }
}

/// Parse `500ms`, `10s`, `2m`, `1h` or a plain number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration (was {raw:?})"))?;

    let secs = match unit.trim() {
        "ms" => return Ok(Duration::from_millis(value)),
        "" | "s" => Some(value),
        "m" => value.checked_mul(60),
        "h" => value.checked_mul(60 * 60),
        other => return Err(format!("invalid duration unit {other:?} (was {raw:?})")),
    };
    secs.map(Duration::from_secs)
        .ok_or_else(|| format!("invalid duration (was {raw:?})"))
}

/// Per-statement execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementOptions {
    /// Run through a (cached) prepared statement.
    pub prepare_statement: bool,
}

impl Default for StatementOptions {
    fn default() -> Self {
        Self {
            prepare_statement: true,
        }
    }
}

impl StatementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle prepared execution.
    pub fn prepare_statement(mut self, prepare: bool) -> Self {
        self.prepare_statement = prepare;
        self
    }
}
