//! Server configuration.
//!
//! Every setting can be given on the command line; anything left unset falls back to
//! the environment and then to a built-in default. The database URL has no default.

use std::fmt::{Display, Formatter, Result as FmtResult};

use url::Url;

/// Origins allowed by CORS when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["https://ailights.org", "http://localhost:3000"];

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default size of the database connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Settings supplied explicitly, typically from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerOverrides {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Host to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Comma-separated CORS origins.
    pub allowed_origins: Option<String>,
    /// Maximum pooled connections.
    pub max_connections: Option<u32>,
    /// Verbose logging.
    pub verbose: bool,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// CORS allow-list.
    pub allowed_origins: Vec<String>,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Verbose logging.
    pub verbose: bool,
}

/// Errors found while resolving the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither `--database-url` nor `DATABASE_URL` was given.
    MissingDatabaseUrl,
    /// The database URL does not parse.
    InvalidDatabaseUrl(String),
    /// A numeric setting does not parse.
    InvalidNumber {
        /// The setting name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A CORS origin is not an absolute http(s) origin.
    InvalidOrigin(String),
    /// The CORS allow-list is empty.
    NoAllowedOrigins,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingDatabaseUrl => {
                write!(f, "no database URL: pass --database-url or set DATABASE_URL")
            }
            Self::InvalidDatabaseUrl(msg) => write!(f, "invalid database URL: {}", msg),
            Self::InvalidNumber { key, value } => write!(f, "invalid {}: '{}'", key, value),
            Self::InvalidOrigin(origin) => write!(f, "invalid CORS origin: '{}'", origin),
            Self::NoAllowedOrigins => write!(f, "the CORS origin allow-list is empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Resolves overrides against the process environment.
    ///
    /// Environment variables: `DATABASE_URL`, `SURVEY_HOST`, `SURVEY_PORT`,
    /// `SURVEY_ALLOWED_ORIGINS`, `SURVEY_MAX_CONNECTIONS`.
    pub fn from_env(overrides: ServerOverrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves overrides against an arbitrary environment lookup.
    pub fn resolve<F>(overrides: ServerOverrides, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = resolve_database_url(overrides.database_url, &env)?;

        let host = overrides
            .host
            .or_else(|| env("SURVEY_HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => parse_number("SURVEY_PORT", env("SURVEY_PORT"), DEFAULT_PORT)?,
        };

        let max_connections = match overrides.max_connections {
            Some(n) => n,
            None => parse_number(
                "SURVEY_MAX_CONNECTIONS",
                env("SURVEY_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
        };

        let allowed_origins = match overrides
            .allowed_origins
            .or_else(|| env("SURVEY_ALLOWED_ORIGINS"))
        {
            Some(list) => parse_origins(&list)?,
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            allowed_origins,
            max_connections,
            verbose: overrides.verbose,
        })
    }

    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The database URL with any password masked, safe to log.
    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

/// Picks the database URL from `explicit` or `DATABASE_URL` and checks that it names a
/// PostgreSQL server.
pub fn database_url_from_env(explicit: Option<String>) -> Result<String, ConfigError> {
    resolve_database_url(explicit, &|key: &str| std::env::var(key).ok())
}

fn resolve_database_url<F>(explicit: Option<String>, env: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let database_url = explicit
        .or_else(|| env("DATABASE_URL"))
        .filter(|url| !url.trim().is_empty())
        .ok_or(ConfigError::MissingDatabaseUrl)?;
    let parsed =
        Url::parse(&database_url).map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "postgres" | "postgresql") {
        return Err(ConfigError::InvalidDatabaseUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }
    Ok(database_url)
}

/// Masks the password of a database URL.
pub fn redact_database_url(database_url: &str) -> String {
    match Url::parse(database_url) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable>".to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}

fn parse_origins(list: &str) -> Result<Vec<String>, ConfigError> {
    let mut origins = Vec::new();
    for origin in list.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        let url = Url::parse(origin).map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidOrigin(origin.to_string()));
        }
        origins.push(origin.trim_end_matches('/').to_string());
    }
    if origins.is_empty() {
        return Err(ConfigError::NoAllowedOrigins);
    }
    Ok(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn database_url_is_required() {
        let result = ServerConfig::resolve(ServerOverrides::default(), env_from(&[]));
        assert_eq!(result, Err(ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::resolve(
            ServerOverrides::default(),
            env_from(&[("DATABASE_URL", "postgres://localhost/survey")]),
        )
        .unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            config.allowed_origins,
            vec!["https://ailights.org", "http://localhost:3000"]
        );
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn overrides_win_over_environment() {
        let overrides = ServerOverrides {
            database_url: Some("postgres://cli/survey".to_string()),
            port: Some(9000),
            ..ServerOverrides::default()
        };
        let config = ServerConfig::resolve(
            overrides,
            env_from(&[
                ("DATABASE_URL", "postgres://env/survey"),
                ("SURVEY_PORT", "7000"),
                ("SURVEY_HOST", "0.0.0.0"),
            ]),
        )
        .unwrap();
        assert_eq!(config.database_url, "postgres://cli/survey");
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn invalid_port_is_reported() {
        let result = ServerConfig::resolve(
            ServerOverrides::default(),
            env_from(&[
                ("DATABASE_URL", "postgres://localhost/survey"),
                ("SURVEY_PORT", "eighty"),
            ]),
        );
        assert_eq!(
            result,
            Err(ConfigError::InvalidNumber {
                key: "SURVEY_PORT",
                value: "eighty".to_string()
            })
        );
    }

    #[test]
    fn non_postgres_url_is_rejected() {
        let result = ServerConfig::resolve(
            ServerOverrides::default(),
            env_from(&[("DATABASE_URL", "mysql://localhost/survey")]),
        );
        assert!(matches!(result, Err(ConfigError::InvalidDatabaseUrl(_))));
    }

    #[test]
    fn origins_are_parsed_and_validated() {
        let config = ServerConfig::resolve(
            ServerOverrides::default(),
            env_from(&[
                ("DATABASE_URL", "postgres://localhost/survey"),
                (
                    "SURVEY_ALLOWED_ORIGINS",
                    " https://survey.example.ch/ , http://localhost:5173",
                ),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://survey.example.ch", "http://localhost:5173"]
        );

        let result = ServerConfig::resolve(
            ServerOverrides {
                allowed_origins: Some("ftp://files.example".to_string()),
                database_url: Some("postgres://localhost/survey".to_string()),
                ..ServerOverrides::default()
            },
            env_from(&[]),
        );
        assert_eq!(
            result,
            Err(ConfigError::InvalidOrigin("ftp://files.example".to_string()))
        );

        let result = ServerConfig::resolve(
            ServerOverrides {
                allowed_origins: Some(" , ".to_string()),
                database_url: Some("postgres://localhost/survey".to_string()),
                ..ServerOverrides::default()
            },
            env_from(&[]),
        );
        assert_eq!(result, Err(ConfigError::NoAllowedOrigins));
    }

    #[test]
    fn explicit_database_url_skips_environment() {
        let url = resolve_database_url(
            Some("postgresql://cli/survey".to_string()),
            &env_from(&[("DATABASE_URL", "not a url")]),
        )
        .unwrap();
        assert_eq!(url, "postgresql://cli/survey");
        assert_eq!(
            resolve_database_url(Some("  ".to_string()), &env_from(&[])),
            Err(ConfigError::MissingDatabaseUrl)
        );
    }

    #[test]
    fn redaction_without_password_is_identity() {
        assert_eq!(
            redact_database_url("postgres://survey@db/survey"),
            "postgres://survey@db/survey"
        );
        assert_eq!(redact_database_url("::"), "<unparseable>");
    }

    #[test]
    fn password_is_redacted() {
        let config = ServerConfig::resolve(
            ServerOverrides::default(),
            env_from(&[("DATABASE_URL", "postgres://survey:s3cret@db:5432/survey")]),
        )
        .unwrap();
        let redacted = config.redacted_database_url();
        assert!(!redacted.contains("s3cret"));
        assert!(redacted.contains("***"));
        assert!(redacted.contains("db:5432/survey"));
    }
}
