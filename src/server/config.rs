use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub log_dir: String,
}

// Partial configs for layering
#[derive(Deserialize, Default, Debug)]
struct PartialDatabaseConfig {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    name: Option<String>,
    ssl_mode: Option<String>,
    max_connections: Option<u32>,
    min_connections: Option<u32>,
    max_lifetime_secs: Option<u64>,
}

#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    #[serde(default)]
    database: PartialDatabaseConfig,
    jwt_secret: Option<String>,
    port: Option<u16>,
    cors_allowed_origins: Option<Vec<String>>,
    log_dir: Option<String>,
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, String> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(None),
    }
}

impl PartialServerConfig {
    fn from_file(path_str: &str) -> Result<Self, String> {
        let path = Path::new(path_str);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }

    /// An empty variable counts as unset, so `KEY=` lines in `.env` fall back
    /// to the file value or the default.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Ok(Self {
            database: PartialDatabaseConfig {
                host: lookup("DB_HOST"),
                port: parse_var(&lookup, "DB_PORT")?,
                user: lookup("DB_USER"),
                password: lookup("DB_PASSWORD"),
                name: lookup("DB_NAME"),
                ssl_mode: lookup("DB_SSLMODE"),
                max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS")?,
                min_connections: parse_var(&lookup, "DB_MIN_CONNECTIONS")?,
                max_lifetime_secs: parse_var(&lookup, "DB_MAX_LIFETIME_SECS")?,
            },
            jwt_secret: lookup("JWT_SECRET"),
            port: parse_var(&lookup, "PORT")?,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").map(|raw| split_origins(&raw)),
            log_dir: lookup("LOG_DIR"),
        })
    }
}

impl ServerConfig {
    /// Defaults, then the optional TOML file, then the process environment
    /// (including `.env`).
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();
        Self::load_with(config_path, |key| env::var(key).ok())
    }

    pub fn load_with(
        config_path: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let file_config = match config_path {
            Some(path) => PartialServerConfig::from_file(path)?,
            None => PartialServerConfig::default(),
        };
        let env_config = PartialServerConfig::from_lookup(lookup)?;

        // Environment overrides file
        let file_db = file_config.database;
        let env_db = env_config.database;
        let database = DatabaseConfig {
            host: env_db.host.or(file_db.host).unwrap_or_else(|| "localhost".to_string()),
            port: env_db.port.or(file_db.port).unwrap_or(5432),
            user: env_db.user.or(file_db.user).unwrap_or_else(|| "postgres".to_string()),
            password: env_db
                .password
                .or(file_db.password)
                .unwrap_or_else(|| "postgres".to_string()),
            name: env_db.name.or(file_db.name).unwrap_or_else(|| "akinweb".to_string()),
            ssl_mode: env_db
                .ssl_mode
                .or(file_db.ssl_mode)
                .unwrap_or_else(|| "require".to_string()),
            max_connections: env_db.max_connections.or(file_db.max_connections).unwrap_or(25),
            min_connections: env_db.min_connections.or(file_db.min_connections).unwrap_or(5),
            max_lifetime_secs: env_db
                .max_lifetime_secs
                .or(file_db.max_lifetime_secs)
                .unwrap_or(300),
        };

        Ok(ServerConfig {
            database,
            jwt_secret: env_config
                .jwt_secret
                .or(file_config.jwt_secret)
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            port: env_config.port.or(file_config.port).unwrap_or(8080),
            cors_allowed_origins: env_config
                .cors_allowed_origins
                .or(file_config.cors_allowed_origins)
                .unwrap_or_else(default_cors_allowed_origins),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(|| "logs".to_string()),
        })
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, String> {
        let ssl_mode: PgSslMode = self
            .ssl_mode
            .parse()
            .map_err(|e| format!("DB_SSLMODE {:?} is not valid: {e}", self.ssl_mode))?;

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name)
            .ssl_mode(ssl_mode);

        // Only a config file can set an empty password; it means none is sent.
        if self.password.is_empty() {
            Ok(options)
        } else {
            Ok(options.password(&self.password))
        }
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
    }
}
