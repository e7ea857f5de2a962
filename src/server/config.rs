use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub struct PartialServerConfig {
    pub jwt_secret: Option<String>,
    pub listen_addr: Option<String>,
    pub database_url: Option<String>,
    pub log_dir: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub token_ttl_hours: Option<i64>,
    pub bcrypt_cost: Option<u32>,
    pub max_connections: Option<u32>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_database_url() -> String {
    "sqlite://bookmarks.db?mode=rwc".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_max_connections() -> u32 {
    10
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::merge(file_config, env_config)
    }

    pub fn merge(file: PartialServerConfig, env: PartialServerConfig) -> Result<Self, String> {
        let jwt_secret = env
            .jwt_secret
            .or(file.jwt_secret)
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| "JWT_SECRET must be set".to_string())?;

        let config = ServerConfig {
            jwt_secret,
            listen_addr: env
                .listen_addr
                .or(file.listen_addr)
                .unwrap_or_else(default_listen_addr),
            database_url: env
                .database_url
                .or(file.database_url)
                .unwrap_or_else(default_database_url),
            log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
            request_timeout_secs: env
                .request_timeout_secs
                .or(file.request_timeout_secs)
                .unwrap_or_else(default_request_timeout_secs),
            token_ttl_hours: env
                .token_ttl_hours
                .or(file.token_ttl_hours)
                .unwrap_or_else(default_token_ttl_hours),
            bcrypt_cost: env
                .bcrypt_cost
                .or(file.bcrypt_cost)
                .unwrap_or_else(default_bcrypt_cost),
            max_connections: env
                .max_connections
                .or(file.max_connections)
                .unwrap_or_else(default_max_connections),
        };

        if config.request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be greater than zero".to_string());
        }
        if !(4..=31).contains(&config.bcrypt_cost) {
            return Err("BCRYPT_COST must be between 4 and 31".to_string());
        }

        Ok(config)
    }
}
