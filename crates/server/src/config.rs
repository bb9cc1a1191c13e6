use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "SHIKILINK_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub listing: ListingSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    /// 单次存储调用的超时
    pub timeout_ms: u64,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    pub admin_token: String,
    // 访客地址哈希用的盐
    pub identity_salt: String,
}

#[derive(Deserialize, Clone)]
pub struct ListingSettings {
    pub page_size: u32,
    pub search_debounce_ms: u64,
}

impl DatabaseSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ListingSettings {
    pub fn to_adapter(&self) -> adapter::ListingSettings {
        adapter::ListingSettings {
            page_size: self.page_size.max(1),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load(&run_mode, collect_env_vars())
    }

    fn load(run_mode: &str, env: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/shikilink.db")?
            .set_default("database.timeout_ms", 5000)?
            .set_default("security.admin_token", "admin_secret_123")?
            .set_default("security.identity_salt", "change_me_please")?
            .set_default("listing.page_size", 9)?
            .set_default("listing.search_debounce_ms", 300)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false));

        // 环境变量优先级最高
        for (key, value) in env {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }
}

// SHIKILINK_SERVER__PORT -> server.port
fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
