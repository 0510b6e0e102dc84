use serde::{Deserialize, Serialize};

const DEFAULT_WHOIS_API_URL: &str = "https://www.whoisxmlapi.com/whoisserver/WhoisService";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub whois_api_key: Option<String>,
    pub whois_api_url: String,
    pub whois_timeout_seconds: u64,
    pub database_url: Option<String>,
    pub database_connect_timeout_ms: u64,
    pub persist_timeout_seconds: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigData {
    pub port: u16,
    #[serde(default)]
    pub whois_api_key: Option<String>,
    pub whois_api_url: String,
    pub whois_timeout_seconds: u64,
    #[serde(default)]
    pub database_url: Option<String>,
    pub database_connect_timeout_ms: u64,
    pub persist_timeout_seconds: u64,
    pub cors_origins: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Self::get_default_port(),
            whois_api_key: None,
            whois_api_url: DEFAULT_WHOIS_API_URL.to_string(),
            whois_timeout_seconds: 10,
            database_url: None,
            database_connect_timeout_ms: 1000,
            persist_timeout_seconds: 5,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl Config {
    /// Load defaults, then an optional `settings` file, then environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = Config::default();

        let mut settings = config::Config::builder()
            .set_default("port", defaults.port)?
            .set_default("whois_api_url", defaults.whois_api_url)?
            .set_default("whois_timeout_seconds", defaults.whois_timeout_seconds)?
            .set_default("database_connect_timeout_ms", defaults.database_connect_timeout_ms)?
            .set_default("persist_timeout_seconds", defaults.persist_timeout_seconds)?
            .set_default("cors_origins", DEFAULT_CORS_ORIGINS)?
            .add_source(config::File::with_name("settings").required(false));

        // Override with environment variables if present
        settings = Self::apply_env_overrides(settings)?;

        let config_data: ConfigData = settings.build()?.try_deserialize()?;

        Ok(Config {
            port: config_data.port,
            whois_api_key: non_blank(config_data.whois_api_key),
            whois_api_url: config_data.whois_api_url,
            whois_timeout_seconds: config_data.whois_timeout_seconds.max(1),
            database_url: non_blank(config_data.database_url),
            database_connect_timeout_ms: config_data.database_connect_timeout_ms,
            persist_timeout_seconds: config_data.persist_timeout_seconds.max(1),
            cors_origins: split_origins(&config_data.cors_origins),
        })
    }

    fn get_default_port() -> u16 {
        // Check common environment variables for port
        std::env::var("PORT")
            .or_else(|_| std::env::var("HTTP_PORT"))
            .or_else(|_| std::env::var("SERVER_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000)
    }

    fn apply_env_overrides(
        mut settings: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let env_mappings = [
            ("PORT", "port"),
            ("WHOIS_API_KEY", "whois_api_key"),
            ("WHOIS_API_URL", "whois_api_url"),
            ("WHOIS_TIMEOUT_SECONDS", "whois_timeout_seconds"),
            ("WHOIS_TIMEOUT", "whois_timeout_seconds"),
            ("DATABASE_URL", "database_url"),
            ("DATABASE_CONNECT_TIMEOUT_MS", "database_connect_timeout_ms"),
            ("PERSIST_TIMEOUT_SECONDS", "persist_timeout_seconds"),
            ("CORS_ORIGINS", "cors_origins"),
        ];

        for (env_var, config_key) in env_mappings {
            if let Ok(value) = std::env::var(env_var) {
                settings = settings.set_override(config_key, value)?;
            }
        }

        Ok(settings)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
