use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Node IDs are packed into 10 bits of every record ID
const MAX_NODES: u16 = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub client: ClientConfig,
    pub admin: AdminSeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Node bits embedded in generated record IDs
    pub node_id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub default_page_size: u32,
}

/// Account created at startup so the back office can be logged into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeedConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                node_id: 0,
            },
            cache: CacheConfig {
                capacity: 256,
                ttl_secs: 300,
            },
            client: ClientConfig {
                api_base_url: "http://127.0.0.1:3001".to_string(),
                default_page_size: 10,
            },
            admin: AdminSeedConfig {
                name: "Administrator".to_string(),
                email: "admin@example.com".to_string(),
                password: "Admin1234".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_env("SERVER_PORT", defaults.server.port)?,
                node_id: parse_env("NODE_ID", defaults.server.node_id)?,
            },
            cache: CacheConfig {
                capacity: parse_env("CACHE_CAPACITY", defaults.cache.capacity)?,
                ttl_secs: parse_env("CACHE_TTL_SECS", defaults.cache.ttl_secs)?,
            },
            client: ClientConfig {
                api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.client.api_base_url),
                default_page_size: parse_env("PAGE_SIZE", defaults.client.default_page_size)?,
            },
            admin: AdminSeedConfig {
                name: env::var("ADMIN_NAME").unwrap_or(defaults.admin.name),
                email: env::var("ADMIN_EMAIL").unwrap_or(defaults.admin.email),
                password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin.password),
            },
        };

        if config.server.node_id >= MAX_NODES {
            anyhow::bail!("NODE_ID must be below {}", MAX_NODES);
        }
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_address(), "0.0.0.0:3001");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.client.default_page_size, 10);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        env::set_var("ESTATE_TEST_PORT", "not-a-port");
        assert!(parse_env::<u16>("ESTATE_TEST_PORT", 1).is_err());
        env::set_var("ESTATE_TEST_PORT", "8080");
        assert_eq!(parse_env::<u16>("ESTATE_TEST_PORT", 1).unwrap(), 8080);
        env::remove_var("ESTATE_TEST_PORT");
        assert_eq!(parse_env::<u16>("ESTATE_TEST_PORT", 1).unwrap(), 1);
    }
}
