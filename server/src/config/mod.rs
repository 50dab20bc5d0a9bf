use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEVELOPMENT_JWT_SECRET: &str = "eventhub-development-secret";

#[derive(Debug, Clone)]
pub struct Config {
    /// Without a database URL the server keeps its data in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub cors_allowed_origins: String,
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            cors_allowed_origins: cors::DEFAULT_ALLOWED_ORIGINS.to_string(),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let production = env::var("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };

        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr),
            jwt_secret,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            production,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{name}: could not parse '{raw}', using the default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_memory_store() {
        let config = Config::default();
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr.port(), 3001);
        assert!(!config.production);
    }

    #[test]
    fn test_parse_var_falls_back() {
        std::env::set_var("EVENTHUB_TEST_MAX_CONN", "not-a-number");
        assert_eq!(parse_var("EVENTHUB_TEST_MAX_CONN", 7u32), 7);
        std::env::set_var("EVENTHUB_TEST_MAX_CONN", " 12 ");
        assert_eq!(parse_var("EVENTHUB_TEST_MAX_CONN", 7u32), 12);
        std::env::remove_var("EVENTHUB_TEST_MAX_CONN");
    }
}
