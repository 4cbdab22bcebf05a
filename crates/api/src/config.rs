//! Application configuration loaded from environment variables.

/// Server and database configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `DATABASE_HOST` — PostgreSQL host (default: `"localhost"`)
/// - `DATABASE_PORT` — PostgreSQL port (default: `5432`)
/// - `DATABASE_USER` — PostgreSQL user (default: `"postgres"`)
/// - `DATABASE_PASSWORD` — PostgreSQL password (default: `"postgres"`)
/// - `DATABASE_NAME` — database name (default: `"agro"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_host: String,
    pub database_port: u16,
    pub database_user: String,
    pub database_password: String,
    pub database_name: String,
    pub log_level: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_host: env_or("DATABASE_HOST", "localhost"),
            database_port: std::env::var("DATABASE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            database_user: env_or("DATABASE_USER", "postgres"),
            database_password: env_or("DATABASE_PASSWORD", "postgres"),
            database_name: env_or("DATABASE_NAME", "agro"),
            log_level: env_or("RUST_LOG", "info"),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Assembles the PostgreSQL connection string.
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.database_user,
            self.database_password,
            self.database_host,
            self.database_port,
            self.database_name
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_host: "localhost".to_string(),
            database_port: 5432,
            database_user: "postgres".to_string(),
            database_password: "postgres".to_string(),
            database_name: "agro".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_port, 5432);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_database_url() {
        let config = Config {
            database_host: "db".to_string(),
            database_port: 5433,
            database_user: "app".to_string(),
            database_password: "secret".to_string(),
            database_name: "agro_test".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.database_url(),
            "postgres://app:secret@db:5433/agro_test"
        );
    }
}
