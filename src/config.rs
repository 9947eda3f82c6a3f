//! Configuration management for the PDF form editor

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; `None` allows any origin
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Request body limit for uploads, in megabytes
    pub max_upload_mb: usize,
}

impl UploadConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                cors_origin: None,
            },
            database: DatabaseConfig {
                url: "sqlite:./pdf_forms.db".to_string(),
                max_connections: 5,
            },
            upload: UploadConfig { max_upload_mb: 50 },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
                cors_origin: env::var("CORS_ORIGIN")
                    .ok()
                    .filter(|origin| !origin.is_empty() && origin != "*"),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.database.max_connections)?,
            },
            upload: UploadConfig {
                max_upload_mb: parse_var("MAX_UPLOAD_MB", defaults.upload.max_upload_mb)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_limit_in_bytes() {
        let upload = UploadConfig { max_upload_mb: 2 };
        assert_eq!(upload.max_upload_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("PDF_FORMS_TEST_PORT", "not-a-port");
        let result: Result<u16, _> = parse_var("PDF_FORMS_TEST_PORT", 1);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "PDF_FORMS_TEST_PORT", .. })
        ));
        env::remove_var("PDF_FORMS_TEST_PORT");

        let fallback: u16 = parse_var("PDF_FORMS_TEST_UNSET", 7).unwrap();
        assert_eq!(fallback, 7);
    }
}
