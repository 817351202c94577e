use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ClientError;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub notifications: NotificationConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
}

// Настройки REST API бэкенда
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Где хранится токен между запусками
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub token_path: PathBuf,
}

// Настройки уведомлений
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    pub duration_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Config {
            app: AppConfig {
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "concert_booking=info".to_string()),
            },
            api: ApiConfig {
                base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                timeout_seconds: parse_var("API_TIMEOUT_SECONDS", "30")?,
            },
            session: SessionConfig {
                token_path: env::var("TOKEN_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(".concert-booking/session.json")),
            },
            notifications: NotificationConfig {
                duration_ms: parse_var("TOAST_DURATION_MS", "5000")?,
            },
        })
    }

    /// Конфигурация для заданного адреса API, остальное по умолчанию.
    pub fn for_base_url(base_url: &str) -> Self {
        Config {
            app: AppConfig {
                environment: "development".to_string(),
                rust_log: "concert_booking=info".to_string(),
            },
            api: ApiConfig {
                base_url: base_url.to_string(),
                timeout_seconds: 30,
            },
            session: SessionConfig {
                token_path: PathBuf::from(".concert-booking/session.json"),
            },
            notifications: NotificationConfig { duration_ms: 5000 },
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ClientError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{} must be a valid number, got {:?}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_rejects_garbage() {
        env::set_var("CONCERT_TEST_BAD_NUMBER", "abc");
        let parsed: Result<u64, _> = parse_var("CONCERT_TEST_BAD_NUMBER", "1");
        assert!(matches!(parsed, Err(ClientError::Config(_))));

        let parsed: u64 = parse_var("CONCERT_TEST_MISSING_NUMBER", "42").unwrap();
        assert_eq!(parsed, 42);
    }
}
