//! api_client.rs
//!
//! HTTP-граница клиента: все обращения к REST API бэкенда идут через [`ApiClient`].
//!
//! Ключевые моменты:
//! 1.  **Базовый URL** задаётся один раз в конфигурации, вызовы передают только путь.
//! 2.  **Bearer-токен** добавляется в заголовок `Authorization`, если он передан.
//! 3.  **Разбор ответов**: не-2xx превращается в [`ClientError::Http`] с сообщением
//!     из JSON-тела (`message`, `error` или `details`), сетевой сбой в
//!     [`ClientError::Network`], неразборчивое тело в [`ClientError::MalformedResponse`].

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::{
    config::ApiConfig,
    error::ClientError,
    models::ErrorBody,
};

/// Сырой ответ: статус и тело. Нужен там, где тело разбирается до проверки статуса.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Разбирает тело как JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    /// Человекочитаемое сообщение из тела ошибки, если сервер его прислал.
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .and_then(ErrorBody::into_message)
    }

    /// 2xx → разобранное тело, иначе [`ClientError::Http`].
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        if !self.is_success() {
            return Err(self.into_error());
        }
        self.json()
    }

    pub fn into_error(self) -> ClientError {
        ClientError::Http {
            status: self.status.as_u16(),
            message: self.error_message(),
        }
    }
}

/// Клиент REST API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    /// Базовый URL без завершающего слэша.
    base_url: String,
    /// Асинхронный HTTP-клиент.
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Создает и конфигурирует клиент на основе настроек приложения.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(&config.base_url, http_client))
    }

    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Content-Type", "application/json");
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Отправляет запрос и читает тело целиком. Статус не проверяется.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<RawResponse, ClientError> {
        let response = builder.send().await.map_err(|e| {
            error!("API request failed: {:?}", e);
            ClientError::from(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!("API response status={} bytes={}", status, body.len());
        Ok(RawResponse { status, body })
    }

    /// POST без проверки статуса, для мест где тело нужно разобрать в любом случае.
    pub async fn post_raw<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<RawResponse, ClientError> {
        debug!("POST {}", path);
        self.execute(self.request(Method::POST, path, token).json(body)).await
    }

    /// GET без проверки статуса.
    pub async fn get_raw(&self, path: &str, token: Option<&str>) -> Result<RawResponse, ClientError> {
        debug!("GET {}", path);
        self.execute(self.request(Method::GET, path, token)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ClientError> {
        self.get_raw(path, token).await?.into_result()
    }

    /// GET с параметрами запроса, закодированными через `serde_urlencoded`.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q, token: Option<&str>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let query = serde_urlencoded::to_string(query)?;
        self.get_json(&format!("{}?{}", path, query), token).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_raw(path, body, token).await?.into_result()
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("PUT {}", path);
        self.execute(self.request(Method::PUT, path, token).json(body))
            .await?
            .into_result()
    }

    /// DELETE; тело ответа игнорируется.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), ClientError> {
        debug!("DELETE {}", path);
        let response = self.execute(self.request(Method::DELETE, path, token)).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(response.into_error())
        }
    }
}
