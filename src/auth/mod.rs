//! Сессия пользователя: токен и профиль.
//!
//! [`AuthSession`] создаётся один раз в корне приложения и передаётся
//! компонентам по ссылке. Токен живёт в [`TokenStore`], при старте
//! восстанавливается через `/auth/profile`, при выходе стирается.

pub mod store;

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use crate::{
    api_client::{ApiClient, RawResponse},
    error::ClientError,
    models::{AuthResponse, ErrorBody, LoginForm, RegisterForm, User},
};

pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};

#[derive(Debug, Default, Clone)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

pub struct AuthSession {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[derive(serde::Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(serde::Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    age: u32,
}

impl AuthSession {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(SessionState::default()),
        }
    }

    fn read(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, token: Option<String>, user: Option<User>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = token;
        state.user = user;
    }

    pub fn token(&self) -> Option<String> {
        self.read().token
    }

    pub fn user(&self) -> Option<User> {
        self.read().user
    }

    pub fn is_authenticated(&self) -> bool {
        let state = self.read();
        state.token.is_some() && state.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.read().user.map(|u| u.is_admin()).unwrap_or(false)
    }

    /// Токен или [`ClientError::Unauthenticated`].
    pub fn require_token(&self) -> Result<String, ClientError> {
        self.token().ok_or(ClientError::Unauthenticated)
    }

    /// Молча восстанавливает сессию из хранилища. Отвергнутый токен стирается.
    pub async fn restore(&self) -> Result<Option<User>, ClientError> {
        let Some(token) = self.store.load()? else {
            return Ok(None);
        };

        match self.fetch_profile(&token).await {
            Ok(user) => {
                info!("Session restored for {}", user.email);
                self.set(Some(token), Some(user.clone()));
                Ok(Some(user))
            }
            Err(e) => {
                warn!("Stored token rejected: {}", e);
                self.store.clear()?;
                self.set(None, None);
                Ok(None)
            }
        }
    }

    async fn fetch_profile(&self, token: &str) -> Result<User, ClientError> {
        self.api.get_json("/auth/profile", Some(token)).await
    }

    /// Перечитывает профиль текущего пользователя.
    pub async fn profile(&self) -> Result<User, ClientError> {
        let token = self.require_token()?;
        let user = self.fetch_profile(&token).await?;
        self.set(Some(token), Some(user.clone()));
        Ok(user)
    }

    pub async fn login(&self, form: &LoginForm) -> Result<User, ClientError> {
        form.check()?;
        info!("Starting login for {}", form.email);

        let credentials = Credentials {
            email: &form.email,
            password: &form.password,
        };
        let response = self.api.post_raw("/auth/login", &credentials, None).await?;
        let auth = parse_auth_response(response, login_status_message)?;
        self.accept(auth)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<User, ClientError> {
        form.check()?;
        info!("Attempting registration for {}", form.email);

        let registration = Registration {
            name: &form.name,
            email: &form.email,
            password: &form.password,
            age: form.age.unwrap_or_default(),
        };
        let response = self.api.post_raw("/auth/register", &registration, None).await?;
        let auth = parse_auth_response(response, register_status_message)?;
        self.accept(auth)
    }

    fn accept(&self, auth: AuthResponse) -> Result<User, ClientError> {
        self.store.save(&auth.token)?;
        info!("Signed in as {}", auth.user.email);
        self.set(Some(auth.token), Some(auth.user.clone()));
        Ok(auth.user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.set(None, None);
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }
}

/// Тело разбирается до проверки статуса: неразборчивый ответ даёт отдельную ошибку
/// даже для 4xx.
fn parse_auth_response(
    response: RawResponse,
    status_message: fn(u16) -> String,
) -> Result<AuthResponse, ClientError> {
    let body: serde_json::Value = response.json()?;

    if !response.is_success() {
        let status = response.status.as_u16();
        let server_message = serde_json::from_value::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.details))
            .filter(|m| !m.trim().is_empty());
        return Err(ClientError::Http {
            status,
            message: Some(server_message.unwrap_or_else(|| status_message(status))),
        });
    }

    serde_json::from_value(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

fn login_status_message(status: u16) -> String {
    match status {
        400 => "Invalid email or password format. Please check your input.".to_string(),
        401 => "Invalid email or password. Please try again.".to_string(),
        404 => "User not found. Please check your email or register first.".to_string(),
        429 => "Too many login attempts. Please try again later.".to_string(),
        500 | 502 | 503 => "Server error. Please try again in a moment.".to_string(),
        other => format!("Login failed ({}). Please try again.", other),
    }
}

fn register_status_message(status: u16) -> String {
    match status {
        400 => "Invalid registration data. Please check all fields.".to_string(),
        409 => "Email already exists. Please use a different email or login instead.".to_string(),
        422 => "Invalid data format. Please check your input.".to_string(),
        500 | 502 | 503 => "Server error. Please try again in a moment.".to_string(),
        other => format!("Registration failed ({}). Please try again.", other),
    }
}
