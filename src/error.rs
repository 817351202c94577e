use std::fmt;

use validator::ValidationErrors;

/// Ошибки клиента. Все варианты показываются пользователю как уведомления,
/// ни один из них не завершает процесс.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Нарушено одно клиентское правило (блокирует отправку).
    #[error("{0}")]
    Validation(String),

    /// Ошибки полей формы.
    #[error("{0}")]
    InvalidForm(FormErrors),

    #[error("Please log in to continue")]
    Unauthenticated,

    #[error("Only {available} seats available")]
    InsufficientInventory { available: u32 },

    /// Ответ сервера со статусом не из 2xx.
    #[error("{}", http_message(*status, message.as_deref()))]
    Http { status: u16, message: Option<String> },

    /// Запрос упал до получения ответа.
    #[error("{0}")]
    Network(String),

    #[error("Server returned invalid response")]
    MalformedResponse(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to encode query: {0}")]
    Encoding(#[from] serde_urlencoded::ser::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn http_message(status: u16, message: Option<&str>) -> String {
    match message {
        Some(message) => message.to_string(),
        None => format!("Request failed with status {}", status),
    }
}

impl ClientError {
    /// Текст для уведомления: сообщение сервера, если оно есть,
    /// иначе `fallback` вызывающего компонента.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Http { message: None, .. } => fallback.to_string(),
            ClientError::Network(message) if message.trim().is_empty() => fallback.to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

/// Ошибки формы в порядке полей формы. Пользователь видит первую.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: Vec<(String, String)>,
}

impl FormErrors {
    /// Собирает первую ошибку каждого поля и сортирует поля по `order`.
    pub fn from_validation(errors: &ValidationErrors, order: &[&str]) -> Self {
        let mut form = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            if let Some(first) = field_errors.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                form.insert(&field.to_string(), message);
            }
        }
        form.sort_by(order);
        form
    }

    /// Добавляет или заменяет ошибку поля.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = message,
            None => self.fields.push((field.to_string(), message)),
        }
    }

    pub fn sort_by(&mut self, order: &[&str]) {
        self.fields.sort_by_key(|(name, _)| {
            order
                .iter()
                .position(|candidate| candidate == name)
                .unwrap_or(order.len())
        });
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn first(&self) -> Option<&str> {
        self.fields.first().map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn into_result(self) -> Result<(), ClientError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ClientError::InvalidForm(self))
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first().unwrap_or("Invalid form"))
    }
}
