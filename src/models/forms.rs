//! Формы ввода: вход, регистрация, концерт (админка).
//!
//! Правила описаны через `validator`; порядок полей задаёт, какая ошибка
//! показывается первой. Строки обрезаются по краям до проверки.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use super::{Concert, ConcertStatus};
use crate::error::{ClientError, FormErrors};

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginForm {
    #[validate(contains(pattern = "@", message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl LoginForm {
    const FIELDS: &'static [&'static str] = &["email", "password"];

    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn check(&self) -> Result<(), ClientError> {
        let mut errors = collect(self.validate(), Self::FIELDS);
        require(&mut errors, "email", &self.email, "Email is required");
        require(&mut errors, "password", &self.password, "Password is required");
        errors.sort_by(Self::FIELDS);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(skip)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[validate(
        required(message = "Age is required"),
        range(min = 1, max = 120, message = "Please enter a valid age between 1 and 120")
    )]
    pub age: Option<u32>,
}

impl RegisterForm {
    const FIELDS: &'static [&'static str] = &["name", "email", "password", "confirm_password", "age"];

    pub fn new(name: &str, email: &str, password: &str, confirm_password: &str, age: Option<u32>) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
            age,
        }
    }

    pub fn check(&self) -> Result<(), ClientError> {
        let mut errors = collect(self.validate(), Self::FIELDS);
        require(&mut errors, "name", &self.name, "Name is required");
        require(&mut errors, "email", &self.email, "Email is required");
        require(&mut errors, "password", &self.password, "Password is required");
        require(&mut errors, "confirm_password", &self.confirm_password, "Please confirm your password");
        errors.sort_by(Self::FIELDS);
        errors.into_result()
    }
}

fn collect(result: Result<(), validator::ValidationErrors>, order: &[&str]) -> FormErrors {
    match result {
        Ok(()) => FormErrors::default(),
        Err(errors) => FormErrors::from_validation(&errors, order),
    }
}

// Пустое поле: "обязательно" важнее любых других правил этого поля.
fn require(errors: &mut FormErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

/// Форма создания/редактирования концерта.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ConcertForm {
    #[validate(length(min = 1, message = "Concert name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 1, message = "Price must be greater than 0"))]
    pub price: i64,
    #[validate(length(min = 1, message = "Venue/place is required"))]
    pub place: String,
    #[validate(range(min = 1, message = "Seat count must be greater than 0"))]
    pub seat_count: u32,
    #[validate(range(max = 100, message = "Discount must be between 0 and 100"))]
    pub discount: u32,
    #[validate(required(message = "Event start date is required"))]
    pub event_date: Option<DateTime<Utc>>,
    #[validate(required(message = "Event end date is required"))]
    pub event_end: Option<DateTime<Utc>>,
    pub status: ConcertStatus,
}

impl Default for ConcertForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: 0,
            place: String::new(),
            seat_count: 0,
            discount: 0,
            event_date: None,
            event_end: None,
            status: ConcertStatus::Active,
        }
    }
}

impl From<&Concert> for ConcertForm {
    fn from(concert: &Concert) -> Self {
        Self {
            name: concert.name.clone(),
            description: concert.description.clone(),
            price: concert.unit_price,
            place: concert.venue.clone(),
            seat_count: concert.total_seats,
            discount: concert.discount_percent,
            event_date: Some(concert.event_start),
            event_end: Some(concert.event_end),
            status: concert.status,
        }
    }
}

impl ConcertForm {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "price",
        "place",
        "seat_count",
        "discount",
        "event_date",
        "event_end",
    ];

    /// Обрезает пробелы в текстовых полях.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.place = self.place.trim().to_string();
        self
    }

    /// Проверка полей и расписания. `now` передаётся явно: дата начала должна быть в будущем.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), ClientError> {
        let mut errors = collect(self.validate(), Self::FIELDS);

        if let (Some(start), Some(end)) = (self.event_date, self.event_end) {
            if end <= start {
                errors.insert("event_end", "End date must be after start date");
            }
            if start <= now {
                errors.insert("event_date", "Event date must be in the future");
            }
        }

        errors.sort_by(Self::FIELDS);
        errors.into_result()
    }
}
