use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Тело POST /bookings. Живёт одну отправку.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub concert_id: i64,
    pub ticket_count: u32,
}

/// Ответ сервера на успешное бронирование. Клиенту нужны только
/// несколько полей для показа, остальное хранится как есть.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingConfirmation {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub ticket_count: Option<u32>,
    #[serde(default)]
    pub total_price: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingConcert {
    pub id: i64,
    pub name: String,
    #[serde(rename = "place", default)]
    pub venue: String,
    #[serde(rename = "event_date", default)]
    pub event_start: Option<DateTime<Utc>>,
}

/// Строка в списке бронирований.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub concert_id: i64,
    pub ticket_count: u32,
    pub total_price: i64,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub booking_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<BookingUser>,
    #[serde(default)]
    pub concert: Option<BookingConcert>,
}

impl Booking {
    pub fn customer(&self) -> String {
        match &self.user {
            Some(user) => user.name.clone(),
            None => format!("User {}", self.user_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingsPage {
    pub data: Vec<Booking>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Параметры GET /bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingsQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}
