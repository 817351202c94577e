use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcertStatus {
    #[default]
    Active,
    Inactive,
    Cancelled,
}

impl ConcertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcertStatus::Active => "active",
            ConcertStatus::Inactive => "inactive",
            ConcertStatus::Cancelled => "cancelled",
        }
    }
}

/// Концерт в том виде, в каком его отдаёт сервер.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concert {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "price")]
    pub unit_price: i64,
    #[serde(rename = "place")]
    pub venue: String,
    #[serde(rename = "seat_count")]
    pub total_seats: u32,
    #[serde(rename = "seat_booked", default)]
    pub booked_seats: u32,
    #[serde(rename = "discount", default)]
    pub discount_percent: u32,
    #[serde(rename = "event_date")]
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    #[serde(default)]
    pub status: ConcertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Можно ли сейчас бронировать концерт.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    SoldOut,
    Unavailable,
    Past,
}

impl Availability {
    pub fn label(&self) -> &'static str {
        match self {
            Availability::Available => "Book Now",
            Availability::SoldOut => "Sold Out",
            Availability::Unavailable => "Unavailable",
            Availability::Past => "Event Ended",
        }
    }
}

impl Concert {
    /// Свободные места. Если сервер прислал booked > total, это ошибка данных:
    /// логируем и считаем, что мест нет.
    pub fn available_seats(&self) -> u32 {
        if self.booked_seats > self.total_seats {
            warn!(
                "Concert {} has {} booked seats out of {}",
                self.id, self.booked_seats, self.total_seats
            );
            return 0;
        }
        self.total_seats - self.booked_seats
    }

    pub fn availability(&self, now: DateTime<Utc>) -> Availability {
        if self.event_start < now {
            Availability::Past
        } else if self.available_seats() == 0 {
            Availability::SoldOut
        } else if self.status != ConcertStatus::Active {
            Availability::Unavailable
        } else {
            Availability::Available
        }
    }

    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.availability(now) == Availability::Available
    }
}
