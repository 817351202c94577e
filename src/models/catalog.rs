use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Concert;
use crate::error::ClientError;

pub const CATALOG_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    EventDate,
    CreatedAt,
    Name,
    Price,
    PriceDesc,
    SeatAvailable,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::EventDate => "event_date",
            SortKey::CreatedAt => "created_at",
            SortKey::Name => "name",
            SortKey::Price => "price",
            SortKey::PriceDesc => "price_desc",
            SortKey::SeatAvailable => "seat_available",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event_date" => Ok(SortKey::EventDate),
            "created_at" => Ok(SortKey::CreatedAt),
            "name" => Ok(SortKey::Name),
            "price" => Ok(SortKey::Price),
            "price_desc" => Ok(SortKey::PriceDesc),
            "seat_available" => Ok(SortKey::SeatAvailable),
            other => Err(ClientError::Validation(format!("Unknown sort key: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
    Cancelled,
}

impl StatusFilter {
    fn param(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some("active"),
            StatusFilter::Inactive => Some("inactive"),
            StatusFilter::Cancelled => Some("cancelled"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            "cancelled" => Ok(StatusFilter::Cancelled),
            other => Err(ClientError::Validation(format!("Unknown status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Текущий запрос каталога. Меняется пользователем и определяет, что грузить.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search_text: String,
    pub page: u32,
    pub page_size: u32,
    pub sort_key: SortKey,
    pub status: StatusFilter,
    pub date_range: Option<DateRange>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            page: 1,
            page_size: CATALOG_PAGE_SIZE,
            sort_key: SortKey::default(),
            status: StatusFilter::default(),
            date_range: None,
        }
    }
}

#[derive(Serialize)]
struct CatalogParams<'a> {
    page: u32,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    sort_by: &'static str,
}

impl CatalogQuery {
    /// Копия запроса для конкретной страницы.
    pub fn for_page(&self, page: u32) -> CatalogQuery {
        CatalogQuery {
            page,
            ..self.clone()
        }
    }

    /// Строка параметров для GET /concerts. Пустой поиск и статус "all" не передаются.
    pub fn to_query_string(&self) -> Result<String, ClientError> {
        let search = self.search_text.trim();
        let params = CatalogParams {
            page: self.page,
            limit: self.page_size,
            search: (!search.is_empty()).then_some(search),
            start_date: self.date_range.and_then(|r| r.start),
            end_date: self.date_range.and_then(|r| r.end),
            status: self.status.param(),
            sort_by: self.sort_key.as_str(),
        };
        Ok(serde_urlencoded::to_string(&params)?)
    }
}

/// Одна страница каталога.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogPage {
    #[serde(rename = "data")]
    pub items: Vec<Concert>,
    #[serde(rename = "total", default)]
    pub total_count: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(rename = "has_next", default)]
    pub has_next_page: bool,
}
