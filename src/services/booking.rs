//! booking.rs
//!
//! Оформление брони на один концерт.
//!
//! Жизненный цикл попытки: `Idle → Validating → Submitting → {Succeeded, Failed}`.
//! После неудачи поток возвращается в `Idle`, чтобы пользователь мог повторить.
//! Автоматических повторов нет. Метод `submit` берёт `&mut self`, поэтому
//! один экземпляр не может отправить две брони одновременно; гонку между
//! разными экземплярами разрешает сервер.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    api_client::ApiClient,
    auth::AuthSession,
    error::ClientError,
    models::{Booking, BookingConfirmation, BookingRequest, BookingsPage, BookingsQuery, Concert},
    notifications::Notifier,
    services::pricing::{self, Quote},
};

pub const BOOKINGS_PAGE_SIZE: u32 = 10;

const BOOKING_FAILED: &str = "Failed to create booking";

#[derive(Debug, Clone, PartialEq)]
pub enum BookingState {
    Idle,
    Validating,
    Submitting,
    /// Бронь создана, окно закрыто.
    Succeeded(BookingConfirmation),
}

type SuccessCallback = Box<dyn FnMut(&BookingConfirmation) + Send>;

pub struct BookingFlow {
    api: ApiClient,
    session: Arc<AuthSession>,
    notifier: Notifier,
    concert: Concert,
    ticket_count: u32,
    state: BookingState,
    last_error: Option<String>,
    on_success: Option<SuccessCallback>,
}

impl std::fmt::Debug for BookingFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingFlow")
            .field("concert_id", &self.concert.id)
            .field("ticket_count", &self.ticket_count)
            .field("state", &self.state)
            .finish()
    }
}

impl BookingFlow {
    pub fn new(api: ApiClient, session: Arc<AuthSession>, notifier: Notifier, concert: Concert) -> Self {
        Self {
            api,
            session,
            notifier,
            concert,
            ticket_count: 1,
            state: BookingState::Idle,
            last_error: None,
            on_success: None,
        }
    }

    /// Колбэк после успешной брони (обычно обновить каталог).
    pub fn on_success(mut self, callback: impl FnMut(&BookingConfirmation) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn concert(&self) -> &Concert {
        &self.concert
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn ticket_count(&self) -> u32 {
        self.ticket_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn available_seats(&self) -> u32 {
        self.concert.available_seats()
    }

    /// Бронирование вообще возможно: есть места и нет отправки в процессе.
    pub fn can_submit(&self) -> bool {
        self.available_seats() > 0 && self.state == BookingState::Idle
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, BookingState::Succeeded(_))
    }

    /// Значения вне `[1, available]` игнорируются, как в поле ввода.
    pub fn set_ticket_count(&mut self, count: u32) -> bool {
        if count >= 1 && count <= self.available_seats() {
            self.ticket_count = count;
            true
        } else {
            false
        }
    }

    pub fn quote(&self) -> Quote {
        pricing::quote(&self.concert, self.ticket_count)
    }

    /// Отправляет бронь на `ticket_count` билетов.
    pub async fn submit(&mut self) -> Result<BookingConfirmation, ClientError> {
        let count = self.ticket_count;
        self.submit_count(count).await
    }

    /// Отправляет бронь на `count` билетов без ограничений поля ввода.
    pub async fn submit_count(&mut self, count: u32) -> Result<BookingConfirmation, ClientError> {
        self.state = BookingState::Validating;
        self.last_error = None;

        let token = match self.validate(count) {
            Ok(token) => token,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = BookingState::Submitting;
        let request = BookingRequest {
            concert_id: self.concert.id,
            ticket_count: count,
        };
        info!("Submitting booking: concert_id={}, ticket_count={}", request.concert_id, count);

        match self.api.post_json::<BookingConfirmation, _>("/bookings", &request, Some(&token)).await {
            Ok(confirmation) => {
                info!("Booking created: {:?}", confirmation.id);
                self.notifier
                    .success(format!("Successfully booked {} ticket(s)!", count));
                self.ticket_count = 1;
                self.state = BookingState::Succeeded(confirmation.clone());
                if let Some(callback) = self.on_success.as_mut() {
                    callback(&confirmation);
                }
                Ok(confirmation)
            }
            Err(e) => {
                error!("Error creating booking: {}", e);
                Err(self.fail(e))
            }
        }
    }

    /// Проверки по порядку, первая неудача выигрывает.
    fn validate(&self, count: u32) -> Result<String, ClientError> {
        let token = self.session.require_token()?;
        if count == 0 {
            return Err(ClientError::Validation("Please select at least 1 ticket".to_string()));
        }
        let available = self.available_seats();
        if count > available {
            return Err(ClientError::InsufficientInventory { available });
        }
        Ok(token)
    }

    fn fail(&mut self, e: ClientError) -> ClientError {
        let message = match &e {
            ClientError::Unauthenticated => "Please log in to make a booking".to_string(),
            other => other.user_message(BOOKING_FAILED),
        };
        warn!("Booking attempt failed: {}", message);
        self.notifier.error(message.clone());
        self.last_error = Some(message);
        self.state = BookingState::Idle;
        e
    }
}

/// Список бронирований. Администратор видит все, остальные только свои.
pub async fn list_bookings(
    api: &ApiClient,
    session: &AuthSession,
    page: u32,
) -> Result<BookingsPage, ClientError> {
    let token = session.require_token()?;
    let user_id = match session.user() {
        Some(user) if user.is_admin() => None,
        Some(user) => Some(user.id),
        None => return Err(ClientError::Unauthenticated),
    };
    let query = BookingsQuery {
        page: page.max(1),
        limit: BOOKINGS_PAGE_SIZE,
        user_id,
    };
    api.get_with_query("/bookings", &query, Some(&token)).await
}

/// Итоговая сумма по странице бронирований.
pub fn page_revenue(bookings: &[Booking]) -> i64 {
    bookings.iter().map(|b| b.total_price).sum()
}
