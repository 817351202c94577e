//! catalog.rs
//!
//! Синхронизация списка концертов с изменяемым запросом.
//!
//! Ключевые правила:
//! 1.  **Поиск с задержкой**: после ввода текста запрос уходит только через
//!     [`SEARCH_DEBOUNCE`] тишины. Каждое нажатие перезапускает таймер.
//! 2.  **Вытеснение**: новый запрос отменяет предыдущий. Только последний
//!     выпущенный запрос может заменить список; результат вытесненного
//!     отбрасывается молча.
//! 3.  **Догрузка**: `load_more` добавляет следующую страницу в конец списка и
//!     не запускается, пока что-то уже грузится или страниц больше нет.
//!
//! Сетевые задачи крутятся в фоне ([`TaskHandle`]), их результаты приходят в
//! канал и применяются владельцем контроллера через [`CatalogController::next_event`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::{
    api_client::ApiClient,
    auth::AuthSession,
    error::ClientError,
    models::{CatalogPage, CatalogQuery, Concert, DateRange, SortKey, StatusFilter},
    notifications::Notifier,
    services::task::TaskHandle,
};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

const LOAD_FAILED: &str = "Failed to load concerts. Please try again.";

/// Источник страниц каталога.
pub trait CatalogSource: Clone + Send + Sync + 'static {
    fn fetch_page(&self, query: CatalogQuery) -> impl Future<Output = Result<CatalogPage, ClientError>> + Send + 'static;
}

/// GET /concerts. Токен необязателен и берётся из сессии при каждом запросе.
#[derive(Clone, Debug)]
pub struct ApiCatalogSource {
    api: ApiClient,
    session: Arc<AuthSession>,
}

impl ApiCatalogSource {
    pub fn new(api: ApiClient, session: Arc<AuthSession>) -> Self {
        Self { api, session }
    }
}

impl CatalogSource for ApiCatalogSource {
    fn fetch_page(&self, query: CatalogQuery) -> impl Future<Output = Result<CatalogPage, ClientError>> + Send + 'static {
        let api = self.api.clone();
        let token = self.session.token();
        async move {
            let path = format!("/concerts?{}", query.to_query_string()?);
            api.get_json(&path, token.as_deref()).await
        }
    }
}

/// GET /concerts/{id}.
pub async fn get_concert(api: &ApiClient, id: i64, token: Option<&str>) -> Result<Concert, ClientError> {
    api.get_json(&format!("/concerts/{}", id), token).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPhase {
    Idle,
    /// Свежая загрузка первой страницы (сброс, сортировка, фильтры).
    Fetching,
    /// Ждём окончания ввода или ответа на поиск.
    Searching,
    LoadingMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    Replace,
    Append,
}

enum Message {
    DebounceElapsed {
        generation: u64,
    },
    Settled {
        generation: u64,
        merge: Merge,
        result: Result<CatalogPage, ClientError>,
    },
}

/// Что произошло после очередного сообщения.
#[derive(Debug)]
pub enum CatalogEvent {
    /// Задержка ввода истекла, ушёл запрос поиска.
    SearchIssued { search_text: String },
    Replaced { count: usize },
    Appended { count: usize },
    /// Ответ на устаревший запрос, выброшен.
    Superseded { generation: u64 },
    Failed(ClientError),
}

pub struct CatalogController<S: CatalogSource> {
    source: S,
    notifier: Notifier,
    query: CatalogQuery,
    items: Vec<Concert>,
    total_count: u64,
    has_next_page: bool,
    phase: CatalogPhase,
    generation: u64,
    request: Option<TaskHandle>,
    debounce: Option<TaskHandle>,
    debounce_window: Duration,
    sender: UnboundedSender<Message>,
    receiver: UnboundedReceiver<Message>,
}

impl<S: CatalogSource> CatalogController<S> {
    pub fn new(source: S, notifier: Notifier) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            source,
            notifier,
            query: CatalogQuery::default(),
            items: Vec::new(),
            total_count: 0,
            has_next_page: false,
            phase: CatalogPhase::Idle,
            generation: 0,
            request: None,
            debounce: None,
            debounce_window: SEARCH_DEBOUNCE,
            sender,
            receiver,
        }
    }

    /// Начальный запрос без загрузки; загрузку запускает `refresh`.
    pub fn with_query(mut self, query: CatalogQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    pub fn items(&self) -> &[Concert] {
        &self.items
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn phase(&self) -> CatalogPhase {
        self.phase
    }

    pub fn can_load_more(&self) -> bool {
        self.phase == CatalogPhase::Idle && self.debounce.is_none() && self.has_next_page
    }

    /// Текст поиска изменился: текущий запрос отменяется, таймер перезапускается.
    pub fn set_search_text(&mut self, text: &str) {
        self.request = None;
        self.query.search_text = text.to_string();
        self.query.page = 1;

        self.generation += 1;
        let window = self.debounce_window;
        self.debounce = Some(TaskHandle::spawn(
            self.generation,
            tokio::time::sleep(window),
            self.sender.clone(),
            |generation, ()| Message::DebounceElapsed { generation },
        ));
        self.phase = CatalogPhase::Searching;
    }

    /// Сброс на первую страницу и немедленная загрузка.
    pub fn refresh(&mut self) {
        self.debounce = None;
        self.query.page = 1;
        self.issue(1, Merge::Replace, CatalogPhase::Fetching);
    }

    pub fn set_sort(&mut self, sort_key: SortKey) {
        self.query.sort_key = sort_key;
        self.refresh();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.query.status = status;
        self.refresh();
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.query.date_range = range;
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.query = CatalogQuery::default();
        self.refresh();
    }

    /// Следующая страница в конец списка. `false`, если догрузка сейчас запрещена.
    pub fn load_more(&mut self) -> bool {
        if !self.can_load_more() {
            debug!(
                "load_more suppressed: phase={:?}, debounce_pending={}, has_next={}",
                self.phase,
                self.debounce.is_some(),
                self.has_next_page
            );
            return false;
        }
        let next = self.query.page + 1;
        self.issue(next, Merge::Append, CatalogPhase::LoadingMore);
        true
    }

    /// Убирает концерт из показанного списка (после удаления на сервере).
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.id != id);
        let removed = self.items.len() < before;
        if removed {
            self.total_count = self.total_count.saturating_sub(1);
        }
        removed
    }

    fn issue(&mut self, page: u32, merge: Merge, phase: CatalogPhase) {
        self.generation += 1;
        let query = self.query.for_page(page);
        debug!("catalog request #{}: {:?} page={}", self.generation, merge, page);

        let future = self.source.fetch_page(query);
        // Старый хэндл удаляется при замене и тем самым вытесняется.
        self.request = Some(TaskHandle::spawn(
            self.generation,
            future,
            self.sender.clone(),
            move |generation, result| Message::Settled {
                generation,
                merge,
                result,
            },
        ));
        self.phase = phase;
    }

    fn is_current_request(&self, generation: u64) -> bool {
        self.request
            .as_ref()
            .map(|r| r.generation() == generation)
            .unwrap_or(false)
    }

    /// Ждёт и применяет следующее сообщение. `None`, если ждать нечего.
    pub async fn next_event(&mut self) -> Option<CatalogEvent> {
        loop {
            if self.phase == CatalogPhase::Idle && self.debounce.is_none() {
                return None;
            }
            let message = self.receiver.recv().await?;

            match message {
                Message::DebounceElapsed { generation } => {
                    let current = self.debounce.as_ref().map(|d| d.generation()) == Some(generation);
                    if !current {
                        continue;
                    }
                    self.debounce = None;
                    self.issue(1, Merge::Replace, CatalogPhase::Searching);
                    return Some(CatalogEvent::SearchIssued {
                        search_text: self.query.search_text.clone(),
                    });
                }
                Message::Settled { generation, merge, result } => {
                    if !self.is_current_request(generation) {
                        debug!("catalog request #{} superseded, result dropped", generation);
                        return Some(CatalogEvent::Superseded { generation });
                    }
                    self.request = None;
                    self.phase = CatalogPhase::Idle;
                    return Some(self.apply(merge, result));
                }
            }
        }
    }

    fn apply(&mut self, merge: Merge, result: Result<CatalogPage, ClientError>) -> CatalogEvent {
        match result {
            Ok(page) => {
                let count = page.items.len();
                self.total_count = page.total_count;
                self.has_next_page = page.has_next_page;
                match merge {
                    Merge::Replace => {
                        self.query.page = 1;
                        self.items = page.items;
                        CatalogEvent::Replaced { count }
                    }
                    Merge::Append => {
                        self.query.page += 1;
                        self.items.extend(page.items);
                        CatalogEvent::Appended { count }
                    }
                }
            }
            Err(e) => {
                error!("Error fetching concerts: {}", e);
                self.notifier.error(LOAD_FAILED);
                CatalogEvent::Failed(e)
            }
        }
    }

    /// Крутит `next_event`, пока всё не успокоится. Возвращает последнюю ошибку, если была.
    pub async fn settle(&mut self) -> Result<(), ClientError> {
        let mut last_error = None;
        while let Some(event) = self.next_event().await {
            if let CatalogEvent::Failed(e) = event {
                last_error = Some(e);
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
