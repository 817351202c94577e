mod common;

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concert_booking::{
    auth::MemoryTokenStore,
    error::ClientError,
    models::{CatalogPage, CatalogQuery, Concert, SortKey},
    notifications::Notifier,
    services::catalog::{CatalogController, CatalogEvent, CatalogPhase, CatalogSource},
};

type Latency = Arc<dyn Fn(&CatalogQuery) -> Duration + Send + Sync>;

/// Источник в памяти: фильтрует по подстроке имени и режет на страницы.
#[derive(Clone)]
struct FakeSource {
    concerts: Arc<Vec<Concert>>,
    calls: Arc<Mutex<Vec<CatalogQuery>>>,
    latency: Latency,
    fail: bool,
}

impl FakeSource {
    fn new(concerts: Vec<Concert>) -> Self {
        Self {
            concerts: Arc::new(concerts),
            calls: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::new(|_: &CatalogQuery| Duration::from_millis(50)),
            fail: false,
        }
    }

    fn with_latency(mut self, latency: impl Fn(&CatalogQuery) -> Duration + Send + Sync + 'static) -> Self {
        self.latency = Arc::new(latency);
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn calls(&self) -> Vec<CatalogQuery> {
        self.calls.lock().unwrap().clone()
    }
}

impl CatalogSource for FakeSource {
    fn fetch_page(&self, query: CatalogQuery) -> impl Future<Output = Result<CatalogPage, ClientError>> + Send + 'static {
        self.calls.lock().unwrap().push(query.clone());
        let this = self.clone();
        async move {
            let latency = (this.latency)(&query);
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if this.fail {
                return Err(ClientError::Http { status: 500, message: None });
            }
            let mut matching: Vec<&Concert> = this
                .concerts
                .iter()
                .filter(|c| query.search_text.is_empty() || c.name.contains(&query.search_text))
                .collect();
            // Цены в наборе одинаковые; price_desc просто разворачивает порядок.
            if query.sort_key == SortKey::PriceDesc {
                matching.reverse();
            }
            let start = ((query.page - 1) * query.page_size) as usize;
            let items: Vec<Concert> = matching
                .iter()
                .skip(start)
                .take(query.page_size as usize)
                .map(|c| (*c).clone())
                .collect();
            Ok(CatalogPage {
                total_count: matching.len() as u64,
                page: query.page,
                limit: query.page_size,
                has_next_page: start + items.len() < matching.len(),
                items,
            })
        }
    }
}

fn lineup(count: usize) -> Vec<Concert> {
    (0..count)
        .map(|i| {
            let mut concert = common::concert(i as i64 + 1, 100, 0, 100000, 0);
            concert.name = if i % 2 == 0 {
                format!("Rock Night {}", i)
            } else {
                format!("Jazz Evening {}", i)
            };
            concert
        })
        .collect()
}

async fn drain(controller: &mut CatalogController<FakeSource>) -> Vec<CatalogEvent> {
    let mut events = Vec::new();
    while let Some(event) = controller.next_event().await {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn typing_issues_one_search_after_quiet_period() {
    let source = FakeSource::new(lineup(10));
    let mut controller = CatalogController::new(source.clone(), Notifier::default());

    for text in ["R", "Ro", "Roc"] {
        controller.set_search_text(text);
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    controller.set_search_text("Rock");
    let last_keystroke = Instant::now();
    assert_eq!(controller.phase(), CatalogPhase::Searching);
    assert!(source.calls().is_empty());

    match controller.next_event().await {
        Some(CatalogEvent::SearchIssued { search_text }) => assert_eq!(search_text, "Rock"),
        other => panic!("expected search to be issued, got {:?}", other),
    }
    assert_eq!(Instant::now() - last_keystroke, Duration::from_millis(500));

    let events = drain(&mut controller).await;
    assert!(matches!(events.as_slice(), [CatalogEvent::Replaced { count: 5 }]));

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search_text, "Rock");
    assert_eq!(calls[0].page, 1);
    assert!(controller.items().iter().all(|c| c.name.contains("Rock")));
    assert_eq!(controller.phase(), CatalogPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn newer_request_wins_over_slower_older_one() {
    let source = FakeSource::new(lineup(4)).with_latency(|query| match query.sort_key {
        SortKey::EventDate => Duration::from_millis(300),
        _ => Duration::from_millis(50),
    });
    let mut controller = CatalogController::new(source.clone(), Notifier::default());

    controller.refresh();
    controller.set_sort(SortKey::PriceDesc);
    assert_eq!(controller.phase(), CatalogPhase::Fetching);

    let events = drain(&mut controller).await;
    assert!(matches!(events.as_slice(), [CatalogEvent::Replaced { count: 4 }]));
    assert_eq!(controller.query().sort_key, SortKey::PriceDesc);

    // Старый запрос успел бы ответить через 300 мс; его результат не должен появиться.
    tokio::time::advance(Duration::from_millis(500)).await;
    assert!(controller.next_event().await.is_none());
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn already_delivered_stale_result_is_discarded() {
    let source = FakeSource::new(lineup(3)).with_latency(|_| Duration::ZERO);
    let mut controller = CatalogController::new(source.clone(), Notifier::default());

    controller.refresh();
    // Первый запрос успевает завершиться и положить результат в канал.
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    controller.set_sort(SortKey::PriceDesc);

    let events = drain(&mut controller).await;
    assert!(
        matches!(
            events.as_slice(),
            [CatalogEvent::Superseded { generation: 1 }, CatalogEvent::Replaced { count: 3 }]
        ),
        "unexpected events: {:?}",
        events
    );

    let ids: Vec<i64> = controller.items().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(controller.query().sort_key, SortKey::PriceDesc);
}

#[tokio::test(start_paused = true)]
async fn keystroke_cancels_in_flight_fetch() {
    let source = FakeSource::new(lineup(6)).with_latency(|_| Duration::from_millis(300));
    let mut controller = CatalogController::new(source.clone(), Notifier::default());

    controller.refresh();
    tokio::time::advance(Duration::from_millis(100)).await;
    controller.set_search_text("Jazz");

    let events = drain(&mut controller).await;
    assert!(matches!(
        events.as_slice(),
        [CatalogEvent::SearchIssued { .. }, CatalogEvent::Replaced { count: 3 }]
    ));
    assert!(controller.items().iter().all(|c| c.name.starts_with("Jazz")));
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn load_more_appends_pages_until_exhausted() {
    let source = FakeSource::new(lineup(30));
    let mut controller = CatalogController::new(source.clone(), Notifier::default());

    controller.refresh();
    controller.settle().await.unwrap();
    assert_eq!(controller.items().len(), 12);
    assert!(controller.has_next_page());

    assert!(controller.load_more());
    assert_eq!(controller.phase(), CatalogPhase::LoadingMore);
    // Вторая догрузка, пока первая в пути, подавляется.
    assert!(!controller.load_more());
    controller.settle().await.unwrap();
    assert_eq!(controller.items().len(), 24);
    assert_eq!(controller.query().page, 2);

    let ids: Vec<i64> = controller.items().iter().map(|c| c.id).collect();
    assert_eq!(ids, (1..=24).collect::<Vec<i64>>());

    assert!(controller.load_more());
    controller.settle().await.unwrap();
    assert_eq!(controller.items().len(), 30);
    assert!(!controller.has_next_page());
    assert!(!controller.load_more());

    let pages: Vec<u32> = source.calls().iter().map(|q| q.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn load_more_is_refused_while_search_is_pending() {
    let source = FakeSource::new(lineup(30));
    let mut controller = CatalogController::new(source.clone(), Notifier::default());

    controller.refresh();
    controller.settle().await.unwrap();
    controller.set_search_text("Rock");
    assert!(!controller.can_load_more());
    assert!(!controller.load_more());

    controller.settle().await.unwrap();
    // Поиск начинает с первой страницы и заменяет список.
    assert_eq!(controller.items().len(), 12);
    assert_eq!(controller.total_count(), 15);
    assert_eq!(controller.query().page, 1);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_notifies_and_keeps_items() {
    let notifier = Notifier::default();
    let source = FakeSource::new(lineup(3)).failing();
    let mut controller = CatalogController::new(source, notifier.clone());

    controller.refresh();
    let err = controller.settle().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(controller.items().is_empty());
    assert_eq!(controller.phase(), CatalogPhase::Idle);

    let messages: Vec<String> = notifier.active().into_iter().map(|n| n.message).collect();
    assert_eq!(messages, vec!["Failed to load concerts. Please try again.".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn removed_concert_disappears_from_list() {
    let source = FakeSource::new(lineup(3));
    let mut controller = CatalogController::new(source, Notifier::default());
    controller.refresh();
    controller.settle().await.unwrap();

    assert!(controller.remove(2));
    assert!(!controller.remove(2));
    assert_eq!(controller.items().len(), 2);
    assert_eq!(controller.total_count(), 2);
}

#[tokio::test]
async fn api_source_sends_query_parameters() {
    let server = MockServer::start().await;
    let ctx = common::guest(&server);
    let concert = common::concert(7, 100, 40, 150000, 10);

    Mock::given(method("GET"))
        .and(path("/concerts"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "12"))
        .and(query_param("sort_by", "price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [common::concert_json(&concert)],
            "total": 1,
            "page": 1,
            "limit": 12,
            "has_next": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = ctx.catalog();
    controller.set_sort(SortKey::Price);
    controller.settle().await.expect("catalog loads");

    assert_eq!(controller.items().len(), 1);
    assert_eq!(controller.items()[0].available_seats(), 60);
    assert!(!controller.has_next_page());
}

#[tokio::test]
async fn api_source_uses_token_from_later_sign_in() {
    let server = MockServer::start().await;
    let ctx = common::context(&server, Arc::new(MemoryTokenStore::with_token(common::TOKEN)));
    // Контроллер создан до входа, токен появляется в сессии позже.
    let mut controller = ctx.catalog();

    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::user_json(5, "user")))
        .mount(&server)
        .await;
    ctx.session.restore().await.expect("restore");

    Mock::given(method("GET"))
        .and(path("/concerts"))
        .and(header("authorization", format!("Bearer {}", common::TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "total": 0,
            "page": 1,
            "limit": 12,
            "has_next": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    controller.refresh();
    controller.settle().await.expect("catalog loads with token");
    assert!(controller.items().is_empty());
}
