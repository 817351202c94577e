#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concert_booking::{
    auth::{MemoryTokenStore, TokenStore},
    config::Config,
    models::{Concert, ConcertStatus},
    AppContext,
};

pub const TOKEN: &str = "test-token";

/// Концерт через неделю со случайным названием.
pub fn concert(id: i64, total_seats: u32, booked_seats: u32, price: i64, discount: u32) -> Concert {
    let start = Utc::now() + Duration::days(7);
    Concert {
        id,
        name: CompanyName().fake(),
        description: Sentence(3..8).fake(),
        unit_price: price,
        venue: "Jakarta Convention Center".to_string(),
        total_seats,
        booked_seats,
        discount_percent: discount,
        event_start: start,
        event_end: start + Duration::hours(3),
        status: ConcertStatus::Active,
        created_at: None,
        updated_at: None,
    }
}

pub fn concert_json(concert: &Concert) -> Value {
    serde_json::to_value(concert).expect("concert serializes")
}

pub fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "name": "Dewi Lestari",
        "email": "dewi@example.com",
        "age": 28,
        "role": role
    })
}

pub fn context(server: &MockServer, store: Arc<dyn TokenStore>) -> AppContext {
    AppContext::with_store(Config::for_base_url(&server.uri()), store).expect("context")
}

/// Гость: токена нет.
pub fn guest(server: &MockServer) -> AppContext {
    context(server, Arc::new(MemoryTokenStore::default()))
}

/// Вошедший пользователь с ролью `role`; сессия восстановлена через /auth/profile.
pub async fn signed_in(server: &MockServer, user_id: i64, role: &str) -> AppContext {
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(user_id, role)))
        .mount(server)
        .await;

    let ctx = context(server, Arc::new(MemoryTokenStore::with_token(TOKEN)));
    let user = ctx.session.restore().await.expect("restore");
    assert!(user.is_some(), "session should be restored");
    ctx
}

pub fn messages(ctx: &AppContext) -> Vec<String> {
    ctx.notifier.active().into_iter().map(|n| n.message).collect()
}
