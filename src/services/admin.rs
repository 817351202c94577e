//! Админка концертов: просмотр, создание, изменение, удаление.
//!
//! Права проверяет сервер; здесь нужен только токен.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::{
    api_client::ApiClient,
    auth::AuthSession,
    error::ClientError,
    models::{Concert, ConcertForm},
    notifications::Notifier,
    services::catalog,
};

const SAVE_FAILED: &str = "Failed to save concert";
const DELETE_FAILED: &str = "Failed to delete concert. Please try again.";

#[derive(Debug, Clone)]
pub struct AdminService {
    api: ApiClient,
    session: Arc<AuthSession>,
    notifier: Notifier,
}

impl AdminService {
    pub fn new(api: ApiClient, session: Arc<AuthSession>, notifier: Notifier) -> Self {
        Self { api, session, notifier }
    }

    pub async fn get_concert(&self, id: i64) -> Result<Concert, ClientError> {
        let token = self.session.token();
        catalog::get_concert(&self.api, id, token.as_deref()).await
    }

    pub async fn create_concert(&self, form: ConcertForm, now: DateTime<Utc>) -> Result<Concert, ClientError> {
        let (token, form) = self.prepare(form, now)?;
        match self.api.post_json::<Concert, _>("/concerts", &form, Some(&token)).await {
            Ok(concert) => {
                info!("Concert created: id={}, name={}", concert.id, concert.name);
                self.notifier.success("Concert created successfully!");
                Ok(concert)
            }
            Err(e) => Err(self.save_failed(e)),
        }
    }

    pub async fn update_concert(&self, id: i64, form: ConcertForm, now: DateTime<Utc>) -> Result<Concert, ClientError> {
        let (token, form) = self.prepare(form, now)?;
        match self
            .api
            .put_json::<Concert, _>(&format!("/concerts/{}", id), &form, Some(&token))
            .await
        {
            Ok(concert) => {
                info!("Concert updated: id={}", concert.id);
                self.notifier.success("Concert updated successfully!");
                Ok(concert)
            }
            Err(e) => Err(self.save_failed(e)),
        }
    }

    pub async fn delete_concert(&self, id: i64) -> Result<(), ClientError> {
        let token = self.session.require_token()?;
        match self.api.delete(&format!("/concerts/{}", id), Some(&token)).await {
            Ok(()) => {
                info!("Concert deleted: id={}", id);
                self.notifier.success("Concert deleted successfully!");
                Ok(())
            }
            Err(e) => {
                error!("Error deleting concert {}: {}", id, e);
                self.notifier.error(DELETE_FAILED);
                Err(e)
            }
        }
    }

    // Ошибки формы не уходят в уведомления: их показывают у полей.
    fn prepare(&self, form: ConcertForm, now: DateTime<Utc>) -> Result<(String, ConcertForm), ClientError> {
        let token = self.session.require_token()?;
        let form = form.normalized();
        form.check(now)?;
        Ok((token, form))
    }

    fn save_failed(&self, e: ClientError) -> ClientError {
        error!("Error saving concert: {}", e);
        self.notifier.error(e.user_message(SAVE_FAILED));
        e
    }
}
