pub mod config;
pub mod error;
pub mod models;
pub mod api_client;
pub mod auth;
pub mod notifications;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use api_client::ApiClient;
use auth::{AuthSession, FileTokenStore, TokenStore};
use error::ClientError;
use models::Concert;
use notifications::Notifier;
use services::{
    admin::AdminService,
    booking::BookingFlow,
    catalog::{ApiCatalogSource, CatalogController},
};

// Общий контекст для всего клиента
#[derive(Clone)]
pub struct AppContext {
    pub config: config::Config,
    pub api: ApiClient,
    pub session: Arc<AuthSession>,
    pub notifier: Notifier,
}

impl AppContext {
    /// Контекст с файловым хранилищем токена из конфигурации.
    pub fn new(config: config::Config) -> Result<Self, ClientError> {
        let store = Arc::new(FileTokenStore::new(config.session.token_path.clone()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: config::Config, store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let api = ApiClient::from_config(&config.api)?;
        let session = Arc::new(AuthSession::new(api.clone(), store));
        let notifier = Notifier::new(Duration::from_millis(config.notifications.duration_ms));
        Ok(Self {
            config,
            api,
            session,
            notifier,
        })
    }

    pub fn booking_flow(&self, concert: Concert) -> BookingFlow {
        BookingFlow::new(self.api.clone(), self.session.clone(), self.notifier.clone(), concert)
    }

    pub fn catalog(&self) -> CatalogController<ApiCatalogSource> {
        let source = ApiCatalogSource::new(self.api.clone(), self.session.clone());
        CatalogController::new(source, self.notifier.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.api.clone(), self.session.clone(), self.notifier.clone())
    }
}
