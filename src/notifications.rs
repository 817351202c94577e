//! Центр уведомлений: очередь коротких сообщений с автоматическим истечением.
//!
//! Компоненты публикуют сообщение и сразу забывают о нём. Истёкшие записи
//! вычищаются при чтении; подписчики получают каждое новое уведомление
//! через `broadcast`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    /// `None`: висит, пока не удалят вручную.
    pub expires_at: Option<Instant>,
}

impl Notification {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

#[derive(Clone)]
pub struct Notifier {
    queue: Arc<Mutex<Vec<Notification>>>,
    sender: broadcast::Sender<Notification>,
    default_duration: Duration,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("default_duration", &self.default_duration)
            .finish()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000))
    }
}

impl Notifier {
    pub fn new(default_duration: Duration) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            queue: Arc::new(Mutex::new(Vec::new())),
            sender,
            default_duration,
        }
    }

    /// Публикует уведомление. `duration` = None: длительность по умолчанию,
    /// нулевая длительность означает без истечения.
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind, duration: Option<Duration>) -> Uuid {
        let duration = duration.unwrap_or(self.default_duration);
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            expires_at: (!duration.is_zero()).then(|| Instant::now() + duration),
        };
        debug!("notification [{}] {}", kind.as_str(), notification.message);

        let id = notification.id;
        {
            let now = Instant::now();
            let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
            // Истёкшие записи уходят при каждой публикации, даже если никто не читает очередь.
            queue.retain(|n| !n.is_expired(now));
            queue.push(notification.clone());
        }
        // Подписчиков может не быть, это нормально.
        let _ = self.sender.send(notification);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Success, None)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Error, None)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Info, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.show(message, NotificationKind::Warning, None)
    }

    pub fn remove(&self, id: Uuid) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|n| n.id != id);
    }

    /// Активные уведомления в порядке публикации.
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.retain(|n| !n.is_expired(now));
        queue.clone()
    }

    /// Забирает все активные уведомления из очереди.
    pub fn drain(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.retain(|n| !n.is_expired(now));
        std::mem::take(&mut *queue)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}
