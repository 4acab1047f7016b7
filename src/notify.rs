use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::NOTIFICATION_CHANNEL_CAPACITY;

/// A transient message for the user, the terminal equivalent of a toast.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Error,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        };
        write!(
            f,
            "[{}] {} {}: {}",
            kind, self.source, self.title, self.description
        )
    }
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn emit(
        &self,
        source: &str,
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) {
        let entry = Notification {
            timestamp: Utc::now(),
            source: source.to_string(),
            kind,
            title: title.into(),
            description: description.into(),
        };
        match kind {
            NotificationKind::Info => info!("[{}] {}: {}", source, entry.title, entry.description),
            NotificationKind::Error => error!("[{}] {}: {}", source, entry.title, entry.description),
        }
        // Nobody listening is fine.
        let _ = self.sender.send(entry);
    }

    pub fn info(&self, source: &str, title: impl Into<String>, description: impl Into<String>) {
        self.emit(source, NotificationKind::Info, title, description);
    }

    pub fn error(&self, source: &str, description: impl Into<String>) {
        self.emit(source, NotificationKind::Error, "Error", description);
    }
}
