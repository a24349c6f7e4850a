//! Notification channel towards the host application.

use std::fmt;

use tokio::sync::broadcast;

/// Named events emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A target file was written
    FileUpdated { path: String },
    /// The tree changed and should be re-read
    ListReloaded,
    /// The current selection no longer exists
    SelectionCleared,
    /// A remote item was refreshed with new content
    ItemRefreshed { id: String },
    /// An item's stored content changed
    ContentChanged { id: String },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileUpdated { path } => write!(f, "file_updated({path})"),
            Self::ListReloaded => write!(f, "list_reloaded"),
            Self::SelectionCleared => write!(f, "selection_cleared"),
            Self::ItemRefreshed { id } => write!(f, "item_refreshed({id})"),
            Self::ContentChanged { id } => write!(f, "content_changed({id})"),
        }
    }
}

/// Receives events. Delivery is fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event);
}

/// Logs every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: Event) {
        tracing::info!(%event, "Event");
    }
}

/// Fans events out to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: broadcast::Sender<Event>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: Event) {
        // No subscribers is not an error
        if self.sender.send(event).is_err() {
            tracing::trace!("Event dropped, no subscribers");
        }
    }
}
