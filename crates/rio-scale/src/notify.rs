//! User-facing failure notifications.
//!
//! Write failures never propagate to the caller of an intent action. They
//! are handed to a `Notifier`, which must not block.

use std::fmt;
use std::sync::Arc;

use rio_store::StoreError;
use tokio::sync::mpsc;
use tracing::warn;

pub const SCALE_ERROR_TITLE: &str = "Error updating scale";
pub const WEIGHT_ERROR_TITLE: &str = "Error updating weight";
pub const PAUSE_ERROR_TITLE: &str = "Error updating pause";

/// A failed write, titled by the field that was being updated.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: &'static str,
    pub error: Arc<StoreError>,
}

impl Notification {
    pub fn new(title: &'static str, error: StoreError) -> Self {
        Self {
            title,
            error: Arc::new(error),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.error)
    }
}

/// Sink for user-visible failure notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<F> Notifier for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Reports notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        warn!(title = notification.title, error = %notification.error, "write failed");
    }
}

/// Forwards notifications to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.tx.send(notification);
    }
}
