//! Single-slot transient notifications.
//!
//! At most one message is visible. Raising a new one replaces the current one,
//! and every message disappears [`NOTIFICATION_TTL`] after it was raised.

use std::time::{Duration, Instant};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub raised_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTIFICATION_TTL
    }
}

#[derive(Clone, Debug, Default)]
pub struct NotificationSlot {
    current: Option<Notification>,
}

impl NotificationSlot {
    pub fn raise(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        let message = message.into();
        match severity {
            Severity::Success => tracing::info!(%message, "notification"),
            Severity::Error => tracing::warn!(%message, "notification"),
        }
        self.current = Some(Notification { message, severity, raised_at: now });
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.raise(message, Severity::Success, now);
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.raise(message, Severity::Error, now);
    }

    /// The visible notification, if it has not yet expired.
    pub fn current(&self, now: Instant) -> Option<&Notification> {
        self.current.as_ref().filter(|n| !n.is_expired(now))
    }

    /// Drop the stored notification once it has expired.
    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current = None;
        }
    }
}
