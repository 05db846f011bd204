//! Process-wide session events
//!
//! UI shells subscribe here to re-render auth-gated views when a session is
//! established or ends.

use std::fmt;
use std::sync::OnceLock;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were stored after sign-in or registration
    LoggedIn,
    /// Credentials were removed after sign-out or a terminal refresh failure
    LoggedOut,
}

impl SessionEvent {
    pub const fn name(self) -> &'static str {
        match self {
            Self::LoggedIn => "auth:login",
            Self::LoggedOut => "auth:logout",
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Publish/subscribe handle for [`SessionEvent`]s. Clones share one channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// The channel shared by every client that was not given its own
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<SessionEvents> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers received the event
    pub fn publish(&self, event: SessionEvent) -> usize {
        debug!(event = event.name(), "publishing session event");
        // No subscribers is not an error
        self.sender.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(SessionEvent::LoggedIn.name(), "auth:login");
        assert_eq!(SessionEvent::LoggedOut.to_string(), "auth:logout");
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let events = SessionEvents::new();
        let mut first = events.subscribe();
        let mut second = events.clone().subscribe();

        assert_eq!(events.publish(SessionEvent::LoggedIn), 2);
        events.publish(SessionEvent::LoggedOut);

        assert_eq!(first.recv().await.unwrap(), SessionEvent::LoggedIn);
        assert_eq!(first.recv().await.unwrap(), SessionEvent::LoggedOut);
        assert_eq!(second.recv().await.unwrap(), SessionEvent::LoggedIn);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let events = SessionEvents::new();
        assert_eq!(events.publish(SessionEvent::LoggedOut), 0);
    }

    #[test]
    fn test_global_is_shared() {
        let mut rx = SessionEvents::global().subscribe();
        SessionEvents::global().publish(SessionEvent::LoggedIn);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::LoggedIn);
    }
}
