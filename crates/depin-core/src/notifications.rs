//! Shell notification feed.

use std::time::Duration;

use futures::future::BoxFuture;
use time::OffsetDateTime;

use depin_types::{Notification, NotificationKind};

use crate::bounded::BoundedList;
use crate::error::Result;
use crate::source::{DataSource, SourceKind};
use crate::view::View;

/// Maximum number of notifications kept in the feed.
pub const NOTIFICATION_CAP: usize = 10;

/// Newest-first notification list with read tracking.
///
/// The feed assigns its own ids so entries stay distinct whatever the
/// source numbered them.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    items: BoundedList<Notification>,
    next_id: u64,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self {
            items: BoundedList::new(NOTIFICATION_CAP),
            next_id: 1,
        }
    }
}

impl NotificationFeed {
    /// The feed as it looks when the console opens.
    pub fn seeded(now: OffsetDateTime) -> Self {
        use NotificationKind::{Error, Info, Success, Warning};

        let mut feed = Self::default();
        // Oldest first so the newest ends up at the head.
        let seed = [
            (Success, "AI Analysis Complete", "Pattern recognition completed", 20, true),
            (Error, "Connection Failed", "Unable to reach Sensor-03", 15, false),
            (Info, "New Device Connected", "Sensor-05 is now online", 10, true),
            (Success, "Block Verified", "Block #12543 successfully verified", 5, false),
            (Warning, "High Temperature Alert", "Sensor-01 reading 45.1°C", 2, false),
        ];
        for (kind, title, message, minutes_ago, read) in seed {
            feed.push(Notification {
                id: 0,
                kind,
                title: title.to_string(),
                message: message.to_string(),
                read,
                created_at: now - time::Duration::minutes(minutes_ago),
            });
        }
        feed
    }

    /// Add a notification at the head, evicting the oldest when full.
    /// Returns the id given to it.
    pub fn push(&mut self, mut notification: Notification) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        notification.id = id;
        self.items.push(notification);
        id
    }

    pub fn items(&self) -> &BoundedList<Notification> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Mark one notification read. Returns false if no such id is in the feed.
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in self.items.iter_mut() {
            n.read = true;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl View for NotificationFeed {
    const NAME: &'static str = "notifications";
    type Context = ();
    type Update = Option<Notification>;

    fn default_interval(_kind: SourceKind) -> Duration {
        Duration::from_secs(30)
    }

    fn context(&self) {}

    fn fetch<'a>(
        source: &'a dyn DataSource,
        _ctx: &'a (),
    ) -> BoxFuture<'a, Result<Option<Notification>>> {
        source.notification()
    }

    fn apply(&mut self, update: Option<Notification>, _now: OffsetDateTime) {
        if let Some(notification) = update {
            self.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str) -> Notification {
        Notification {
            id: 99,
            kind: NotificationKind::Info,
            title: title.to_string(),
            message: String::new(),
            read: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_seeded_feed() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let feed = NotificationFeed::seeded(now);
        assert_eq!(feed.len(), 5);
        assert_eq!(feed.unread_count(), 3);
        let head = feed.items().head().unwrap();
        assert_eq!(head.title, "High Temperature Alert");
        assert_eq!(head.relative_time(now), "2 min ago");
    }

    #[test]
    fn test_push_assigns_ids_and_caps() {
        let mut feed = NotificationFeed::default();
        for i in 0..12 {
            feed.push(note(&format!("n{i}")));
        }
        assert_eq!(feed.len(), NOTIFICATION_CAP);
        assert_eq!(feed.items().head().unwrap().id, 12);
        assert_eq!(feed.items().head().unwrap().title, "n11");
        assert!(feed.items().iter().all(|n| n.id != 1 && n.id != 2));
    }

    #[test]
    fn test_mark_read() {
        let mut feed = NotificationFeed::default();
        let a = feed.push(note("a"));
        feed.push(note("b"));
        assert_eq!(feed.unread_count(), 2);
        assert!(feed.mark_read(a));
        assert!(!feed.mark_read(42));
        assert_eq!(feed.unread_count(), 1);
        feed.mark_all_read();
        assert_eq!(feed.unread_count(), 0);
    }

    #[test]
    fn test_apply_none_is_noop() {
        let mut feed = NotificationFeed::default();
        feed.apply(None, OffsetDateTime::UNIX_EPOCH);
        assert!(feed.is_empty());
        feed.apply(Some(note("x")), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(feed.len(), 1);
    }
}
