//! Unit tests for the notification center.

use graph_explorer::notifications::{Notification, NotificationCenter, NotificationKind};
use std::time::Duration;

#[test]
fn test_expired_notifications_are_removed() {
    let mut center = NotificationCenter::new();
    let short = Notification::info("short").with_duration(Duration::from_secs(1));
    let now = short.created_at;
    center.push(short);
    center.push(Notification::error("long"));

    center.remove_expired(now + Duration::from_secs(2));
    assert_eq!(center.count(), 1);
    assert_eq!(center.latest().map(|n| n.title.as_str()), Some("long"));
}

#[test]
fn test_oldest_is_dropped_past_capacity() {
    let mut center = NotificationCenter::new();
    for i in 0..25 {
        center.push(Notification::info(format!("n{i}")));
    }
    assert_eq!(center.count(), 20);
    assert_eq!(center.notifications()[0].title, "n5");
}

#[test]
fn test_errors_linger_longer_than_info() {
    assert!(
        NotificationKind::Error.default_duration() > NotificationKind::Info.default_duration()
    );
    let error = Notification::error("failed").with_description("details");
    assert_eq!(error.description.as_deref(), Some("details"));
}

#[test]
fn test_drain_and_remove() {
    let mut center = NotificationCenter::new();
    center.push(Notification::warning("a"));
    center.push(Notification::success("b"));

    assert!(center.remove(5).is_none());
    assert_eq!(center.remove(0).map(|n| n.title), Some("a".to_string()));
    assert_eq!(center.drain().len(), 1);
    assert_eq!(center.count(), 0);
}
