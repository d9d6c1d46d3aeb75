//! Notification routing.
//!
//! Every notification is republished on a broadcast stream. `list_changed`
//! notifications additionally name the cached list the session should refresh.

use tokio::sync::broadcast;
use tracing::{debug, trace};
use wavemcp_protocol::JsonRpcNotification;

use crate::cache::ListKind;

#[derive(Debug)]
pub(crate) struct NotificationRouter {
    stream: broadcast::Sender<JsonRpcNotification>,
}

impl NotificationRouter {
    pub(crate) fn new(capacity: usize) -> Self {
        let (stream, _) = broadcast::channel(capacity.max(1));
        Self { stream }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<JsonRpcNotification> {
        self.stream.subscribe()
    }

    /// Publish a notification and return the list it invalidates, if any
    pub(crate) fn route(&self, notification: JsonRpcNotification) -> Option<ListKind> {
        let refresh = ListKind::from_list_changed(&notification.method);
        match refresh {
            Some(kind) => debug!("Server reported {} list changed", kind),
            None => trace!("Notification {}", notification.method),
        }
        // No subscribers is fine; the notification is simply not observed.
        let _ = self.stream.send(notification);
        refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_every_notification_is_republished() {
        let router = NotificationRouter::new(8);
        let mut rx = router.subscribe();

        let progress =
            JsonRpcNotification::new("notifications/progress", Some(json!({"progress": 5})));
        assert_eq!(router.route(progress.clone()), None);
        assert_eq!(
            router.route(JsonRpcNotification::without_params(
                "notifications/resources/list_changed"
            )),
            Some(ListKind::Resources)
        );

        assert_eq!(rx.recv().await.unwrap(), progress);
        assert_eq!(
            rx.recv().await.unwrap().method,
            "notifications/resources/list_changed"
        );
    }

    #[test]
    fn test_route_without_subscribers() {
        let router = NotificationRouter::new(1);
        assert_eq!(
            router.route(JsonRpcNotification::without_params(
                "notifications/tools/list_changed"
            )),
            Some(ListKind::Tools)
        );
    }
}
