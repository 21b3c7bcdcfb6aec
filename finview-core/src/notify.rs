use finview_contracts::notify::{ChangeNotifier, ResourceChanged, ResourceKind};
use tokio::sync::broadcast;
use tracing::trace;

/// In-process fan-out of [`ResourceChanged`] notifications to observers
/// outside the view-model that made the change.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ResourceChanged>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResourceChanged> {
        self.sender.subscribe()
    }

    /// Receiver that only yields changes of `kind`.
    pub fn subscribe_kind(&self, kind: ResourceKind) -> KindReceiver {
        KindReceiver {
            kind,
            inner: self.subscribe(),
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangeNotifier for ChangeBus {
    fn post(&self, change: ResourceChanged) {
        trace!(kind = ?change.kind(), identity = ?change.identity(), "resource changed");
        let _ = self.sender.send(change);
    }
}

#[derive(Debug)]
pub struct KindReceiver {
    kind: ResourceKind,
    inner: broadcast::Receiver<ResourceChanged>,
}

impl KindReceiver {
    /// Next change of the subscribed kind. Lagged notifications are
    /// skipped; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<ResourceChanged> {
        loop {
            match self.inner.recv().await {
                Ok(change) if change.kind() == self.kind => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    trace!(skipped, "change receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use finview_model::prelude::*;

    use super::*;

    #[tokio::test]
    async fn kind_receiver_filters_other_kinds() {
        let bus = ChangeBus::new(8);
        let mut metadata = bus.subscribe_kind(ResourceKind::ItemMetadata);

        bus.post(ResourceChanged::UserSignedIn(UserId::new()));
        let item = BaseItem {
            id: Some(ItemId::new()),
            ..BaseItem::default()
        };
        bus.post(ResourceChanged::ItemMetadata(Box::new(item.clone())));

        assert_eq!(
            metadata.recv().await,
            Some(ResourceChanged::ItemMetadata(Box::new(item)))
        );
    }

    #[test]
    fn posting_without_subscribers_is_fine() {
        ChangeBus::default().post(ResourceChanged::UserSignedIn(UserId::new()));
    }
}
