use finview_model::ids::{ItemId, UserId};
use finview_model::item::BaseItem;

/// What kind of server resource a [`ResourceChanged`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ItemMetadata,
    ItemUserData,
    User,
}

/// Broadcast after a view-model changed something on the server, so that
/// unrelated observers of the same resource can reload it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChanged {
    /// The item was re-fetched after a mutation; carries the fresh copy.
    ItemMetadata(Box<BaseItem>),
    /// Played state or other per-user data of an item changed.
    ItemUserData { user_id: UserId, item_id: ItemId },
    /// A user finished signing in on this device.
    UserSignedIn(UserId),
}

impl ResourceChanged {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceChanged::ItemMetadata(_) => ResourceKind::ItemMetadata,
            ResourceChanged::ItemUserData { .. } => ResourceKind::ItemUserData,
            ResourceChanged::UserSignedIn(_) => ResourceKind::User,
        }
    }

    /// Identity of the changed resource, rendered for keying and logs.
    pub fn identity(&self) -> Option<String> {
        match self {
            ResourceChanged::ItemMetadata(item) => {
                item.id.map(|id| id.to_string())
            }
            ResourceChanged::ItemUserData { item_id, .. } => {
                Some(item_id.to_string())
            }
            ResourceChanged::UserSignedIn(user_id) => Some(user_id.to_string()),
        }
    }
}

/// Fire-and-forget sink for [`ResourceChanged`] notifications.
pub trait ChangeNotifier: Send + Sync {
    fn post(&self, change: ResourceChanged);
}
