use std::hash::Hash;

use finview_model::ids::ItemId;
use finview_model::prelude::{BaseItem, ChannelProgram, RemoteImageInfo};

/// Identity used to keep accumulated collections free of duplicates.
///
/// Values without a key (the server omitted the identifying field) are
/// treated as distinct from everything else.
pub trait ItemKeyed {
    type Key: Eq + Hash + Clone + Send + Sync + 'static;

    fn item_key(&self) -> Option<Self::Key>;
}

impl ItemKeyed for BaseItem {
    type Key = ItemId;

    fn item_key(&self) -> Option<Self::Key> {
        self.id
    }
}

impl ItemKeyed for ChannelProgram {
    type Key = ItemId;

    fn item_key(&self) -> Option<Self::Key> {
        self.channel.id
    }
}

impl ItemKeyed for RemoteImageInfo {
    type Key = String;

    fn item_key(&self) -> Option<Self::Key> {
        self.url.clone()
    }
}
