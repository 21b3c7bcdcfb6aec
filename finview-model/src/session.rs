use chrono::{DateTime, Utc};

use crate::ids::UserId;
use crate::item::BaseItem;

/// A client session connected to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct SessionInfo {
    pub id: Option<String>,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub client: Option<String>,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub application_version: Option<String>,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub now_playing_item: Option<BaseItem>,
    pub is_active: bool,
}

impl SessionInfo {
    pub fn is_playing(&self) -> bool {
        self.now_playing_item.is_some()
    }
}
