use chrono::{DateTime, Duration, Utc};
use finview_model::prelude::*;

/// Item with a fresh id and `name`.
pub fn item(name: &str) -> BaseItem {
    BaseItem {
        id: Some(ItemId::new()),
        name: Some(name.to_string()),
        sort_name: Some(name.to_lowercase()),
        ..BaseItem::default()
    }
}

pub fn library(name: &str, collection_type: CollectionType) -> BaseItem {
    BaseItem {
        kind: Some(ItemKind::CollectionFolder),
        collection_type: Some(collection_type),
        ..item(name)
    }
}

pub fn channel(name: &str) -> BaseItem {
    BaseItem {
        kind: Some(ItemKind::TvChannel),
        ..item(name)
    }
}

/// Program on `channel` starting `start` and running for `minutes`.
pub fn program(
    channel: &BaseItem,
    name: &str,
    start: DateTime<Utc>,
    minutes: i64,
) -> BaseItem {
    BaseItem {
        kind: Some(ItemKind::Program),
        channel_id: channel.id,
        start_date: Some(start),
        end_date: Some(start + Duration::minutes(minutes)),
        ..item(name)
    }
}

pub fn remote_image(url: &str) -> RemoteImageInfo {
    RemoteImageInfo {
        provider_name: Some("TheMovieDb".to_string()),
        url: Some(url.to_string()),
        image_type: Some(ImageType::Primary),
        ..RemoteImageInfo::default()
    }
}

pub fn user(name: &str) -> UserDto {
    UserDto {
        id: Some(UserId::new()),
        name: Some(name.to_string()),
        ..UserDto::default()
    }
}

pub fn authentication(user: &UserDto, token: &str) -> AuthenticationResult {
    AuthenticationResult {
        user: Some(user.clone()),
        access_token: Some(token.to_string()),
        server_id: None,
    }
}
