mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use finview_contracts::error::ApiError;
use finview_contracts::notify::ResourceChanged;
use finview_core::testing::fixtures::{item, remote_image};
use finview_core::testing::{
    ApiCall, Endpoint, RecordingNotifier, StubApi, next_event, session, wait_for,
};
use finview_core::view_models::{
    ImageTarget, RemoteImageAction, RemoteImageEvent,
    RemoteImageState, RemoteItemImageViewModel,
};
use finview_core::{CoreError, ViewModel};
use finview_model::prelude::*;

struct Harness {
    api: StubApi,
    notifier: Arc<RecordingNotifier>,
    vm: ViewModel<RemoteItemImageViewModel>,
}

fn harness(target: ImageTarget) -> Harness {
    let api = StubApi::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let vm = RemoteItemImageViewModel::new(
        session(&api),
        notifier.clone(),
        target,
        2,
    )
    .expect("positive page size");
    Harness {
        api,
        notifier,
        vm: ViewModel::new(vm),
    }
}

fn with_primary_tag(mut item: BaseItem, tag: &str) -> BaseItem {
    let mut tags = BTreeMap::new();
    tags.insert("Primary".to_string(), tag.to_string());
    item.image_tags = Some(tags);
    item
}

#[tokio::test]
async fn uploaded_bytes_replace_the_item_with_the_server_copy() -> anyhow::Result<()> {
    support::init_tracing();
    let original = item("Heat");
    let Harness { api, notifier, vm } =
        harness(ImageTarget::new(original.clone(), ImageType::Primary));
    let refetched = with_primary_tag(original.clone(), "f00d");
    api.push(Endpoint::Item, Ok(refetched.clone()));

    let mut events = vm.subscribe_events();
    let mut background = vm.subscribe_background();
    vm.send(RemoteImageAction::SetImage {
        url: None,
        data: Some(vec![0xFF, 0xD8, 0xFF]),
    })
    .await?;

    assert_eq!(next_event(&mut events).await, Some(RemoteImageEvent::Updated));
    assert!(wait_for(&mut background, |set| set.is_empty()).await.is_some());

    let item_id = original.id.expect("fixture id");
    assert_eq!(
        api.calls_to(Endpoint::SetItemImage),
        vec![ApiCall::SetItemImage {
            item_id,
            image_type: ImageType::Primary,
            index: None,
            data: vec![0xFF, 0xD8, 0xFF],
        }]
    );
    assert_eq!(api.call_count(Endpoint::DownloadRemoteImage), 0);
    assert_eq!(vm.fields().item.get(), refetched);
    assert_eq!(
        notifier.changes(),
        vec![ResourceChanged::ItemMetadata(Box::new(refetched))]
    );
    assert_eq!(vm.state(), RemoteImageState::Initial);
    Ok(())
}

#[tokio::test]
async fn url_is_downloaded_and_uploaded_at_the_index() -> anyhow::Result<()> {
    let original = item("Alien");
    let target = ImageTarget::new(original.clone(), ImageType::Backdrop).with_index(2);
    let Harness { api, vm, .. } = harness(target);
    let url = "https://image.tmdb.org/t/p/original/backdrop.jpg";
    api.push(Endpoint::DownloadRemoteImage, Ok(vec![1u8, 2, 3]));
    api.push(Endpoint::Item, Ok(original.clone()));

    let mut events = vm.subscribe_events();
    vm.send(RemoteImageAction::SetImage {
        url: Some(url.to_string()),
        data: None,
    })
    .await?;
    assert_eq!(next_event(&mut events).await, Some(RemoteImageEvent::Updated));

    let item_id = original.id.expect("fixture id");
    assert_eq!(
        api.calls_to(Endpoint::DownloadRemoteImage),
        vec![ApiCall::DownloadRemoteImage {
            item_id,
            image_type: ImageType::Backdrop,
            url: url.to_string(),
        }]
    );
    assert_eq!(
        api.calls_to(Endpoint::SetItemImage),
        vec![ApiCall::SetItemImage {
            item_id,
            image_type: ImageType::Backdrop,
            index: Some(2),
            data: vec![1, 2, 3],
        }]
    );
    Ok(())
}

#[tokio::test]
async fn nothing_to_upload_is_an_error() -> anyhow::Result<()> {
    let Harness { api, notifier, vm } =
        harness(ImageTarget::new(item("Heat"), ImageType::Primary));
    let mut events = vm.subscribe_events();
    let mut state = vm.subscribe_state();

    vm.send(RemoteImageAction::SetImage {
        url: None,
        data: None,
    })
    .await?;

    let expected = CoreError::validation("No image data provided or downloaded.");
    assert_eq!(
        next_event(&mut events).await,
        Some(RemoteImageEvent::Error(expected.clone()))
    );
    let failed =
        wait_for(&mut state, |s| matches!(s, RemoteImageState::Error(_))).await;
    assert_eq!(failed, Some(RemoteImageState::Error(expected)));
    assert_eq!(api.call_count(Endpoint::SetItemImage), 0);
    assert!(notifier.changes().is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_addresses_the_indexed_image() -> anyhow::Result<()> {
    let original = with_primary_tag(item("Heat"), "abc");
    let target = ImageTarget::new(original.clone(), ImageType::Screenshot).with_index(0);
    let Harness { api, notifier, vm } = harness(target);
    let refetched = BaseItem {
        image_tags: None,
        ..original.clone()
    };
    api.push(Endpoint::Item, Ok(refetched.clone()));

    let mut events = vm.subscribe_events();
    vm.send(RemoteImageAction::DeleteImage).await?;
    assert_eq!(next_event(&mut events).await, Some(RemoteImageEvent::Updated));

    assert_eq!(
        api.calls_to(Endpoint::DeleteItemImage),
        vec![ApiCall::DeleteItemImage {
            item_id: original.id.expect("fixture id"),
            image_type: ImageType::Screenshot,
            index: Some(0),
        }]
    );
    assert_eq!(vm.fields().item.get(), refetched);
    assert_eq!(notifier.changes().len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_upload_keeps_the_held_item() -> anyhow::Result<()> {
    let original = item("Heat");
    let Harness { api, notifier, vm } =
        harness(ImageTarget::new(original.clone(), ImageType::Primary));
    api.push::<()>(
        Endpoint::SetItemImage,
        Err(ApiError::Status {
            status: 500,
            message: "disk full".to_string(),
        }),
    );

    let mut events = vm.subscribe_events();
    let mut background = vm.subscribe_background();
    vm.send(RemoteImageAction::SetImage {
        url: None,
        data: Some(vec![7]),
    })
    .await?;

    let event = next_event(&mut events).await;
    assert!(matches!(event, Some(RemoteImageEvent::Error(CoreError::Transport(_)))));
    assert!(wait_for(&mut background, |set| set.is_empty()).await.is_some());
    assert_eq!(api.call_count(Endpoint::Item), 0);
    assert_eq!(vm.fields().item.get(), original);
    assert!(notifier.changes().is_empty());
    Ok(())
}

#[tokio::test]
async fn item_without_id_cannot_be_edited() -> anyhow::Result<()> {
    let anonymous = BaseItem {
        id: None,
        ..item("Loose file")
    };
    let Harness { api, vm, .. } =
        harness(ImageTarget::new(anonymous, ImageType::Primary));

    let state = vm.respond(RemoteImageAction::DeleteImage).await?;
    assert_eq!(
        state,
        RemoteImageState::Error(CoreError::validation("item has no identifier"))
    );

    let mut events = vm.subscribe_events();
    vm.send(RemoteImageAction::Refresh).await?;
    let event = next_event(&mut events).await;
    assert_eq!(
        event,
        Some(RemoteImageEvent::Error(CoreError::validation(
            "item has no identifier"
        )))
    );
    assert!(api.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn candidates_page_by_type_and_language() -> anyhow::Result<()> {
    let original = item("Heat");
    let target = ImageTarget::new(original.clone(), ImageType::Logo).all_languages(true);
    let Harness { api, vm, .. } = harness(target);
    let first = vec![remote_image("https://a/1.png"), remote_image("https://a/2.png")];
    // A candidate repeated on the next page is kept once.
    let second = vec![remote_image("https://a/2.png")];
    api.push(
        Endpoint::RemoteImages,
        Ok(RemoteImageResult {
            images: Some(first.clone()),
            total_record_count: 3,
            providers: None,
        }),
    );
    api.push(
        Endpoint::RemoteImages,
        Ok(RemoteImageResult {
            images: Some(second),
            total_record_count: 3,
            providers: None,
        }),
    );

    let mut images = vm.fields().images.subscribe();
    let mut background = vm.subscribe_background();
    vm.send(RemoteImageAction::Refresh).await?;
    assert_eq!(wait_for(&mut images, |i| i.len() == 2).await, Some(first.clone()));
    assert!(wait_for(&mut background, |set| set.is_empty()).await.is_some());

    vm.send(RemoteImageAction::GetNextPage).await?;
    assert!(support::eventually(|| api.call_count(Endpoint::RemoteImages) == 2).await);
    assert!(wait_for(&mut background, |set| set.is_empty()).await.is_some());
    support::settle().await;
    assert_eq!(vm.fields().images.get(), first);

    let item_id = original.id.expect("fixture id");
    let queries: Vec<_> = api
        .calls_to(Endpoint::RemoteImages)
        .into_iter()
        .filter_map(|call| match call {
            ApiCall::RemoteImages(id, query) if id == item_id => Some(query),
            _ => None,
        })
        .collect();
    assert_eq!(
        queries,
        vec![
            RemoteImagesQuery {
                image_type: ImageType::Logo,
                start_index: 0,
                limit: 2,
                include_all_languages: true,
            },
            RemoteImagesQuery {
                image_type: ImageType::Logo,
                start_index: 2,
                limit: 2,
                include_all_languages: true,
            },
        ]
    );
    Ok(())
}
