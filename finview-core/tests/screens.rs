mod support;

use std::sync::Arc;
use std::time::Duration;

use finview_config::{HomeConfig, LibraryDisplaySettings, SessionsConfig};
use finview_contracts::error::ApiError;
use finview_contracts::notify::ResourceChanged;
use finview_core::testing::fixtures::{item, library};
use finview_core::testing::{
    ApiCall, Endpoint, RecordingNotifier, StubApi, next_event, session, wait_for,
};
use finview_core::view_models::{
    ActiveSessionsViewModel, EditorAction, EditorEvent, EditorState, HomeAction,
    HomeEvent, HomeState, HomeViewModel, ItemEditorViewModel, MediaAction,
    MediaState, MediaViewModel, ResetPasswordAction, ResetPasswordEvent,
    ResetPasswordState, ResetUserPasswordViewModel, SessionsAction,
    SessionsState, StudioEditor, TagEditor,
};
use finview_core::{CoreError, PagingState, ViewModel};
use finview_model::prelude::*;

mod home {
    use super::*;

    fn home(api: &StubApi, notifier: Arc<RecordingNotifier>) -> ViewModel<HomeViewModel> {
        let config = HomeConfig { resume_limit: 12 };
        let vm = HomeViewModel::new(session(api), notifier, &config, 10)
            .expect("positive page size");
        ViewModel::new(vm)
    }

    #[tokio::test]
    async fn refresh_loads_every_row() -> anyhow::Result<()> {
        support::init_tracing();
        let api = StubApi::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let resume = item("Half watched");
        let films = library("Films", CollectionType::MOVIES);
        let hidden = library("Hidden", CollectionType::TV_SHOWS);
        let next = item("S01E02");
        api.push_page(Endpoint::ResumeItems, vec![resume.clone()]);
        api.push_page(
            Endpoint::UserViews,
            vec![films.clone(), hidden.clone(), library("Music", CollectionType::MUSIC)],
        );
        api.push(
            Endpoint::CurrentUser,
            Ok(UserDto {
                configuration: Some(UserConfiguration {
                    latest_items_excludes: vec![hidden.id.expect("fixture id")],
                }),
                ..UserDto::default()
            }),
        );
        api.push_page(Endpoint::NextUp, vec![next.clone()]);

        let vm = home(&api, notifier);
        let mut state = vm.subscribe_state();
        assert_eq!(vm.respond(HomeAction::Refresh).await?, HomeState::Refreshing);

        let loaded = wait_for(&mut state, |s| *s == HomeState::Content).await;
        assert_eq!(loaded, Some(HomeState::Content));
        let fields = vm.fields();
        let mut resume_row = fields.resume_items.subscribe();
        assert_eq!(
            wait_for(&mut resume_row, |r| !r.is_empty()).await,
            Some(vec![resume])
        );
        assert_eq!(fields.libraries.get(), vec![films]);

        let mut next_up = fields.next_up.fields().items.subscribe();
        assert_eq!(wait_for(&mut next_up, |i| !i.is_empty()).await, Some(vec![next]));
        let mut recent = fields.recently_added.subscribe_state();
        assert!(wait_for(&mut recent, |s| *s == PagingState::Content).await.is_some());

        let resume_calls = api.calls_to(Endpoint::ResumeItems);
        let [ApiCall::ResumeItems(_, query)] = resume_calls.as_slice() else {
            panic!("expected one resume query");
        };
        assert_eq!(query.limit, Some(12));
        assert!(query.enable_user_data);
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_excludes_hide_nothing() -> anyhow::Result<()> {
        let api = StubApi::new();
        let films = library("Films", CollectionType::MOVIES);
        let shows = library("Shows", CollectionType::TV_SHOWS);
        api.push_page(Endpoint::UserViews, vec![films.clone(), shows.clone()]);

        let vm = home(&api, Arc::new(RecordingNotifier::new()));
        let mut state = vm.subscribe_state();
        vm.send(HomeAction::Refresh).await?;

        assert!(wait_for(&mut state, |s| *s == HomeState::Content).await.is_some());
        assert_eq!(vm.fields().libraries.get(), vec![films, shows]);
        Ok(())
    }

    #[tokio::test]
    async fn resume_failure_still_shows_the_libraries() -> anyhow::Result<()> {
        let api = StubApi::new();
        let films = library("Films", CollectionType::MOVIES);
        api.push::<ItemPage<BaseItem>>(
            Endpoint::ResumeItems,
            Err(ApiError::Network("resume down".to_string())),
        );
        api.push_page(Endpoint::UserViews, vec![films.clone()]);

        let vm = home(&api, Arc::new(RecordingNotifier::new()));
        let mut state = vm.subscribe_state();
        let mut events = vm.subscribe_events();
        vm.send(HomeAction::Refresh).await?;

        assert!(wait_for(&mut state, |s| *s == HomeState::Content).await.is_some());
        assert!(support::eventually(|| vm.background_states().is_empty()).await);
        support::settle().await;
        assert_eq!(vm.fields().libraries.get(), vec![films]);
        assert!(vm.fields().resume_items.get().is_empty());
        assert_eq!(api.call_count(Endpoint::ResumeItems), 1);
        assert!(events.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_clears_rows_and_reports_library_failure() -> anyhow::Result<()> {
        let api = StubApi::new();
        let resume = item("Half watched");
        let films = library("Films", CollectionType::MOVIES);
        api.push_page(Endpoint::ResumeItems, vec![resume.clone()]);
        api.push_page(Endpoint::UserViews, vec![films.clone()]);
        let gate = api.push_gated::<ItemPage<BaseItem>>(
            Endpoint::UserViews,
            Err(ApiError::Network("offline".to_string())),
        );

        let vm = home(&api, Arc::new(RecordingNotifier::new()));
        let mut state = vm.subscribe_state();
        let mut events = vm.subscribe_events();
        vm.send(HomeAction::Refresh).await?;
        assert!(wait_for(&mut state, |s| *s == HomeState::Content).await.is_some());
        let mut resume_row = vm.fields().resume_items.subscribe();
        assert!(wait_for(&mut resume_row, |r| !r.is_empty()).await.is_some());
        assert_eq!(vm.fields().libraries.get(), vec![films]);

        // The old rows are gone as soon as the next refresh is answered.
        assert_eq!(vm.respond(HomeAction::Refresh).await?, HomeState::Refreshing);
        assert!(vm.fields().resume_items.get().is_empty());
        assert!(vm.fields().libraries.get().is_empty());

        gate.open();
        let expected = CoreError::transport("network error: offline");
        assert_eq!(
            next_event(&mut events).await,
            Some(HomeEvent::Error(expected.clone()))
        );
        assert_eq!(vm.state(), HomeState::Error(expected));
        assert!(vm.fields().libraries.get().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn marking_played_reloads_the_rows() -> anyhow::Result<()> {
        let api = StubApi::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let resume = item("Half watched");
        let resume_id = resume.id.expect("fixture id");
        api.push_page(Endpoint::ResumeItems, vec![resume.clone()]);
        api.push_page(Endpoint::ResumeItems, Vec::new());

        let vm = home(&api, notifier.clone());
        let mut state = vm.subscribe_state();
        vm.send(HomeAction::Refresh).await?;
        assert!(wait_for(&mut state, |s| *s == HomeState::Content).await.is_some());
        let mut resume_row = vm.fields().resume_items.subscribe();
        assert!(wait_for(&mut resume_row, |r| !r.is_empty()).await.is_some());

        // Items outside the resume row are not touched.
        vm.respond(HomeAction::MarkPlayed(item("Elsewhere"))).await?;
        assert_eq!(api.call_count(Endpoint::MarkPlayed), 0);

        vm.send(HomeAction::MarkPlayed(resume.clone())).await?;
        let reloaded = wait_for(&mut resume_row, Vec::is_empty).await;
        assert_eq!(reloaded, Some(Vec::new()));

        let user_id = match api.calls_to(Endpoint::MarkPlayed).as_slice() {
            [ApiCall::MarkPlayed(user_id, item_id)] if *item_id == resume_id => *user_id,
            other => panic!("unexpected calls {other:?}"),
        };
        assert_eq!(
            notifier.changes(),
            vec![ResourceChanged::ItemUserData {
                user_id,
                item_id: resume_id,
            }]
        );
        assert_eq!(api.call_count(Endpoint::ResumeItems), 2);
        assert!(support::eventually(|| api.call_count(Endpoint::NextUp) == 2).await);
        Ok(())
    }

    #[tokio::test]
    async fn failed_unplayed_keeps_the_content() -> anyhow::Result<()> {
        let api = StubApi::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let resume = item("Half watched");
        api.push_page(Endpoint::ResumeItems, vec![resume.clone()]);
        api.push::<()>(
            Endpoint::MarkUnplayed,
            Err(ApiError::Status {
                status: 500,
                message: "oops".to_string(),
            }),
        );

        let vm = home(&api, notifier.clone());
        let mut state = vm.subscribe_state();
        let mut events = vm.subscribe_events();
        vm.send(HomeAction::Refresh).await?;
        assert!(wait_for(&mut state, |s| *s == HomeState::Content).await.is_some());
        let mut resume_row = vm.fields().resume_items.subscribe();
        assert!(wait_for(&mut resume_row, |r| !r.is_empty()).await.is_some());

        vm.send(HomeAction::MarkUnplayed(resume.clone())).await?;
        assert!(matches!(
            next_event(&mut events).await,
            Some(HomeEvent::Error(CoreError::Transport(_)))
        ));
        assert_eq!(vm.state(), HomeState::Content);
        assert_eq!(vm.fields().resume_items.get(), vec![resume]);
        assert!(notifier.changes().is_empty());
        Ok(())
    }
}

mod media {
    use super::*;

    #[tokio::test]
    async fn libraries_follow_the_shortcuts() -> anyhow::Result<()> {
        let api = StubApi::new();
        let films = library("Films", CollectionType::MOVIES);
        api.push_page(
            Endpoint::UserViews,
            vec![films.clone(), library("Albums", CollectionType::MUSIC)],
        );
        let settings = LibraryDisplaySettings {
            show_favorites: true,
            live_tv_enabled: true,
            downloads_enabled: false,
        };

        let vm = ViewModel::new(MediaViewModel::new(session(&api), settings));
        let mut state = vm.subscribe_state();
        vm.send(MediaAction::Refresh).await?;

        assert!(wait_for(&mut state, |s| *s == MediaState::Content).await.is_some());
        let kinds: Vec<_> = vm
            .fields()
            .libraries
            .get()
            .into_iter()
            .map(|library| library.collection_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(CollectionType::FAVORITES),
                Some(CollectionType::LIVE_TV),
                films.collection_type,
            ]
        );
        assert!(vm.background_states().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failure_clears_the_libraries() -> anyhow::Result<()> {
        let api = StubApi::new();
        api.push_page(Endpoint::UserViews, vec![library("Films", CollectionType::MOVIES)]);
        api.push::<ItemPage<BaseItem>>(Endpoint::UserViews, Err(ApiError::Unauthorized));

        let vm = ViewModel::new(MediaViewModel::new(
            session(&api),
            LibraryDisplaySettings::default(),
        ));
        let mut state = vm.subscribe_state();
        vm.send(MediaAction::Refresh).await?;
        assert!(wait_for(&mut state, |s| *s == MediaState::Content).await.is_some());
        assert_eq!(vm.fields().libraries.get().len(), 2);

        vm.send(MediaAction::Refresh).await?;
        let failed = wait_for(&mut state, |s| matches!(s, MediaState::Error(_))).await;
        assert!(failed.is_some());
        assert!(vm.fields().libraries.get().is_empty());
        Ok(())
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn sessions_use_the_activity_window() -> anyhow::Result<()> {
        let api = StubApi::new();
        let playing = SessionInfo {
            user_name: Some("alice".to_string()),
            device_name: Some("Living room".to_string()),
            is_active: true,
            ..SessionInfo::default()
        };
        api.push(Endpoint::Sessions, Ok(vec![playing.clone()]));
        let config = SessionsConfig {
            active_within: Duration::from_secs(960),
        };

        let vm = ViewModel::new(ActiveSessionsViewModel::new(session(&api), &config));
        let mut state = vm.subscribe_state();
        vm.send(SessionsAction::Refresh).await?;

        assert!(wait_for(&mut state, |s| *s == SessionsState::Content).await.is_some());
        assert_eq!(vm.fields().sessions.get(), vec![playing]);
        assert_eq!(api.calls_to(Endpoint::Sessions), vec![ApiCall::Sessions(960)]);
        Ok(())
    }

    #[tokio::test]
    async fn failure_keeps_the_last_sessions() -> anyhow::Result<()> {
        let api = StubApi::new();
        let known = SessionInfo {
            client: Some("Web".to_string()),
            ..SessionInfo::default()
        };
        api.push(Endpoint::Sessions, Ok(vec![known.clone()]));
        api.push::<Vec<SessionInfo>>(
            Endpoint::Sessions,
            Err(ApiError::Network("reset".to_string())),
        );

        let vm = ViewModel::new(ActiveSessionsViewModel::new(
            session(&api),
            &SessionsConfig::default(),
        ));
        let mut state = vm.subscribe_state();
        vm.send(SessionsAction::Refresh).await?;
        assert!(wait_for(&mut state, |s| *s == SessionsState::Content).await.is_some());
        vm.send(SessionsAction::Refresh).await?;
        assert!(wait_for(&mut state, |s| matches!(s, SessionsState::Error(_))).await.is_some());

        assert_eq!(vm.fields().sessions.get(), vec![known]);
        Ok(())
    }
}

mod reset_password {
    use super::*;

    fn reset(current: &str, new: &str) -> ResetPasswordAction {
        ResetPasswordAction::Reset {
            current: current.to_string(),
            new: new.to_string(),
        }
    }

    #[tokio::test]
    async fn success_returns_to_initial() -> anyhow::Result<()> {
        let api = StubApi::new();
        let session = session(&api);
        let user_id = session.user_id();
        let vm = ViewModel::new(ResetUserPasswordViewModel::new(session));
        let mut events = vm.subscribe_events();

        let answered = vm.respond(reset("old", "n3w")).await?;
        assert_eq!(answered, ResetPasswordState::Resetting);
        assert_eq!(next_event(&mut events).await, Some(ResetPasswordEvent::Success));
        assert_eq!(vm.state(), ResetPasswordState::Initial);
        assert_eq!(
            api.calls_to(Endpoint::UpdateUserPassword),
            vec![ApiCall::UpdateUserPassword {
                user_id,
                current: "old".to_string(),
                new: "n3w".to_string(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn rejection_is_reported() -> anyhow::Result<()> {
        let api = StubApi::new();
        api.push::<()>(
            Endpoint::UpdateUserPassword,
            Err(ApiError::Status {
                status: 400,
                message: "Invalid password".to_string(),
            }),
        );
        let vm = ViewModel::new(ResetUserPasswordViewModel::new(session(&api)));
        let mut events = vm.subscribe_events();

        vm.send(reset("wrong", "n3w")).await?;

        let Some(ResetPasswordEvent::Error(err)) = next_event(&mut events).await else {
            panic!("expected an error");
        };
        assert!(err.message().contains("Invalid password"));
        assert_eq!(vm.state(), ResetPasswordState::Initial);
        Ok(())
    }
}

mod editors {
    use super::*;

    fn tagged(tags: &[&str]) -> BaseItem {
        BaseItem {
            tags: Some(tags.iter().map(|tag| tag.to_string()).collect()),
            ..item("Heat")
        }
    }

    fn uploaded(api: &StubApi) -> Vec<BaseItem> {
        api.calls_to(Endpoint::UpdateItem)
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::UpdateItem(_, item) => Some(*item),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn adding_uploads_the_whole_list_and_refetches() -> anyhow::Result<()> {
        let api = StubApi::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let original = tagged(&["noir"]);
        let refetched = tagged(&["noir", "heist"]);
        api.push(Endpoint::Item, Ok(refetched.clone()));

        let vm = ViewModel::new(ItemEditorViewModel::new(
            TagEditor,
            session(&api),
            notifier.clone(),
            original.clone(),
        ));
        let mut events = vm.subscribe_events();
        vm.send(EditorAction::Add(vec!["noir".to_string(), "heist".to_string()]))
            .await?;

        assert_eq!(next_event(&mut events).await, Some(EditorEvent::Updated));
        let sent = uploaded(&api);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, original.id);
        assert_eq!(
            sent[0].tags,
            Some(vec!["noir".to_string(), "heist".to_string()])
        );
        assert_eq!(vm.fields().item.get(), refetched.clone());
        assert_eq!(vm.state(), EditorState::Content);
        assert_eq!(
            notifier.changes(),
            vec![ResourceChanged::ItemMetadata(Box::new(refetched))]
        );
        Ok(())
    }

    #[tokio::test]
    async fn removing_and_reordering_studios() -> anyhow::Result<()> {
        let api = StubApi::new();
        let a24 = NameGuidPair::new("A24", Some(ItemId::new()));
        let neon = NameGuidPair::new("Neon", Some(ItemId::new()));
        let ghibli = NameGuidPair::new("Ghibli", Some(ItemId::new()));
        let original = BaseItem {
            studios: Some(vec![a24.clone(), neon.clone(), ghibli.clone()]),
            ..item("Heat")
        };
        let after_remove = BaseItem {
            studios: Some(vec![a24.clone(), ghibli.clone()]),
            ..original.clone()
        };
        api.push(Endpoint::Item, Ok(after_remove.clone()));
        api.push(Endpoint::Item, Ok(after_remove.clone()));

        let vm = ViewModel::new(ItemEditorViewModel::new(
            StudioEditor,
            session(&api),
            Arc::new(RecordingNotifier::new()),
            original,
        ));
        let mut events = vm.subscribe_events();

        vm.send(EditorAction::Remove(vec![neon])).await?;
        assert_eq!(next_event(&mut events).await, Some(EditorEvent::Updated));
        vm.send(EditorAction::Reorder(vec![ghibli.clone(), a24.clone()]))
            .await?;
        assert_eq!(next_event(&mut events).await, Some(EditorEvent::Updated));

        let studios: Vec<_> = uploaded(&api).into_iter().map(|item| item.studios).collect();
        assert_eq!(
            studios,
            vec![
                Some(vec![a24.clone(), ghibli.clone()]),
                Some(vec![ghibli, a24]),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn load_then_search_studios() -> anyhow::Result<()> {
        let api = StubApi::new();
        api.push_page(
            Endpoint::Studios,
            vec![item("Warner Bros."), item("Walt Disney"), item("Pixar")],
        );

        let vm = ViewModel::new(ItemEditorViewModel::new(
            StudioEditor,
            session(&api),
            Arc::new(RecordingNotifier::new()),
            item("Heat"),
        ));
        let mut events = vm.subscribe_events();
        vm.send(EditorAction::Load).await?;
        assert_eq!(next_event(&mut events).await, Some(EditorEvent::Loaded));
        assert_eq!(vm.fields().elements.get().len(), 3);

        vm.respond(EditorAction::Search(" wa".to_string())).await?;
        let names: Vec<_> = vm
            .fields()
            .matches
            .get()
            .into_iter()
            .filter_map(|studio| studio.name)
            .collect();
        assert_eq!(names, vec!["Warner Bros.", "Walt Disney"]);
        Ok(())
    }

    #[tokio::test]
    async fn failed_upload_keeps_the_item() -> anyhow::Result<()> {
        let api = StubApi::new();
        api.push::<()>(Endpoint::UpdateItem, Err(ApiError::Unauthorized));
        let original = tagged(&["noir"]);

        let vm = ViewModel::new(ItemEditorViewModel::new(
            TagEditor,
            session(&api),
            Arc::new(RecordingNotifier::new()),
            original.clone(),
        ));
        let mut events = vm.subscribe_events();
        vm.send(EditorAction::Remove(vec!["noir".to_string()])).await?;

        assert!(matches!(
            next_event(&mut events).await,
            Some(EditorEvent::Error(CoreError::Transport(_)))
        ));
        assert!(matches!(vm.state(), EditorState::Error(_)));
        assert_eq!(vm.fields().item.get(), original);
        assert_eq!(api.call_count(Endpoint::Item), 0);
        Ok(())
    }
}
