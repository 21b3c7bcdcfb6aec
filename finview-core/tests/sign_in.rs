mod support;

use std::sync::Arc;

use finview_contracts::notify::ResourceChanged;
use finview_core::testing::fixtures::{authentication, user};
use finview_core::testing::{
    ApiCall, Endpoint, MemoryUserStore, RecordingNotifier, StubApi, next_event,
    wait_for,
};
use finview_core::view_models::{
    SignInAction, SignInBackground, SignInEvent, SignInState, UserSignInViewModel,
};
use finview_core::{CoreError, ViewModel};
use finview_model::prelude::*;

struct Harness {
    api: StubApi,
    store: Arc<MemoryUserStore>,
    notifier: Arc<RecordingNotifier>,
    server_id: ServerId,
    vm: ViewModel<UserSignInViewModel>,
}

fn harness() -> Harness {
    let api = StubApi::new();
    let store = Arc::new(MemoryUserStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let server_id = ServerId::new();
    let vm = UserSignInViewModel::new(
        Arc::new(api.clone()),
        server_id,
        store.clone(),
        notifier.clone(),
    );
    Harness {
        api,
        store,
        notifier,
        server_id,
        vm: ViewModel::new(vm),
    }
}

fn sign_in(username: &str, password: &str) -> SignInAction {
    SignInAction::SignIn {
        username: username.to_string(),
        password: password.to_string(),
        policy: UserAccessPolicy::None,
    }
}

#[tokio::test]
async fn new_user_is_stored_and_signed_in() -> anyhow::Result<()> {
    support::init_tracing();
    let Harness {
        api,
        store,
        notifier,
        server_id,
        vm,
    } = harness();
    let alice = user("alice");
    let alice_id = alice.id.expect("fixture id");
    api.push(Endpoint::AuthenticateByName, Ok(authentication(&alice, "tok-1")));

    let mut events = vm.subscribe_events();
    let mut state = vm.subscribe_state();
    let answered = vm
        .respond(SignInAction::SignIn {
            username: " alice\u{FFFC}".to_string(),
            password: "secret\n".to_string(),
            policy: UserAccessPolicy::RequirePin,
        })
        .await?;
    assert_eq!(answered, SignInState::SigningIn);

    let Some(SignInEvent::SignedIn(signed_in)) = next_event(&mut events).await else {
        panic!("expected a sign-in");
    };
    assert_eq!(signed_in.id, alice_id);
    assert_eq!(signed_in.server_id, server_id);
    assert_eq!(signed_in.access_token, "tok-1");
    assert_eq!(signed_in.access_policy, UserAccessPolicy::RequirePin);
    assert_eq!(store.get(alice_id), Some(signed_in));
    assert_eq!(
        wait_for(&mut state, |s| *s == SignInState::Initial).await,
        Some(SignInState::Initial)
    );

    assert_eq!(
        api.calls_to(Endpoint::AuthenticateByName),
        vec![ApiCall::AuthenticateByName {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }]
    );
    assert_eq!(notifier.changes(), vec![ResourceChanged::UserSignedIn(alice_id)]);
    Ok(())
}

#[tokio::test]
async fn revoked_user_gets_a_fresh_token() -> anyhow::Result<()> {
    let Harness {
        api,
        store,
        server_id,
        vm,
        ..
    } = harness();
    let bob = user("bob");
    let bob_id = bob.id.expect("fixture id");
    store.insert(UserState::new(bob_id, server_id, "bob"));
    api.push(Endpoint::AuthenticateByName, Ok(authentication(&bob, "fresh")));

    let mut events = vm.subscribe_events();
    vm.send(sign_in("bob", "pw")).await?;

    let Some(SignInEvent::SignedIn(signed_in)) = next_event(&mut events).await else {
        panic!("expected a sign-in");
    };
    assert_eq!(signed_in.access_token, "fresh");
    assert_eq!(store.get(bob_id).map(|u| u.access_token), Some("fresh".into()));
    assert_eq!(store.len(), 1);
    Ok(())
}

#[tokio::test]
async fn duplicate_user_can_replace_the_stored_token() -> anyhow::Result<()> {
    let Harness {
        api,
        store,
        notifier,
        server_id,
        vm,
    } = harness();
    let carol = user("carol");
    let carol_id = carol.id.expect("fixture id");
    let mut stored = UserState::new(carol_id, server_id, "carol");
    stored.access_token = "old".to_string();
    store.insert(stored);
    api.push(Endpoint::AuthenticateByName, Ok(authentication(&carol, "new")));

    let mut events = vm.subscribe_events();
    vm.send(sign_in("carol", "pw")).await?;

    let Some(SignInEvent::DuplicateUser(duplicate)) = next_event(&mut events).await
    else {
        panic!("expected a duplicate");
    };
    assert_eq!(duplicate.access_token, "new");
    // Nothing is written until the user decides.
    assert_eq!(store.get(carol_id).map(|u| u.access_token), Some("old".into()));
    assert!(notifier.changes().is_empty());

    vm.send(SignInAction::SignInDuplicate {
        user: duplicate,
        replace: true,
    })
    .await?;
    let Some(SignInEvent::SignedIn(signed_in)) = next_event(&mut events).await else {
        panic!("expected a sign-in");
    };
    assert_eq!(signed_in.access_token, "new");
    assert_eq!(store.get(carol_id).map(|u| u.access_token), Some("new".into()));
    assert_eq!(notifier.changes(), vec![ResourceChanged::UserSignedIn(carol_id)]);
    Ok(())
}

#[tokio::test]
async fn keeping_the_duplicate_signs_in_without_writing() -> anyhow::Result<()> {
    let Harness {
        store, server_id, vm, ..
    } = harness();
    let mut stored = UserState::new(UserId::new(), server_id, "dave");
    stored.access_token = "old".to_string();
    store.insert(stored.clone());

    let mut events = vm.subscribe_events();
    let mut offered = stored.clone();
    offered.access_token = "new".to_string();
    vm.send(SignInAction::SignInDuplicate {
        user: offered.clone(),
        replace: false,
    })
    .await?;

    assert_eq!(
        next_event(&mut events).await,
        Some(SignInEvent::SignedIn(offered))
    );
    assert_eq!(store.get(stored.id), Some(stored));
    Ok(())
}

#[tokio::test]
async fn response_without_user_is_an_internal_error() -> anyhow::Result<()> {
    let Harness { api, store, vm, .. } = harness();
    api.push(
        Endpoint::AuthenticateWithQuickConnect,
        Ok(AuthenticationResult {
            user: None,
            access_token: Some("tok".to_string()),
            server_id: None,
        }),
    );

    let mut events = vm.subscribe_events();
    vm.send(SignInAction::SignInQuickConnect {
        secret: "abc123".to_string(),
        policy: UserAccessPolicy::None,
    })
    .await?;

    assert_eq!(
        next_event(&mut events).await,
        Some(SignInEvent::Error(CoreError::validation(
            "An internal error has occurred"
        )))
    );
    assert!(store.is_empty());
    assert_eq!(
        api.calls_to(Endpoint::AuthenticateWithQuickConnect),
        vec![ApiCall::AuthenticateWithQuickConnect("abc123".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn rejected_credentials_surface_as_error() -> anyhow::Result<()> {
    let Harness { vm, store, .. } = harness();
    let mut events = vm.subscribe_events();

    vm.send(sign_in("eve", "wrong")).await?;

    let event = next_event(&mut events).await;
    assert!(matches!(event, Some(SignInEvent::Error(CoreError::Transport(_)))));
    assert_eq!(vm.state(), SignInState::Initial);
    assert!(store.is_empty());
    Ok(())
}

#[tokio::test]
async fn cancel_abandons_the_sign_in() -> anyhow::Result<()> {
    let Harness { api, store, vm, .. } = harness();
    let frank = user("frank");
    let gate = api.push_gated(
        Endpoint::AuthenticateByName,
        Ok(authentication(&frank, "tok")),
    );

    let mut events = vm.subscribe_events();
    vm.send(sign_in("frank", "pw")).await?;
    assert!(support::eventually(|| api.call_count(Endpoint::AuthenticateByName) == 1).await);

    let state = vm.respond(SignInAction::Cancel).await?;
    assert_eq!(state, SignInState::Initial);

    gate.open();
    support::settle().await;
    assert!(events.try_recv().is_err());
    assert!(store.is_empty());
    Ok(())
}

#[tokio::test]
async fn public_data_fills_the_fields() -> anyhow::Result<()> {
    let Harness { api, vm, .. } = harness();
    let guests = vec![user("guest"), user("kids")];
    api.push(Endpoint::QuickConnectEnabled, Ok(true));
    api.push(Endpoint::PublicUsers, Ok(guests.clone()));
    api.push(
        Endpoint::BrandingOptions,
        Ok(BrandingOptions {
            login_disclaimer: Some("Family server".to_string()),
            ..BrandingOptions::default()
        }),
    );

    let fields = vm.fields();
    let mut disclaimer = fields.server_disclaimer.subscribe();
    let mut background = vm.subscribe_background();
    vm.send(SignInAction::GetPublicData).await?;

    let loaded = wait_for(&mut disclaimer, Option::is_some).await;
    assert_eq!(loaded, Some(Some("Family server".to_string())));
    assert!(fields.quick_connect_enabled.get());
    assert_eq!(fields.public_users.get(), guests);
    assert!(wait_for(&mut background, |set| set.is_empty()).await.is_some());
    assert!(!vm
        .background_states()
        .contains(&SignInBackground::GettingPublicData));
    Ok(())
}

#[tokio::test]
async fn blank_disclaimer_is_dropped() -> anyhow::Result<()> {
    let Harness { api, vm, .. } = harness();
    api.push(
        Endpoint::BrandingOptions,
        Ok(BrandingOptions {
            login_disclaimer: Some(String::new()),
            ..BrandingOptions::default()
        }),
    );

    let mut background = vm.subscribe_background();
    vm.send(SignInAction::GetPublicData).await?;
    assert!(support::eventually(|| api.call_count(Endpoint::BrandingOptions) == 1).await);
    assert!(wait_for(&mut background, |set| set.is_empty()).await.is_some());
    support::settle().await;

    assert_eq!(vm.fields().server_disclaimer.get(), None);
    assert!(!vm.fields().quick_connect_enabled.get());
    Ok(())
}
