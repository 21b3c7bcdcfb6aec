//! Screen view-models built on the reducer runtime and the paged engine.

pub mod channels;
pub mod home;
pub mod item_editor;
pub mod items;
pub mod media;
pub mod remote_images;
pub mod reset_password;
pub mod sessions;
pub mod sign_in;

pub use channels::{ChannelsFetcher, ChannelsViewModel, join_programs};
pub use home::{
    HomeAction, HomeBackground, HomeEvent, HomeFields, HomeState, HomeViewModel,
};
pub use item_editor::{
    EditorAction, EditorBackground, EditorEvent, EditorFields, EditorState,
    ElementEditor, ItemEditorViewModel, StudioEditor, StudioEditorViewModel,
    TagEditor, TagEditorViewModel,
};
pub use items::{ItemsFetcher, ItemsSource, ItemsViewModel};
pub use media::{
    MediaAction, MediaBackground, MediaFields, MediaState, MediaViewModel,
    arrange_libraries,
};
pub use remote_images::{
    ImageTarget, RemoteImageAction, RemoteImageBackground, RemoteImageEvent,
    RemoteImageFields, RemoteImageState, RemoteImagesFetcher,
    RemoteItemImageViewModel,
};
pub use reset_password::{
    ResetPasswordAction, ResetPasswordEvent, ResetPasswordState,
    ResetUserPasswordViewModel,
};
pub use sessions::{
    ActiveSessionsViewModel, SessionsAction, SessionsBackground, SessionsFields,
    SessionsState,
};
pub use sign_in::{
    SignInAction, SignInBackground, SignInEvent, SignInFields, SignInState,
    UserSignInViewModel,
};
