use crate::ids::{ItemId, ServerId, UserId};

/// A user account as the server describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct UserDto {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub server_id: Option<String>,
    pub has_password: bool,
    pub primary_image_tag: Option<String>,
    pub configuration: Option<UserConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct UserConfiguration {
    /// Libraries hidden from the "latest" rows on the home screen.
    pub latest_items_excludes: Vec<ItemId>,
}

/// Response of the sign-in endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct AuthenticationResult {
    pub user: Option<UserDto>,
    pub access_token: Option<String>,
    pub server_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct BrandingOptions {
    pub login_disclaimer: Option<String>,
    pub custom_css: Option<String>,
    pub splashscreen_enabled: bool,
}

/// How a saved user must prove presence before the client signs them in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UserAccessPolicy {
    #[default]
    None,
    RequireDeviceAuthentication,
    RequirePin,
}

impl UserAccessPolicy {
    pub fn display_title(&self) -> &'static str {
        match self {
            UserAccessPolicy::None => "None",
            UserAccessPolicy::RequireDeviceAuthentication => {
                "Device Authentication"
            }
            UserAccessPolicy::RequirePin => "Pin",
        }
    }
}

/// A user the client has signed in on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserState {
    pub id: UserId,
    pub server_id: ServerId,
    pub username: String,
    /// Empty when the token was revoked and the user must sign in again.
    pub access_token: String,
    pub access_policy: UserAccessPolicy,
    pub data: Option<UserDto>,
}

impl UserState {
    pub fn new(
        id: UserId,
        server_id: ServerId,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id,
            server_id,
            username: username.into(),
            access_token: String::new(),
            access_policy: UserAccessPolicy::None,
            data: None,
        }
    }

    pub fn needs_reauthentication(&self) -> bool {
        self.access_token.is_empty()
    }
}
