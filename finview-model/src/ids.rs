use std::str::FromStr;

use uuid::Uuid;

use crate::error::ModelError;

macro_rules! server_id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(&self) -> Uuid {
                self.0
            }

            /// Dash-free form used in server paths and query strings.
            pub fn as_path_segment(&self) -> String {
                self.0.simple().to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                if value.is_empty() {
                    return Err(ModelError::InvalidId(format!(
                        "{} cannot be empty",
                        stringify!($name)
                    )));
                }
                Uuid::parse_str(value)
                    .map(Self)
                    .map_err(|err| ModelError::InvalidId(format!("{value}: {err}")))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.simple())
            }
        }
    };
}

server_id_type!(
    /// Identifier of any server-side item (movie, episode, channel, folder).
    ItemId
);

server_id_type!(
    /// Identifier of a user account on a server.
    UserId
);

server_id_type!(
    /// Identifier of a media server instance.
    ServerId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dash_free_server_ids() {
        let id: ItemId = "4fa0b1b3c1d84cb8a0d7a1c3f2e9b001".parse().unwrap();
        assert_eq!(id.to_string(), "4fa0b1b3c1d84cb8a0d7a1c3f2e9b001");
        assert_eq!(id.as_path_segment(), id.to_string());
    }

    #[test]
    fn rejects_empty_ids() {
        assert!(matches!(
            "".parse::<UserId>(),
            Err(ModelError::InvalidId(_))
        ));
    }
}
