//! Transport adapters implementing
//! [`MediaServerApi`](finview_contracts::api::MediaServerApi).

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpMediaServerClient;
