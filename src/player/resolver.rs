//! The media-resolution abstraction: turning a user-supplied locator into
//! playable track metadata.

use serenity::async_trait;

use super::track_metadata::TrackMetadata;
use super::PlayerResult;

/// Resolves a locator (URL or search term) into a playable track.
///
/// Resolution may take arbitrarily long; the coordinator imposes no timeout
/// of its own, a slow resolve simply delays that one entry. One locator
/// resolves to exactly one track; expanding playlists into multiple requests
/// is the front-end's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, locator: &str) -> PlayerResult<TrackMetadata>;
}
