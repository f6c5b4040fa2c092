//! Implements the `MediaResolver` trait with the `yt-dlp` command-line tool.
//! Direct URLs are passed through as-is; anything else becomes a `ytsearch:`
//! query resolving to the first search result.

use serenity::async_trait;
use tokio::process::Command;
use tracing::info;

use super::is_url;
use crate::player::{MediaResolver, PlayerError, PlayerResult, TrackMetadata};

pub struct YtdlResolver;

#[async_trait]
impl MediaResolver for YtdlResolver {
    async fn resolve(&self, locator: &str) -> PlayerResult<TrackMetadata> {
        let target = if is_url(locator) {
            locator.to_string()
        } else {
            format!("ytsearch:{}", locator)
        };
        info!("Resolving locator via yt-dlp: {}", target);

        let output = Command::new("yt-dlp")
            .args([
                "-j",            // Output as JSON
                "--no-playlist", // Don't process playlists
                &target,
            ])
            .output()
            .await
            .map_err(|e| {
                PlayerError::AudioSourceError(format!("Failed to run yt-dlp: {}", e))
            })?;

        if !output.status.success() {
            return Err(classify_failure(locator, &output.stderr));
        }

        TrackMetadata::try_from(output)
    }
}

/// Map a yt-dlp failure onto the resolver error taxonomy, keeping the last
/// stderr line as the human-readable detail.
fn classify_failure(locator: &str, stderr: &[u8]) -> PlayerError {
    let stderr = String::from_utf8_lossy(stderr);
    let detail = stderr
        .lines()
        .last()
        .unwrap_or("yt-dlp failed without output")
        .to_string();

    if stderr.contains("Unsupported URL") {
        PlayerError::UnsupportedFormat(detail)
    } else if stderr.contains("Video unavailable") || stderr.contains("not found") {
        PlayerError::TrackNotFound(locator.to_string())
    } else if stderr.contains("unable to download")
        || stderr.contains("Unable to download")
        || stderr.contains("resolve host")
    {
        PlayerError::NetworkError(detail)
    } else {
        PlayerError::AudioSourceError(detail)
    }
}
