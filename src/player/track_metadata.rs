//! Defines the `TrackMetadata` struct, a unified representation of a playable
//! track, and the queue entry wrapper the coordinator consumes.

use std::process::Output;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::PlayerError;

/// Unified representation of metadata for a playable track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The direct URL to the track, if available. Doubles as the locator the
    /// playback device streams from and as the re-queue target for `loop`.
    pub url: Option<String>,
    /// The duration of the track, if available.
    #[serde(with = "humantime_serde")]
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// The name of the user who requested the track.
    pub requested_by: Option<String>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            url: None,
            duration: None,
            thumbnail: None,
            requested_by: None,
        }
    }
}

/// A single pending request in a guild's queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEntry {
    /// A user-supplied locator (URL or search term), not yet resolved. The
    /// coordinator resolves these lazily when they reach the front.
    Locator(String),
    /// A fully resolved track, playable as-is.
    Track(TrackMetadata),
}

impl QueueEntry {
    /// Display label for queue listings, without forcing resolution.
    pub fn title(&self) -> &str {
        match self {
            QueueEntry::Locator(locator) => locator,
            QueueEntry::Track(track) => &track.title,
        }
    }
}

/// Converts the output of `yt-dlp --dump-json` into `TrackMetadata`.
impl TryFrom<Output> for TrackMetadata {
    type Error = PlayerError;

    fn try_from(value: Output) -> Result<Self, Self::Error> {
        let metadata_str = String::from_utf8_lossy(&value.stdout);
        let metadata_json: serde_json::Value =
            serde_json::from_str(&metadata_str).map_err(|e| {
                PlayerError::AudioSourceError(format!("Failed to parse track metadata: {}", e))
            })?;

        let title = metadata_json["title"]
            .as_str()
            .unwrap_or("Unknown Title")
            .to_string();

        let duration = metadata_json["duration"]
            .as_f64()
            .map(Duration::from_secs_f64);

        let thumbnail = metadata_json["thumbnail"].as_str().map(|s| s.to_string());

        let url = metadata_json["webpage_url"].as_str().map(|s| s.to_string());

        Ok(TrackMetadata {
            title,
            url,
            duration,
            thumbnail,
            requested_by: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn ytdl_output(json: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(0),
            stdout: json.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn parses_ytdl_json_dump() {
        let output = ytdl_output(
            r#"{
                "title": "Test Track",
                "duration": 212.5,
                "thumbnail": "https://img.example/t.jpg",
                "webpage_url": "https://www.youtube.com/watch?v=abc123"
            }"#,
        );

        let metadata = TrackMetadata::try_from(output).unwrap();
        assert_eq!(metadata.title, "Test Track");
        assert_eq!(metadata.duration, Some(Duration::from_secs_f64(212.5)));
        assert_eq!(metadata.thumbnail.as_deref(), Some("https://img.example/t.jpg"));
        assert_eq!(
            metadata.url.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(metadata.requested_by, None);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let metadata = TrackMetadata::try_from(ytdl_output("{}")).unwrap();
        assert_eq!(metadata.title, "Unknown Title");
        assert_eq!(metadata.url, None);
        assert_eq!(metadata.duration, None);
    }

    #[test]
    fn garbage_output_is_a_source_error() {
        let result = TrackMetadata::try_from(ytdl_output("not json"));
        assert!(matches!(result, Err(PlayerError::AudioSourceError(_))));
    }

    #[test]
    fn queue_entry_titles() {
        let locator = QueueEntry::Locator("lo-fi beats".to_string());
        assert_eq!(locator.title(), "lo-fi beats");

        let track = QueueEntry::Track(TrackMetadata {
            title: "Rainy Mood".to_string(),
            ..Default::default()
        });
        assert_eq!(track.title(), "Rainy Mood");
    }
}
