use poise::{serenity_prelude as serenity, CreateReply};
use serenity::all::CreateEmbed;

use super::format_duration;
use crate::player::{QueueEntry, TrackMetadata};

/// Parse the metadata for the now playing and added to queue embeds
fn parse_metadata(metadata: &TrackMetadata) -> (String, String, String) {
    let title = metadata.title.clone();
    let url = metadata.url.clone().unwrap_or_else(|| "#".to_string());
    let duration_str = metadata
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "Unknown duration".to_string());

    (title, url, duration_str)
}

/// Create an embed for when a song is now playing
pub fn now_playing(metadata: &TrackMetadata) -> CreateEmbed {
    let (title, url, duration_str) = parse_metadata(metadata);

    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration_str), true)
        .color(0x00ff00);

    if let Some(requested_by) = &metadata.requested_by {
        embed = embed.field("Requested by", requested_by.clone(), true);
    }
    if let Some(thumbnail) = &metadata.thumbnail {
        embed = embed.thumbnail(thumbnail.clone());
    }

    embed
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(metadata: &TrackMetadata, position: usize) -> CreateEmbed {
    let (title, url, duration_str) = parse_metadata(metadata);

    let mut embed = CreateEmbed::new()
        .title("🎵 Added to Queue")
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration_str), true)
        .field("Position", format!("`#{}`", position), true)
        .color(0x00ff00);

    if let Some(thumbnail) = &metadata.thumbnail {
        embed = embed.thumbnail(thumbnail.clone());
    }

    embed
}

/// Create an embed for a failed resolution or playback attempt
pub fn playback_error(locator: &str, reason: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Playback Error")
        .description(format!("`{}`\n{}", locator, reason))
        .color(0xff0000)
}

/// Create an embed for the music queue
pub fn queue_list(current: &Option<TrackMetadata>, upcoming: &[QueueEntry]) -> CreateEmbed {
    let mut description = String::new();

    if let Some(metadata) = current {
        description.push_str("**🎵 Now Playing**\n");
        description.push_str(&format!(
            "**[{}]({})**",
            metadata.title,
            metadata.url.as_deref().unwrap_or("#")
        ));
        if let Some(duration) = metadata.duration {
            description.push_str(&format!(" `{}`", format_duration(duration)));
        }
        description.push_str("\n\n");
    } else {
        description.push_str("**🔇 Nothing playing**\n\n");
    }

    if upcoming.is_empty() {
        description.push_str("**📭 Queue is empty**");
    } else {
        description.push_str(&format!("**📋 Queue - {} tracks**\n", upcoming.len()));
        for (index, entry) in upcoming.iter().enumerate() {
            match entry {
                QueueEntry::Track(track) => {
                    description.push_str(&format!(
                        "{}. [{}]({})",
                        index + 1,
                        track.title,
                        track.url.as_deref().unwrap_or("#")
                    ));
                    if let Some(duration) = track.duration {
                        description.push_str(&format!(" `{}`", format_duration(duration)));
                    }
                }
                QueueEntry::Locator(locator) => {
                    description.push_str(&format!("{}. `{}` *(pending)*", index + 1, locator));
                }
            }
            description.push('\n');
        }
    }

    CreateEmbed::new()
        .title("🎵 Music Queue")
        .description(description)
        .color(0x00ff00)
}

/// Red error reply for command failures
pub fn error(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(description.into())
            .color(0xff0000),
    )
}

/// Green confirmation reply
pub fn success(title: &str, description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(title.to_string())
            .description(description.into())
            .color(0x00ff00),
    )
}
