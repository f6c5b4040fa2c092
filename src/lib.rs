pub mod commands;
pub mod player;

use std::sync::{Arc, LazyLock};

use commands::music::utils::channel_notifier::ChannelNotifier;
use player::PlayerRegistry;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data available to every command invocation.
pub struct Data {
    pub registry: Arc<PlayerRegistry>,
    pub notifier: Arc<ChannelNotifier>,
}

/// Shared HTTP client handed to songbird's lazily-fetched youtube-dl inputs.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);
