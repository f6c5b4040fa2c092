pub mod leave;
pub mod loop_track;
pub mod play;
pub mod queue;
pub mod skip;
pub mod stop;
pub mod volume;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
