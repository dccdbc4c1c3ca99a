mod relay_message;
mod tweet;

pub use relay_message::{MissingParameters, RelayMessage};
pub use tweet::Tweet;
