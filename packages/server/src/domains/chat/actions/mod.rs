//! Chat domain actions

mod channels;
mod token;

pub use channels::{create_channel, list_channels, ChannelRequest, CreatedChannel};
pub use token::{issue_chat_token, ChatToken};
