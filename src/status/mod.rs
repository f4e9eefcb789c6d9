//! Status reporting for deployment requests

mod channel;
mod event;

pub use channel::{ChannelStatusStream, StatusMessage};
pub use event::{StatusEvent, StatusLevel, StatusStream};
