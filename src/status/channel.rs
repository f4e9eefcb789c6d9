//! Status stream backed by a tokio channel

use super::{StatusEvent, StatusStream};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Message delivered to the receiving side of a [`ChannelStatusStream`]
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    Status(StatusEvent),
    End(String),
}

/// Forwards status events to whoever holds the receiver
#[derive(Debug)]
pub struct ChannelStatusStream {
    tx: UnboundedSender<StatusMessage>,
}

impl ChannelStatusStream {
    pub fn new() -> (Self, UnboundedReceiver<StatusMessage>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusStream for ChannelStatusStream {
    fn write_status(&self, event: StatusEvent) {
        if self.tx.send(StatusMessage::Status(event)).is_err() {
            debug!("Status receiver dropped, discarding event");
        }
    }

    fn end(self: Box<Self>, payload: &str) {
        if self.tx.send(StatusMessage::End(payload.to_string())).is_err() {
            debug!("Status receiver dropped before stream end");
        }
    }
}
