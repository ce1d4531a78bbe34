//! Status bar messages
//!
//! Fire-and-forget: the sender never waits and never learns whether anyone
//! displayed the message.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Display time for selection and property feedback
pub const SHORT_MESSAGE_MS: u32 = 2000;
/// Display time for deletion and load feedback
pub const LONG_MESSAGE_MS: u32 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub duration_ms: u32,
}

/// Sending half of the status channel
#[derive(Debug, Clone)]
pub struct StatusBar {
    sender: UnboundedSender<StatusMessage>,
}

impl StatusBar {
    pub fn show(&self, text: impl Into<String>, duration_ms: u32) {
        let text = text.into();
        log::info!("{text}");
        // Nobody listening is not an error
        let _ = self.sender.unbounded_send(StatusMessage { text, duration_ms });
    }
}

/// Creates a status bar and the receiver a view drains
pub fn status_channel() -> (StatusBar, UnboundedReceiver<StatusMessage>) {
    let (sender, receiver) = mpsc::unbounded();
    (StatusBar { sender }, receiver)
}

/// Everything currently queued on `receiver`, without blocking
pub fn drain(receiver: &mut UnboundedReceiver<StatusMessage>) -> Vec<StatusMessage> {
    let mut messages = Vec::new();
    while let Ok(Some(message)) = receiver.try_next() {
        messages.push(message);
    }
    messages
}
