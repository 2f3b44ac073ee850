//! Channel errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel is closed")]
    Closed,

    #[error("Failed to send message: {0}")]
    Send(String),
}
