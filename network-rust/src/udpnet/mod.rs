//! UDP transport: JSON broadcast of serializable values and plain text
//! datagrams exchanged with a single client.

pub mod bcast;
pub mod text;

mod sock;

use std::io;

use crossbeam_channel::SendError;

#[derive(Debug)]
pub enum RXError<T> {
    IOError(io::Error),
    CBCSendError(SendError<T>),
}

impl<T> From<io::Error> for RXError<T> {
    fn from(e: io::Error) -> Self {
        RXError::IOError(e)
    }
}

impl<T> From<SendError<T>> for RXError<T> {
    fn from(e: SendError<T>) -> Self {
        RXError::CBCSendError(e)
    }
}

impl<T> std::fmt::Display for RXError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RXError::IOError(e) => write!(f, "socket error: {}", e),
            RXError::CBCSendError(_) => write!(f, "receiving channel closed"),
        }
    }
}
