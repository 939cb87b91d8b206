//! Failures surfaced by buffers and the exchange.

use std::fmt;

use crate::buffer::State;

/// An exchange failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A buffer operation was invoked in a state that does not permit it.
    ///
    /// Non-recoverable at the buffer level; the operation did not change
    /// the buffer.
    IllegalState {
        /// The operation that was attempted.
        op: &'static str,
        /// The state the buffer was in.
        state: State,
    },
    /// A valid message arrived but no local slot was free to receive it.
    ///
    /// The remote violated the slot-accounting contract; fatal.
    Overflow,
    /// The transport peer is gone.
    Disconnected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IllegalState { op, state } => {
                write!(f, "buffer operation {:?} not permitted in state {:?}", op, state)
            }
            Error::Overflow => {
                write!(f, "no free slot for an incoming region; remote broke slot accounting")
            }
            Error::Disconnected => write!(f, "transport peer disconnected"),
        }
    }
}

impl std::error::Error for Error {}
