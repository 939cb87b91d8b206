//! The ownership-moving transport seam.
//!
//! An exchange talks to its peer through anything that can move an
//! [`Envelope`] whole: an in-process channel, a shared-memory ring with a
//! doorbell, a domain socket with descriptor passing. The seam is two
//! operations; the in-process reference implementation backs them with a
//! pair of crossed `std::sync::mpsc` channels, whose send already transfers
//! the payload allocation without copying.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::envelope::Envelope;
use crate::error::Error;

/// A double-ended message carrier between two exchange sides.
pub trait Transport {
    /// Posts an envelope to the peer, moving ownership of the payload.
    fn post(&mut self, envelope: Envelope) -> Result<(), Error>;

    /// Retrieves one pending envelope, if any has arrived.
    fn poll(&mut self) -> Option<Envelope>;
}

/// One end of an in-process transport pair.
pub struct ProcessTransport {
    send: Sender<Envelope>,
    recv: Receiver<Envelope>,
}

/// Allocates two connected in-process transports.
///
/// The ends may live on different threads; each end belongs to exactly one
/// exchange.
pub fn pair() -> (ProcessTransport, ProcessTransport) {
    let (left_send, right_recv) = channel();
    let (right_send, left_recv) = channel();
    (
        ProcessTransport { send: left_send, recv: left_recv },
        ProcessTransport { send: right_send, recv: right_recv },
    )
}

impl Transport for ProcessTransport {
    fn post(&mut self, envelope: Envelope) -> Result<(), Error> {
        self.send.send(envelope).map_err(|_| Error::Disconnected)
    }

    fn poll(&mut self) -> Option<Envelope> {
        self.recv.try_recv().ok()
    }
}
