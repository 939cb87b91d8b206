//! A single transfer buffer and its lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The lifecycle state of a [`Buffer`].
///
/// States advance around one ring; every operation is legal in exactly one
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// This side does not hold the region.
    NotAvailable,
    /// An incoming region, not yet handed to the application.
    Received,
    /// A writable region held by the exchange, not yet handed out.
    Available,
    /// Handed to the application for writing.
    Reserved,
    /// Released by the application; pending transfer to the remote.
    Outgoing,
}

/// The transition performed by [`Buffer::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// A received region returned to the local free list.
    Available,
    /// A written region is now pending transfer.
    Outgoing,
}

/// Ownership of one fixed-size byte region, guarded by the lifecycle ring.
///
/// The region is present in every state except [`State::NotAvailable`] and
/// may only be written through [`Buffer::writable`] while reserved. A
/// buffer is owned by its exchange and never shared across threads; the
/// transport moves the region itself between sides.
#[derive(Debug)]
pub struct Buffer {
    state: State,
    region: Option<Vec<u8>>,
    source: Option<u32>,
}

impl Buffer {
    /// A buffer holding a fresh zeroed region, starting [`State::Available`].
    pub fn with_region(size: usize) -> Self {
        Buffer {
            state: State::Available,
            region: Some(vec![0; size]),
            source: None,
        }
    }

    /// A buffer without a region, starting [`State::NotAvailable`].
    pub fn empty() -> Self {
        Buffer {
            state: State::NotAvailable,
            region: None,
            source: None,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// True while this side holds the region.
    pub fn has_region(&self) -> bool {
        self.region.is_some()
    }

    /// Hands the region to the application for writing.
    ///
    /// `Available -> Reserved`.
    pub fn set_reserved(&mut self) -> Result<&mut [u8], Error> {
        match self.state {
            State::Available => {
                self.state = State::Reserved;
                Ok(self.region.as_mut().expect("an available buffer holds a region"))
            }
            state => Err(Error::IllegalState { op: "set_reserved", state }),
        }
    }

    /// Returns the buffer from the application.
    ///
    /// `Received -> Available` (the region rejoins the local free list) or
    /// `Reserved -> Outgoing` (the region is pending transfer).
    pub fn release(&mut self) -> Result<Released, Error> {
        match self.state {
            State::Received => {
                self.state = State::Available;
                self.source = None;
                Ok(Released::Available)
            }
            State::Reserved => {
                self.state = State::Outgoing;
                Ok(Released::Outgoing)
            }
            state => Err(Error::IllegalState { op: "release", state }),
        }
    }

    /// Moves the region out for the transport.
    ///
    /// `Outgoing -> NotAvailable`. The caller must not retain any view of
    /// the region.
    pub fn set_sent(&mut self) -> Result<Vec<u8>, Error> {
        match self.state {
            State::Outgoing => {
                self.state = State::NotAvailable;
                Ok(self.region.take().expect("an outgoing buffer holds a region"))
            }
            state => Err(Error::IllegalState { op: "set_sent", state }),
        }
    }

    /// Attaches an incoming region.
    ///
    /// `NotAvailable -> Received`.
    pub fn set_received(&mut self, region: Vec<u8>) -> Result<(), Error> {
        match self.state {
            State::NotAvailable => {
                self.region = Some(region);
                self.state = State::Received;
                Ok(())
            }
            state => Err(Error::IllegalState { op: "set_received", state }),
        }
    }

    /// Read access to a received region.
    pub fn readable(&self) -> Result<&[u8], Error> {
        match self.state {
            State::Received => {
                Ok(self.region.as_deref().expect("a received buffer holds a region"))
            }
            state => Err(Error::IllegalState { op: "readable", state }),
        }
    }

    /// Write access to a received region, for draining in place.
    pub fn readable_mut(&mut self) -> Result<&mut [u8], Error> {
        match self.state {
            State::Received => {
                Ok(self.region.as_deref_mut().expect("a received buffer holds a region"))
            }
            state => Err(Error::IllegalState { op: "readable", state }),
        }
    }

    /// Write access to a reserved region.
    pub fn writable(&mut self) -> Result<&mut [u8], Error> {
        match self.state {
            State::Reserved => {
                Ok(self.region.as_deref_mut().expect("a reserved buffer holds a region"))
            }
            state => Err(Error::IllegalState { op: "writable", state }),
        }
    }

    /// Tags the next transfer of this buffer for downstream routing.
    pub fn set_source(&mut self, source: Option<u32>) {
        self.source = source;
    }

    /// Takes the pending routing tag.
    pub fn take_source(&mut self) -> Option<u32> {
        self.source.take()
    }
}
