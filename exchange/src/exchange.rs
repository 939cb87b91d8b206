//! The double-ended pool coordinating region transfer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use bex_logging::Logger;

use crate::buffer::{Buffer, Released, State};
use crate::config::Config;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::logging::{DropEvent, ExchangeEvent, MessageEvent, SlotEvent};
use crate::transport::Transport;

/// Process-wide source of fresh pair ids. Id 0 means "not yet bound".
static INSTANCES: AtomicU32 = AtomicU32::new(1);

fn fresh_instance() -> u32 {
    INSTANCES.fetch_add(1, Ordering::Relaxed)
}

/// How an exchange obtains the id binding it to its peer.
///
/// A pair converges on one id with no handshake: exactly one side should
/// assign (or be left to assign on its first send) and the other adopt the
/// id of the first valid message it sees. Sides that both assign will drop
/// each other's traffic. [`Identity::Fixed`] sidesteps adoption entirely by
/// configuring both sides with one pre-agreed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Draw a fresh process-unique id at construction.
    Assign,
    /// Start unbound; adopt the id of the first valid message.
    Adopt,
    /// Use a pre-agreed id.
    Fixed(u32),
}

/// An arrived region ready for reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// The slot now holding the region, in [`State::Received`].
    pub slot: usize,
    /// The routing tag the sender attached, if any.
    pub source: Option<u32>,
}

/// One side of a paired, zero-copy buffer exchange.
///
/// Owns `2 * buffer_count` slots: half start [`State::Available`] with
/// fresh regions, half start [`State::NotAvailable`] so that every region
/// the remote holds has an empty slot to land in. `slots_available` counts
/// the empty slots, which mirrors how many regions the remote side
/// currently holds; it grows by one per send and shrinks by one per
/// receive.
///
/// Dropping the exchange drops its transport end, detaching from the peer.
pub struct BufferExchange<T: Transport> {
    transport: T,
    slots: Vec<Buffer>,
    /// Count of empty slots; the local mirror of the remote's holdings.
    slots_available: usize,
    /// Pair id; 0 until bound by assignment or adoption.
    instance: u32,
    delivered: VecDeque<Delivery>,
    logger: Option<Logger<ExchangeEvent>>,
}

impl<T: Transport> BufferExchange<T> {
    /// Builds a pool of `2 * config.buffer_count` slots over `transport`.
    pub fn new(transport: T, config: Config, identity: Identity) -> Self {
        let count = config.buffer_count;
        let mut slots = Vec::with_capacity(2 * count);
        slots.extend((0..count).map(|_| Buffer::with_region(config.buffer_size)));
        slots.extend((0..count).map(|_| Buffer::empty()));

        let instance = match identity {
            Identity::Assign => fresh_instance(),
            Identity::Adopt => 0,
            Identity::Fixed(id) => id,
        };

        BufferExchange {
            transport,
            slots,
            slots_available: count,
            instance,
            delivered: VecDeque::new(),
            logger: None,
        }
    }

    /// Installs a destination for structured exchange events.
    pub fn set_logger(&mut self, logger: Logger<ExchangeEvent>) {
        self.logger = Some(logger);
    }

    /// The pair id, or 0 while unbound.
    pub fn instance(&self) -> u32 {
        self.instance
    }

    /// Total slots in the pool.
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Empty slots; equivalently, regions currently held by the remote.
    pub fn slots_available(&self) -> usize {
        self.slots_available
    }

    /// Slots currently holding a region on this side.
    pub fn regions_held(&self) -> usize {
        self.slots.iter().filter(|buffer| buffer.has_region()).count()
    }

    /// The lifecycle state of one slot.
    pub fn slot_state(&self, slot: usize) -> State {
        self.slots[slot].state()
    }

    /// Reserves the first available slot for writing.
    ///
    /// Returns `None` when every region is in flight or handed out;
    /// back-pressure, not an error.
    pub fn get_write_buffer(&mut self) -> Option<usize> {
        let slot = self.slots.iter().position(|buffer| buffer.state() == State::Available)?;
        self.slots[slot]
            .set_reserved()
            .expect("the located slot is available");
        self.log(SlotEvent { slot, state: State::Reserved });
        Some(slot)
    }

    /// The writable region of a reserved slot.
    pub fn write_region(&mut self, slot: usize) -> Result<&mut [u8], Error> {
        self.slots[slot].writable()
    }

    /// The readable region of a received slot.
    pub fn read_region(&self, slot: usize) -> Result<&[u8], Error> {
        self.slots[slot].readable()
    }

    /// The readable region of a received slot, mutable so a batch drain can
    /// clear its count cell in place.
    pub fn read_region_mut(&mut self, slot: usize) -> Result<&mut [u8], Error> {
        self.slots[slot].readable_mut()
    }

    /// Returns a slot from the application.
    ///
    /// A received slot rejoins the local free list. A reserved slot becomes
    /// outgoing and is sent at once while the remote has an empty slot to
    /// receive into, deferred for a later flush otherwise.
    pub fn release(&mut self, slot: usize) -> Result<(), Error> {
        self.release_tagged(slot, None)
    }

    /// As [`release`], attaching a routing tag carried to the remote
    /// delivery.
    ///
    /// [`release`]: BufferExchange::release
    pub fn release_tagged(&mut self, slot: usize, source: Option<u32>) -> Result<(), Error> {
        match self.slots[slot].release()? {
            Released::Available => {
                self.log(SlotEvent { slot, state: State::Available });
                Ok(())
            }
            Released::Outgoing => {
                self.slots[slot].set_source(source);
                self.log(SlotEvent { slot, state: State::Outgoing });
                if self.slots.len() - self.slots_available >= 1 {
                    self.send(slot)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Pumps the transport until no message is pending.
    ///
    /// Invalid envelopes are dropped silently. Each valid envelope first
    /// flushes any deferred outgoing slot, then lands in an empty slot and
    /// is queued for [`recv`]; a valid envelope with no empty slot to land
    /// in is a fatal [`Error::Overflow`].
    ///
    /// [`recv`]: BufferExchange::recv
    pub fn receive(&mut self) -> Result<(), Error> {
        while let Some(envelope) = self.transport.poll() {
            if !envelope.valid() {
                self.log(DropEvent {
                    identifier: envelope.identifier,
                    instance: envelope.instance,
                });
                continue;
            }
            if self.instance == 0 {
                // No handshake: the first valid message binds the pair.
                self.instance = envelope.instance;
            } else if envelope.instance != self.instance {
                self.log(DropEvent {
                    identifier: envelope.identifier,
                    instance: envelope.instance,
                });
                continue;
            }
            self.on_data(envelope)?;
        }
        Ok(())
    }

    /// Pops the next arrived region, in arrival order.
    pub fn recv(&mut self) -> Option<Delivery> {
        self.delivered.pop_front()
    }

    fn on_data(&mut self, envelope: Envelope) -> Result<(), Error> {
        // Every receive opens a slot on the remote, so deferred sends can
        // proceed now; one pass flushes them and locates a landing slot.
        // Flushes complete before the delivery is queued, preserving batch
        // order.
        let mut candidate = None;
        for slot in 0..self.slots.len() {
            match self.slots[slot].state() {
                State::Outgoing => self.send(slot)?,
                State::NotAvailable if candidate.is_none() => candidate = Some(slot),
                _ => {}
            }
        }

        let slot = candidate.ok_or(Error::Overflow)?;
        let length = envelope.payload.len();
        self.slots[slot].set_received(envelope.payload)?;
        self.slots_available -= 1;
        self.log(SlotEvent { slot, state: State::Received });
        self.log(MessageEvent {
            is_send: false,
            instance: envelope.instance,
            length,
            source: envelope.source,
        });
        self.delivered.push_back(Delivery { slot, source: envelope.source });
        Ok(())
    }

    fn send(&mut self, slot: usize) -> Result<(), Error> {
        if self.instance == 0 {
            // An unbound side that speaks first binds the pair itself.
            self.instance = fresh_instance();
        }
        let source = self.slots[slot].take_source();
        let payload = self.slots[slot].set_sent()?;
        let length = payload.len();
        self.transport.post(Envelope::new(self.instance, source, payload))?;
        self.slots_available += 1;
        self.log(SlotEvent { slot, state: State::NotAvailable });
        self.log(MessageEvent { is_send: true, instance: self.instance, length, source });
        Ok(())
    }

    fn log<E: Into<ExchangeEvent>>(&self, event: E) {
        if let Some(logger) = &self.logger {
            logger.log(event.into());
        }
    }
}
