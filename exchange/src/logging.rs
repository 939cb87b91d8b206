//! Structured events describing exchange activity.
//!
//! An exchange with a logger installed reports every transfer in both
//! directions, every slot transition, and every message it drops. Consumers
//! bind a destination through [`bex_logging::Registry`] or construct a
//! [`bex_logging::Logger`] directly.

use serde::{Deserialize, Serialize};

use crate::buffer::State;

/// Various exchange events.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum ExchangeEvent {
    /// An observed transfer.
    Message(MessageEvent),
    /// A slot transition.
    Slot(SlotEvent),
    /// A rejected message.
    Drop(DropEvent),
}

/// An observed transfer.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct MessageEvent {
    /// True for a send, false for a receive.
    pub is_send: bool,
    /// The pair id the message carried.
    pub instance: u32,
    /// Payload length in bytes.
    pub length: usize,
    /// Routing tag, when one was attached.
    pub source: Option<u32>,
}

/// A slot transition.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct SlotEvent {
    /// Slot index within the pool.
    pub slot: usize,
    /// The state entered.
    pub state: State,
}

/// A message rejected by envelope validation.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct DropEvent {
    /// The identifier the message carried.
    pub identifier: u32,
    /// The pair id the message carried.
    pub instance: u32,
}

impl From<MessageEvent> for ExchangeEvent {
    fn from(v: MessageEvent) -> ExchangeEvent {
        ExchangeEvent::Message(v)
    }
}

impl From<SlotEvent> for ExchangeEvent {
    fn from(v: SlotEvent) -> ExchangeEvent {
        ExchangeEvent::Slot(v)
    }
}

impl From<DropEvent> for ExchangeEvent {
    fn from(v: DropEvent) -> ExchangeEvent {
        ExchangeEvent::Drop(v)
    }
}
