//! The wire envelope moved through a transport.

use serde::{Deserialize, Serialize};

/// Magic value identifying exchange traffic.
///
/// Messages with any other identifier belong to someone else and are
/// dropped without touching exchange state.
pub const EXCHANGE_MAGIC: u32 = 2_504_718_562;

/// One transferred message: a protocol header and the moved region.
///
/// The payload allocation travels by ownership; the posting side must not
/// retain any view of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Protocol magic, [`EXCHANGE_MAGIC`] for valid traffic.
    pub identifier: u32,
    /// Pair id of the sending exchange.
    pub instance: u32,
    /// Caller-supplied routing tag, when one was attached at release.
    pub source: Option<u32>,
    /// The moved byte region.
    pub payload: Vec<u8>,
}

impl Envelope {
    /// An envelope carrying `payload` for the pair `instance`.
    pub fn new(instance: u32, source: Option<u32>, payload: Vec<u8>) -> Self {
        Envelope {
            identifier: EXCHANGE_MAGIC,
            instance,
            source,
            payload,
        }
    }

    /// True when the identifier marks exchange traffic.
    pub fn valid(&self) -> bool {
        self.identifier == EXCHANGE_MAGIC
    }
}
