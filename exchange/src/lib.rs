//! Zero-copy buffer exchange between two cooperating sides.
//!
//! A [`BufferExchange`] on each side of a connection owns a pool of
//! fixed-size byte regions and moves them back and forth through a
//! [`Transport`] whose send primitive transfers ownership of the backing
//! allocation rather than copying it. Each slot of the pool walks the ring
//!
//! ```text
//! NotAvailable -> Received -> Available -> Reserved -> Outgoing -> NotAvailable
//! ```
//!
//! so that at any moment a region is writable on exactly one side. Flow
//! control is by slot accounting: a sender defers a departing region while
//! the remote has no empty slot to receive into, and flushes deferred
//! regions opportunistically when the next message arrives.
//!
//! Each side is single-threaded and cooperative: [`BufferExchange::receive`]
//! pumps pending transport messages synchronously, and
//! [`BufferExchange::recv`] hands out arrived regions one delivery at a
//! time. Producers observe back-pressure as
//! [`BufferExchange::get_write_buffer`] returning `None`.

#![forbid(missing_docs)]

mod buffer;
pub mod config;
mod envelope;
mod error;
mod exchange;
pub mod logging;
pub mod transport;

pub use buffer::{Buffer, Released, State};
pub use config::Config;
pub use envelope::{Envelope, EXCHANGE_MAGIC};
pub use error::Error;
pub use exchange::{BufferExchange, Delivery, Identity};
pub use transport::Transport;
