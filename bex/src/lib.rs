//! Zero-copy inter-worker batch RPC.
//!
//! Two cooperating sides, conventionally a "main" and a "worker", exchange
//! fixed-size binary regions through a transport whose send moves ownership
//! of the allocation, and fill those regions with batches of encoded
//! procedure calls. The [`exchange`] half keeps every region writable on
//! exactly one side at a time and applies slot-accounting flow control; the
//! [`codec`] half compiles a shared procedure table into per-procedure
//! writers and readers so a batch decodes in one pass with a table lookup
//! per call.
//!
//! # Example
//!
//! ```
//! use bex::{transport, ArgKind, BufferExchange, Call, Config, Endpoint,
//!           Identity, Procedure, ProcedureTable, Value};
//!
//! // One table, shared by both sides.
//! let table = ProcedureTable::new()
//!     .with(Procedure::new("add", &[ArgKind::Int, ArgKind::Int]).receiver("worker"));
//!
//! let main_side = Endpoint::compile(table.clone(), "main").unwrap();
//! let worker_side = Endpoint::compile(table, "worker").unwrap();
//!
//! let (to_worker, to_main) = transport::pair();
//! let config = Config::new(main_side.required_buffer_size(), 2);
//! let mut main = BufferExchange::new(to_worker, config, Identity::Assign);
//! let mut worker = BufferExchange::new(to_main, config, Identity::Adopt);
//!
//! // Encode a batch on the main side and hand the region over.
//! let add = main_side.writer("add").unwrap();
//! let slot = main.get_write_buffer().unwrap();
//! let mut batch = main_side.write_batch(main.write_region(slot).unwrap()).unwrap();
//! batch.invoke(add, &[Value::Int(12), Value::Int(11)]).unwrap();
//! drop(batch);
//! main.release(slot).unwrap();
//!
//! // Drain it on the worker side.
//! worker.receive().unwrap();
//! let delivery = worker.recv().unwrap();
//! let mut sum = 0;
//! worker_side
//!     .read_batch(worker.read_region_mut(delivery.slot).unwrap(), &mut |call: Call<'_>| {
//!         sum += call.int(0).unwrap() + call.int(1).unwrap();
//!     })
//!     .unwrap();
//! worker.release(delivery.slot).unwrap();
//! assert_eq!(sum, 23);
//! ```

#![forbid(missing_docs)]

pub use bex_codec as codec;
pub use bex_exchange as exchange;
pub use bex_logging as logging;

pub use bex_codec::{
    batch_calls, ArgKind, BatchWriter, Call, Caller, Dispatch, Endpoint, Procedure,
    ProcedureTable, Value, DEFAULT_CHANNEL_CELLS,
};
pub use bex_codec::Error as CodecError;
pub use bex_exchange::transport;
pub use bex_exchange::{
    Buffer, BufferExchange, Config, Delivery, Envelope, Identity, Released, State, Transport,
    EXCHANGE_MAGIC,
};
pub use bex_exchange::Error as ExchangeError;
