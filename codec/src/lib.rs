//! Procedure-table driven batch call encoding.
//!
//! Two sides of a paired connection declare one shared [`ProcedureTable`]
//! and each compile it into an [`Endpoint`] for their own side. The endpoint
//! holds per-procedure writer specifications for the calls this side encodes
//! and reader specifications for the calls it decodes; both are plain
//! argument-kind tag lists driven by one generic writer and one generic
//! reader, so no per-call branching on the table is needed beyond a lookup.
//!
//! Batches live in fixed-size byte regions interpreted as 32-bit cells.
//! Cell 0 holds the call count; calls follow back to back. A [`BatchWriter`]
//! appends calls to a region borrowed for the duration of the batch, and
//! [`Endpoint::read_batch`] drains a received region in one pass, handing
//! every decoded call to a [`Dispatch`] target in encoded order.
//!
//! ```
//! use bex_codec::{ArgKind, Call, Endpoint, Procedure, ProcedureTable, Value};
//!
//! let table = ProcedureTable::new()
//!     .with(Procedure::new("add", &[ArgKind::Int, ArgKind::Int]).receiver("worker"));
//!
//! // the sending side
//! let main = Endpoint::compile(table.clone(), "main").unwrap();
//! let add = main.writer("add").unwrap();
//! let mut region = vec![0u8; main.required_buffer_size()];
//! let mut batch = main.write_batch(&mut region).unwrap();
//! batch.invoke(add, &[Value::Int(12), Value::Int(11)]).unwrap();
//! drop(batch);
//!
//! // the receiving side
//! let worker = Endpoint::compile(table, "worker").unwrap();
//! let mut sum = 0;
//! worker.read_batch(&mut region, &mut |call: Call<'_>| {
//!     sum += call.int(0).unwrap() + call.int(1).unwrap();
//! }).unwrap();
//! assert_eq!(sum, 23);
//! ```

#![forbid(missing_docs)]

mod batch;
mod cells;
mod dispatch;
mod endpoint;
mod error;
mod table;

pub use batch::{batch_calls, BatchWriter};
pub use dispatch::{Call, Dispatch, Value};
pub use endpoint::{Caller, Endpoint, DEFAULT_CHANNEL_CELLS};
pub use error::Error;
pub use table::{ArgKind, Procedure, ProcedureTable};
