//! Compilation of a procedure table for one side of a connection.

use std::collections::HashMap;

use crate::error::Error;
use crate::table::{ArgKinds, ProcedureTable};

/// Default channel capacity in 32-bit cells.
pub const DEFAULT_CHANNEL_CELLS: usize = 32 * 1024;

/// The write-side specification of one procedure.
pub(crate) struct WriterSpec {
    /// 1-based procedure id on the wire.
    pub id: u32,
    /// Declared name, for diagnostics.
    pub name: String,
    /// Whether encoded calls carry an instance id.
    pub instanced: bool,
    /// Declared argument kinds.
    pub args: ArgKinds,
}

/// The read-side specification of one procedure.
pub(crate) struct ReaderSpec {
    /// Declared name, presented to dispatch targets.
    pub name: String,
    /// Instance registry, for instanced procedures.
    pub registry: Option<String>,
    /// Declared argument kinds.
    pub args: ArgKinds,
}

/// A cheap handle resolving one writable procedure on an [`Endpoint`].
///
/// Obtained from [`Endpoint::writer`] and valid only for the endpoint that
/// issued it. Applications typically resolve handles once at setup and wrap
/// them in typed methods.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub(crate) index: usize,
}

/// A procedure table compiled for one named side.
///
/// Compilation splits the table: entries received elsewhere become writers
/// here, entries received here become readers, and entries with no receiver
/// become both. The compiled endpoint is immutable and may back any number
/// of concurrent batch writers and readers.
pub struct Endpoint {
    local: String,
    writers: Vec<WriterSpec>,
    by_name: HashMap<String, usize>,
    /// Reader specs indexed by procedure id; index 0 is the count cell.
    readers: Vec<Option<ReaderSpec>>,
    channel_cells: usize,
}

impl Endpoint {
    /// Compiles `table` for the endpoint named `local`, with the default
    /// channel capacity.
    pub fn compile(table: ProcedureTable, local: &str) -> Result<Self, Error> {
        Self::compile_with_channel(table, local, DEFAULT_CHANNEL_CELLS)
    }

    /// Compiles `table` for the endpoint named `local` with an explicit
    /// channel capacity in cells.
    pub fn compile_with_channel(
        table: ProcedureTable,
        local: &str,
        channel_cells: usize,
    ) -> Result<Self, Error> {
        table.validate()?;

        let mut writers = Vec::new();
        let mut by_name = HashMap::new();
        let mut readers: Vec<Option<ReaderSpec>> = Vec::with_capacity(table.len() + 1);
        readers.push(None); // id 0 is the batch call count

        for entry in &table {
            let id = readers.len() as u32;
            let writes = entry.endpoint() != Some(local);
            let reads = entry.endpoint().map_or(true, |name| name == local);

            if writes {
                let key = match entry.instance() {
                    Some(registry) => format!("{}.{}", registry, entry.name()),
                    None => entry.name().to_owned(),
                };
                if by_name.insert(key, writers.len()).is_some() {
                    return Err(Error::DuplicateProcedure(entry.name().to_owned()));
                }
                writers.push(WriterSpec {
                    id,
                    name: entry.name().to_owned(),
                    instanced: entry.instance().is_some(),
                    args: entry.arg_kinds().clone(),
                });
            }

            readers.push(if reads {
                Some(ReaderSpec {
                    name: entry.name().to_owned(),
                    registry: entry.instance().map(str::to_owned),
                    args: entry.arg_kinds().clone(),
                })
            } else {
                None
            });
        }

        Ok(Endpoint {
            local: local.to_owned(),
            writers,
            by_name,
            readers,
            channel_cells,
        })
    }

    /// Resolves a writable procedure by name.
    ///
    /// Instanced procedures are keyed by their registry-qualified name,
    /// `registry.name`.
    pub fn writer(&self, name: &str) -> Result<Caller, Error> {
        self.by_name
            .get(name)
            .map(|&index| Caller { index })
            .ok_or_else(|| Error::UnknownWriter(name.to_owned()))
    }

    /// The name this endpoint was compiled for.
    pub fn local(&self) -> &str {
        &self.local
    }

    /// The channel capacity in 32-bit cells.
    pub fn channel_cells(&self) -> usize {
        self.channel_cells
    }

    /// Bytes a transfer region must hold for a full channel.
    pub fn required_buffer_size(&self) -> usize {
        self.channel_cells * crate::cells::CELL
    }

    pub(crate) fn writer_spec(&self, caller: Caller) -> Result<&WriterSpec, Error> {
        self.writers
            .get(caller.index)
            .ok_or_else(|| Error::UnknownWriter(format!("#{}", caller.index)))
    }

    pub(crate) fn reader_spec(&self, id: i32) -> Result<&ReaderSpec, Error> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.readers.get(index))
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownReader(id))
    }
}

#[cfg(test)]
mod tests {

    use super::{Endpoint, DEFAULT_CHANNEL_CELLS};
    use crate::error::Error;
    use crate::table::{ArgKind, Procedure, ProcedureTable};

    fn table() -> ProcedureTable {
        ProcedureTable::new()
            .with(Procedure::new("add", &[ArgKind::Int, ArgKind::Int]).receiver("worker"))
            .with(Procedure::new("report", &[ArgKind::Str]).receiver("main"))
            .with(Procedure::new("tick", &[ArgKind::Int]).receiver("worker").instanced("ents"))
            .with(Procedure::new("sync", &[]))
    }

    #[test]
    fn sides_split_writers_and_readers() {
        let main = Endpoint::compile(table(), "main").unwrap();
        assert!(main.writer("add").is_ok());
        assert!(main.writer("ents.tick").is_ok());
        assert!(main.writer("report").is_err());
        assert!(main.reader_spec(2).is_ok()); // report
        assert!(main.reader_spec(1).is_err()); // add decodes on the worker

        let worker = Endpoint::compile(table(), "worker").unwrap();
        assert!(worker.writer("report").is_ok());
        assert!(worker.writer("add").is_err());
        assert!(worker.reader_spec(1).is_ok());
        assert!(worker.reader_spec(3).is_ok());
    }

    #[test]
    fn symmetric_procedures_compile_both_ways() {
        for side in ["main", "worker"] {
            let endpoint = Endpoint::compile(table(), side).unwrap();
            assert!(endpoint.writer("sync").is_ok());
            assert!(endpoint.reader_spec(4).is_ok());
        }
    }

    #[test]
    fn instanced_writers_use_qualified_names() {
        let main = Endpoint::compile(table(), "main").unwrap();
        assert_eq!(main.writer("tick").unwrap_err(), Error::UnknownWriter("tick".to_owned()));
    }

    #[test]
    fn id_zero_is_reserved() {
        let main = Endpoint::compile(table(), "main").unwrap();
        for id in [0, -1, 99] {
            assert_eq!(main.reader_spec(id).err(), Some(Error::UnknownReader(id)));
        }
    }

    #[test]
    fn required_size_follows_channel_cells() {
        let endpoint = Endpoint::compile(table(), "main").unwrap();
        assert_eq!(endpoint.required_buffer_size(), DEFAULT_CHANNEL_CELLS * 4);
        let small = Endpoint::compile_with_channel(table(), "main", 64).unwrap();
        assert_eq!(small.required_buffer_size(), 256);
    }
}
