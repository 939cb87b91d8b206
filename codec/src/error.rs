//! Failures surfaced by table compilation, encoding and decoding.

use std::fmt;

use crate::table::ArgKind;

/// A codec failure.
///
/// Encoding errors leave the batch exactly as it was before the failed
/// call; decoding errors abort the drain at the offending record.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The table declares a name twice for one `(instance, endpoint)` pair.
    DuplicateProcedure(String),
    /// No procedure with this name is writable from this endpoint.
    UnknownWriter(String),
    /// A decoded procedure id has no reader on this endpoint.
    UnknownReader(i32),
    /// A call supplied the wrong number of arguments.
    Arity {
        /// Procedure name.
        name: String,
        /// Declared argument count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },
    /// A call supplied an argument of the wrong kind.
    Kind {
        /// Procedure name.
        name: String,
        /// Zero-based argument position.
        index: usize,
        /// Declared kind.
        expected: ArgKind,
        /// Supplied kind.
        found: ArgKind,
    },
    /// An instanced procedure was invoked without an instance id.
    InstanceRequired(String),
    /// A plain procedure was invoked with an instance id.
    NotInstanced(String),
    /// An instanced call named an instance its registry does not hold.
    UnknownInstance {
        /// Registry name from the table.
        registry: String,
        /// Instance id carried by the call.
        id: u32,
    },
    /// The region cannot hold the encoded call.
    BatchFull {
        /// Cells the batch would occupy including this call.
        needed: usize,
        /// Cells the region holds.
        capacity: usize,
    },
    /// A read ran past the end of the region.
    Truncated {
        /// Cell position of the failed read.
        pos: usize,
        /// Region length in bytes.
        len: usize,
    },
    /// A decoded cell is not valid for its role.
    Malformed {
        /// Cell position of the offending value.
        pos: usize,
        /// The raw cell contents.
        cell: i32,
    },
    /// The region is too small to hold even an empty batch.
    RegionTooSmall(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateProcedure(name) => {
                write!(f, "procedure {:?} declared twice for one (instance, endpoint) pair", name)
            }
            Error::UnknownWriter(name) => {
                write!(f, "no procedure {:?} is writable from this endpoint", name)
            }
            Error::UnknownReader(id) => {
                write!(f, "no reader for procedure id {} on this endpoint", id)
            }
            Error::Arity { name, expected, found } => {
                write!(f, "procedure {:?} takes {} arguments, {} supplied", name, expected, found)
            }
            Error::Kind { name, index, expected, found } => write!(
                f,
                "procedure {:?} argument {} declared {:?}, {:?} supplied",
                name, index, expected, found
            ),
            Error::InstanceRequired(name) => {
                write!(f, "procedure {:?} is instanced; an instance id is required", name)
            }
            Error::NotInstanced(name) => {
                write!(f, "procedure {:?} is not instanced; no instance id applies", name)
            }
            Error::UnknownInstance { registry, id } => {
                write!(f, "registry {:?} holds no instance {}", registry, id)
            }
            Error::BatchFull { needed, capacity } => {
                write!(f, "batch needs {} cells, region holds {}", needed, capacity)
            }
            Error::Truncated { pos, len } => {
                write!(f, "read at cell {} runs past the {} byte region", pos, len)
            }
            Error::Malformed { pos, cell } => {
                write!(f, "cell {} holds invalid value {}", pos, cell)
            }
            Error::RegionTooSmall(len) => {
                write!(f, "{} byte region cannot hold a batch", len)
            }
        }
    }
}

impl std::error::Error for Error {}
