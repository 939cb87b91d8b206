//! Declarative description of the shared procedure table.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::Error;

/// Argument kinds of short procedure signatures, stored inline.
pub(crate) type ArgKinds = SmallVec<[ArgKind; 4]>;

/// The kind of one procedure parameter.
///
/// `Int` and `Float` occupy one 32-bit cell each; `Str` is a length cell
/// followed by one cell per code unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgKind {
    /// 32-bit signed integer.
    Int,
    /// 32-bit float.
    Float,
    /// Length-prefixed sequence of 32-bit code units.
    Str,
}

/// One callable procedure.
///
/// Procedures are declared by the consumer and must be identical, in order
/// and content, on both sides of a connection. The procedure id on the wire
/// is its 1-based position in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    name: String,
    args: ArgKinds,
    instance: Option<String>,
    endpoint: Option<String>,
}

impl Procedure {
    /// Declares a procedure with the given parameter kinds.
    ///
    /// Without further qualification the procedure is symmetric: both sides
    /// compile a writer and a reader for it.
    pub fn new(name: &str, args: &[ArgKind]) -> Self {
        Procedure {
            name: name.to_owned(),
            args: args.iter().copied().collect(),
            instance: None,
            endpoint: None,
        }
    }

    /// Names the endpoint that receives and executes this procedure.
    ///
    /// The opposite endpoint encodes it.
    pub fn receiver(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_owned());
        self
    }

    /// Routes calls through the named instance registry on the receiving
    /// side; each encoded call then carries an instance id.
    pub fn instanced(mut self, registry: &str) -> Self {
        self.instance = Some(registry.to_owned());
        self
    }

    /// The procedure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameter kinds, in order.
    pub fn args(&self) -> &[ArgKind] {
        &self.args
    }

    /// The instance registry, for instanced procedures.
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// The receiving endpoint, when the procedure is one-directional.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub(crate) fn arg_kinds(&self) -> &ArgKinds {
        &self.args
    }
}

/// An ordered list of procedures shared by both endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureTable {
    entries: Vec<Procedure>,
}

impl ProcedureTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a procedure, builder style.
    pub fn with(mut self, procedure: Procedure) -> Self {
        self.entries.push(procedure);
        self
    }

    /// Appends a procedure.
    pub fn push(&mut self, procedure: Procedure) {
        self.entries.push(procedure);
    }

    /// Number of declared procedures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no procedures are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the declarations in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Procedure> {
        self.entries.iter()
    }

    /// Checks that no name repeats within one `(instance, endpoint)` pair.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert((entry.name(), entry.instance(), entry.endpoint())) {
                return Err(Error::DuplicateProcedure(entry.name().to_owned()));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ProcedureTable {
    type Item = &'a Procedure;
    type IntoIter = std::slice::Iter<'a, Procedure>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {

    use super::{ArgKind, Procedure, ProcedureTable};
    use crate::error::Error;

    #[test]
    fn duplicate_names_rejected_per_scope() {
        let table = ProcedureTable::new()
            .with(Procedure::new("tick", &[ArgKind::Int]).receiver("worker"))
            .with(Procedure::new("tick", &[ArgKind::Int]).receiver("worker"));
        assert_eq!(table.validate(), Err(Error::DuplicateProcedure("tick".to_owned())));
    }

    #[test]
    fn same_name_in_distinct_scopes_allowed() {
        let table = ProcedureTable::new()
            .with(Procedure::new("tick", &[ArgKind::Int]).receiver("worker"))
            .with(Procedure::new("tick", &[ArgKind::Int]).receiver("main"))
            .with(Procedure::new("tick", &[ArgKind::Int]).receiver("worker").instanced("ents"));
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn tables_serialize_for_sharing() {
        let table = ProcedureTable::new()
            .with(Procedure::new("config", &[ArgKind::Str, ArgKind::Int, ArgKind::Float]).receiver("worker"));
        let json = serde_json::to_string(&table).expect("serialize");
        let back: ProcedureTable = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(table, back);
    }
}
