//! Encoding and draining of call batches over borrowed regions.

use smallvec::SmallVec;

use crate::cells;
use crate::dispatch::{Call, Dispatch, Value};
use crate::endpoint::{Caller, Endpoint};
use crate::error::Error;
use crate::table::ArgKind;

/// The call count of an arbitrary batch region.
///
/// Cell 0 of a drained region reads zero; a region with pending calls reads
/// their number.
pub fn batch_calls(region: &[u8]) -> Result<u32, Error> {
    let count = cells::get_int(region, 0)?;
    u32::try_from(count).map_err(|_| Error::Malformed { pos: 0, cell: count })
}

/// An in-progress batch over a borrowed write region.
///
/// Created by [`Endpoint::write_batch`], which clears the count cell and
/// places the cursor at cell 1. Each successful invocation appends one call
/// record and bumps the count; a failed invocation leaves the batch exactly
/// as it was. Dropping the writer leaves the encoded batch in the region,
/// ready to transfer.
pub struct BatchWriter<'a> {
    endpoint: &'a Endpoint,
    region: &'a mut [u8],
    capacity: usize,
    pos: usize,
    calls: u32,
}

impl Endpoint {
    /// Starts a batch over `region`, clearing any previous contents.
    pub fn write_batch<'a>(&'a self, region: &'a mut [u8]) -> Result<BatchWriter<'a>, Error> {
        let capacity = cells::cell_count(region);
        if capacity < 1 {
            return Err(Error::RegionTooSmall(region.len()));
        }
        cells::put_int(region, 0, 0)?;
        Ok(BatchWriter {
            endpoint: self,
            region,
            capacity,
            pos: 1,
            calls: 0,
        })
    }

    /// Drains a received batch in one pass.
    ///
    /// Dispatches every encoded call, in encoded order, through `target`,
    /// then clears the count cell. Returns the number of calls dispatched.
    pub fn read_batch<D: Dispatch + ?Sized>(
        &self,
        region: &mut [u8],
        target: &mut D,
    ) -> Result<u32, Error> {
        let count = batch_calls(region)?;
        let mut pos = 1;

        for _ in 0..count {
            let id = cells::get_int(region, pos)?;
            pos += 1;
            let spec = self.reader_spec(id)?;

            // Variable-length data precedes the fixed-width arguments.
            let mut strings: SmallVec<[String; 2]> = SmallVec::new();
            for kind in &spec.args {
                if *kind == ArgKind::Str {
                    let (string, next) = cells::get_str(region, pos)?;
                    strings.push(string);
                    pos = next;
                }
            }

            let instance = match spec.registry {
                Some(_) => {
                    let cell = cells::get_int(region, pos)?;
                    let id = u32::try_from(cell)
                        .map_err(|_| Error::Malformed { pos, cell })?;
                    pos += 1;
                    Some(id)
                }
                None => None,
            };

            let mut strings = strings.into_iter();
            let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(spec.args.len());
            for kind in &spec.args {
                match kind {
                    ArgKind::Str => {
                        let string = strings.next().expect("one decoded string per Str argument");
                        values.push(Value::Str(string));
                    }
                    ArgKind::Int => {
                        values.push(Value::Int(cells::get_int(region, pos)?));
                        pos += 1;
                    }
                    ArgKind::Float => {
                        values.push(Value::Float(cells::get_float(region, pos)?));
                        pos += 1;
                    }
                }
            }

            let call = Call::new(&spec.name, id as u32, &values);
            match (&spec.registry, instance) {
                (Some(registry), Some(instance)) => {
                    let object = target.instance(registry, instance).ok_or_else(|| {
                        Error::UnknownInstance { registry: registry.clone(), id: instance }
                    })?;
                    object.call(call);
                }
                _ => target.call(call),
            }
        }

        cells::put_int(region, 0, 0)?;
        Ok(count)
    }
}

impl<'a> BatchWriter<'a> {
    /// Appends a call to a plain procedure.
    pub fn invoke(&mut self, caller: Caller, args: &[Value]) -> Result<(), Error> {
        self.write_call(caller, None, args)
    }

    /// Appends a call to an instanced procedure, addressed to `instance`
    /// within its registry on the receiving side.
    pub fn invoke_instanced(
        &mut self,
        caller: Caller,
        instance: u32,
        args: &[Value],
    ) -> Result<(), Error> {
        self.write_call(caller, Some(instance), args)
    }

    /// Calls encoded so far.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// The write cursor, in cells.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Cells still available in the region.
    pub fn remaining(&self) -> usize {
        self.capacity - self.pos
    }

    fn write_call(
        &mut self,
        caller: Caller,
        instance: Option<u32>,
        args: &[Value],
    ) -> Result<(), Error> {
        let endpoint = self.endpoint;
        let spec = endpoint.writer_spec(caller)?;

        if args.len() != spec.args.len() {
            return Err(Error::Arity {
                name: spec.name.clone(),
                expected: spec.args.len(),
                found: args.len(),
            });
        }
        for (index, (value, kind)) in args.iter().zip(&spec.args).enumerate() {
            if value.kind() != *kind {
                return Err(Error::Kind {
                    name: spec.name.clone(),
                    index,
                    expected: *kind,
                    found: value.kind(),
                });
            }
        }
        match (spec.instanced, instance) {
            (true, None) => return Err(Error::InstanceRequired(spec.name.clone())),
            (false, Some(_)) => return Err(Error::NotInstanced(spec.name.clone())),
            _ => {}
        }

        // Whole-call capacity check up front: a rejected call must leave the
        // batch unmodified.
        let mut needed = 1 + spec.instanced as usize;
        for value in args {
            needed += match value {
                Value::Str(s) => cells::str_cells(s),
                _ => 1,
            };
        }
        if self.pos + needed > self.capacity {
            return Err(Error::BatchFull {
                needed: self.pos + needed,
                capacity: self.capacity,
            });
        }

        let mut pos = self.pos;
        cells::put_int(self.region, pos, spec.id as i32)?;
        pos += 1;
        for value in args {
            if let Value::Str(s) = value {
                pos = cells::put_str(self.region, pos, s)?;
            }
        }
        if let Some(instance) = instance {
            cells::put_int(self.region, pos, instance as i32)?;
            pos += 1;
        }
        for value in args {
            match value {
                Value::Str(_) => {}
                Value::Int(x) => {
                    cells::put_int(self.region, pos, *x)?;
                    pos += 1;
                }
                Value::Float(x) => {
                    cells::put_float(self.region, pos, *x)?;
                    pos += 1;
                }
            }
        }

        self.pos = pos;
        self.calls += 1;
        cells::put_int(self.region, 0, self.calls as i32)
    }
}
