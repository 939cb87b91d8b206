//! The decoded-call model and the dispatch-target seam.

use crate::table::ArgKind;

/// One argument value, as declared in the procedure table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 32-bit signed integer.
    Int(i32),
    /// A 32-bit float.
    Float(f32),
    /// A string of 32-bit code units.
    Str(String),
}

impl Value {
    /// The kind this value encodes as.
    pub fn kind(&self) -> ArgKind {
        match self {
            Value::Int(_) => ArgKind::Int,
            Value::Float(_) => ArgKind::Float,
            Value::Str(_) => ArgKind::Str,
        }
    }

    /// The integer payload, when this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(x) => Some(*x),
            _ => None,
        }
    }

    /// The float payload, when this is a `Float`.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The string payload, when this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(x) => Some(x),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Int(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::Str(x.to_owned())
    }
}

impl From<String> for Value {
    fn from(x: String) -> Self {
        Value::Str(x)
    }
}

/// One decoded call, lent to a dispatch target.
///
/// Arguments appear in declaration order regardless of their order on the
/// wire.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    name: &'a str,
    id: u32,
    values: &'a [Value],
}

impl<'a> Call<'a> {
    pub(crate) fn new(name: &'a str, id: u32, values: &'a [Value]) -> Self {
        Call { name, id, values }
    }

    /// The procedure name from the table.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The 1-based procedure id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// All argument values, in declaration order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// The integer at argument position `index`, if it is one.
    pub fn int(&self, index: usize) -> Option<i32> {
        self.values.get(index).and_then(Value::as_int)
    }

    /// The float at argument position `index`, if it is one.
    pub fn float(&self, index: usize) -> Option<f32> {
        self.values.get(index).and_then(Value::as_float)
    }

    /// The string at argument position `index`, if it is one.
    pub fn str(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).and_then(Value::as_str)
    }
}

/// A dispatch target for decoded calls.
///
/// Plain procedures arrive through [`call`]. Instanced procedures first
/// resolve their target through [`instance`]; the default implementation
/// holds no registries, so targets that receive instanced procedures
/// override it.
///
/// [`call`]: Dispatch::call
/// [`instance`]: Dispatch::instance
pub trait Dispatch {
    /// Executes one decoded call.
    fn call(&mut self, call: Call<'_>);

    /// Resolves an object from the named instance registry.
    fn instance(&mut self, registry: &str, id: u32) -> Option<&mut dyn Dispatch> {
        let _ = (registry, id);
        None
    }
}

impl<F: for<'a> FnMut(Call<'a>)> Dispatch for F {
    fn call(&mut self, call: Call<'_>) {
        (*self)(call)
    }
}

#[cfg(test)]
mod tests {

    use super::{Call, Dispatch, Value};

    #[test]
    fn accessors_pick_by_position_and_kind() {
        let values = [Value::Str("hi".into()), Value::Int(-7), Value::Float(1.5)];
        let call = Call::new("config", 1, &values);
        assert_eq!(call.str(0), Some("hi"));
        assert_eq!(call.int(1), Some(-7));
        assert_eq!(call.float(2), Some(1.5));
        assert_eq!(call.int(0), None);
        assert_eq!(call.float(3), None);
    }

    #[test]
    fn closures_are_dispatch_targets() {
        let mut names = Vec::new();
        {
            let mut target = |call: Call<'_>| names.push(call.name().to_owned());
            let values: [Value; 0] = [];
            Dispatch::call(&mut target, Call::new("ping", 2, &values));
        }
        assert_eq!(names, ["ping"]);
    }
}
