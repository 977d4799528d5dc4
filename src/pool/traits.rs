use crate::errors::HookResult;
use std::any::Any;

/// A constructor or recycle argument. Closed set of value kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl ArgValue {
    /// Name used in argument signatures.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) => "int",
            ArgValue::Float(_) => "float",
            ArgValue::Str(_) => "string",
            ArgValue::Bytes(_) => "bytes",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(i64::from(v))
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(v: Vec<u8>) -> Self {
        ArgValue::Bytes(v)
    }
}

/// Constructor arguments with their parameter signature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CtorArgs {
    values: Vec<ArgValue>,
    signature: Vec<String>,
}

impl CtorArgs {
    /// Arguments whose signature is derived from the values.
    pub fn new(values: Vec<ArgValue>) -> Self {
        let signature = values.iter().map(|v| v.type_name().to_string()).collect();
        Self { values, signature }
    }

    /// Arguments with an explicit signature. An empty signature selects the zero-argument recycle.
    pub fn with_signature<S: Into<String>>(values: Vec<ArgValue>, signature: Vec<S>) -> Self {
        Self { values, signature: signature.into_iter().map(Into::into).collect() }
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    pub fn signature(&self) -> &[String] {
        &self.signature
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.signature.is_empty()
    }

    /// Checks that a non-empty signature names exactly the kinds of the values.
    pub(crate) fn check_signature(&self) -> Result<(), String> {
        if self.signature.is_empty() {
            return Ok(());
        }
        if self.signature.len() != self.values.len() {
            return Err(format!(
                "signature has {} parameters but {} arguments were given",
                self.signature.len(),
                self.values.len()
            ));
        }
        for (i, (name, value)) in self.signature.iter().zip(&self.values).enumerate() {
            if name != value.type_name() {
                return Err(format!(
                    "parameter {i} declared as '{name}' but argument is '{}'",
                    value.type_name()
                ));
            }
        }
        Ok(())
    }
}

impl<T: Into<ArgValue>> FromIterator<T> for CtorArgs {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Arguments handed to `Recyclable::recycle`.
#[derive(Clone, Copy, Debug)]
pub enum RecycleArgs<'a> {
    /// No arguments, or an empty signature.
    Empty,
    Values(&'a CtorArgs),
}

/// Instances that re-initialize themselves for reuse and release resources before pooling.
pub trait Recyclable {
    fn recycle(&mut self, args: RecycleArgs<'_>) -> HookResult;

    fn dispose(&mut self) -> HookResult {
        Ok(())
    }
}

/// Recyclables whose recycle takes the raw constructor argument list.
pub trait ArrayCtorRecyclable: Recyclable {
    fn recycle_array(&mut self, args: &[ArgValue]) -> HookResult;
}

/// Recycling capability an instance exposes to the pool.
pub enum Hooks<'a> {
    None,
    Recyclable(&'a mut dyn Recyclable),
    ArrayCtor(&'a mut dyn ArrayCtorRecyclable),
}

/// Type-erasure helpers, implemented for every `Any + Send` type.
pub trait AsAny: Any + Send {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T: Any + Send> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// An object the pool can hold.
///
/// `class_name` is the pool key and must match the name the factory builds it under.
pub trait Poolable: AsAny {
    fn class_name(&self) -> &str;

    fn hooks(&mut self) -> Hooks<'_> {
        Hooks::None
    }
}

/// Downcasts a pooled instance, handing it back untouched on a type mismatch.
pub fn downcast<T: Poolable>(instance: Box<dyn Poolable>) -> Result<Box<T>, Box<dyn Poolable>> {
    if AsAny::as_any(&*instance).is::<T>() {
        instance.into_any().downcast::<T>().map_err(|_| unreachable!("type checked above"))
    } else {
        Err(instance)
    }
}
