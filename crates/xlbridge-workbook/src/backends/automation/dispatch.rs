//! Late-bound calls into the host application's object model.
//!
//! Every object the host hands out is reached through [`Dispatch`]: a named
//! property read, a property write, or a method call, each taking positional
//! arguments. The COM implementation lives in `com`; tests supply their own.

use std::fmt;
use std::rc::Rc;

use crate::error::{BridgeError, Result};

use super::BACKEND;

/// A value crossing the automation boundary.
#[derive(Clone, Default)]
pub enum Variant {
    #[default]
    Empty,
    /// An omitted optional argument.
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A cell error value, carried as the host's error number (e.g. 2007).
    Error(i32),
    Object(Rc<dyn Dispatch>),
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => f.write_str("Empty"),
            Variant::Missing => f.write_str("Missing"),
            Variant::Bool(b) => write!(f, "Bool({b})"),
            Variant::Int(n) => write!(f, "Int({n})"),
            Variant::Float(n) => write!(f, "Float({n})"),
            Variant::Text(s) => write!(f, "Text({s:?})"),
            Variant::Error(code) => write!(f, "Error({code})"),
            Variant::Object(_) => f.write_str("Object"),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Empty, Variant::Empty) | (Variant::Missing, Variant::Missing) => true,
            (Variant::Bool(a), Variant::Bool(b)) => a == b,
            (Variant::Int(a), Variant::Int(b)) => a == b,
            (Variant::Float(a), Variant::Float(b)) => a == b,
            (Variant::Text(a), Variant::Text(b)) => a == b,
            (Variant::Error(a), Variant::Error(b)) => a == b,
            (Variant::Object(a), Variant::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn mismatch(expected: &str, got: &Variant) -> BridgeError {
    BridgeError::from_backend(BACKEND, format!("expected {expected}, got {got:?}"))
}

impl Variant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    pub fn into_object(self) -> Result<Rc<dyn Dispatch>> {
        match self {
            Variant::Object(obj) => Ok(obj),
            other => Err(mismatch("object", &other)),
        }
    }

    /// Text form of a scalar; numbers print without a trailing `.0`.
    pub fn to_text(&self) -> String {
        match self {
            Variant::Empty | Variant::Missing | Variant::Object(_) => String::new(),
            Variant::Bool(true) => "TRUE".to_string(),
            Variant::Bool(false) => "FALSE".to_string(),
            Variant::Int(n) => n.to_string(),
            Variant::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => (*n as i64).to_string(),
            Variant::Float(n) => n.to_string(),
            Variant::Text(s) => s.clone(),
            Variant::Error(code) => error_text(*code).unwrap_or("#VALUE!").to_string(),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Variant::Int(n) => Ok(*n),
            Variant::Float(n) => Ok(*n as i64),
            Variant::Bool(b) => Ok(i64::from(*b)),
            Variant::Text(s) => s.trim().parse().map_err(|_| mismatch("integer", self)),
            other => Err(mismatch("integer", other)),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Variant::Int(n) => Ok(*n as f64),
            Variant::Float(n) => Ok(*n),
            Variant::Text(s) => s.trim().parse().map_err(|_| mismatch("number", self)),
            other => Err(mismatch("number", other)),
        }
    }

    /// Automation booleans arrive as `Bool` or as a nonzero integer.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Variant::Bool(b) => Ok(*b),
            Variant::Int(n) => Ok(*n != 0),
            other => Err(mismatch("boolean", other)),
        }
    }

    /// Properties that answer "mixed" or "none" with null read as `None`.
    pub fn opt_i64(&self) -> Option<i64> {
        match self {
            Variant::Empty | Variant::Missing | Variant::Object(_) | Variant::Error(_) => None,
            other => other.as_i64().ok(),
        }
    }
}

/// Display text of a cell error number.
pub fn error_text(code: i32) -> Option<&'static str> {
    let text = match code {
        2000 => "#NULL!",
        2007 => "#DIV/0!",
        2015 => "#VALUE!",
        2023 => "#REF!",
        2029 => "#NAME?",
        2036 => "#NUM!",
        2042 => "#N/A",
        _ => return None,
    };
    Some(text)
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int(i64::from(v))
    }
}

impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Variant::Int(i64::from(v))
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Float(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::Text(v.to_string())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::Text(v)
    }
}

impl From<Rc<dyn Dispatch>> for Variant {
    fn from(v: Rc<dyn Dispatch>) -> Self {
        Variant::Object(v)
    }
}

/// One object of the host's object model.
pub trait Dispatch {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant>;
    fn put(&self, name: &str, args: &[Variant], value: Variant) -> Result<()>;
    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant>;

    /// The COM interface behind this object, when there is one.
    #[cfg(windows)]
    fn interface(&self) -> Option<windows::Win32::System::Com::IDispatch> {
        None
    }

    /// Property that must hold an object, e.g. `Workbooks` or `Range("A1")`.
    fn object(&self, name: &str, args: &[Variant]) -> Result<Rc<dyn Dispatch>> {
        self.get(name, args)?.into_object()
    }

    /// Method whose result must be an object.
    fn call_object(&self, name: &str, args: &[Variant]) -> Result<Rc<dyn Dispatch>> {
        self.call(name, args)?.into_object()
    }

    fn text(&self, name: &str) -> Result<String> {
        Ok(self.get(name, &[])?.to_text())
    }

    fn int(&self, name: &str) -> Result<i64> {
        self.get(name, &[])?.as_i64()
    }
}

/// Put a property on a trait object without naming the argument list.
pub fn set(obj: &dyn Dispatch, name: &str, value: impl Into<Variant>) -> Result<()> {
    obj.put(name, &[], value.into())
}

/// 1-based `Item(i)` walk over a collection exposing `Count`.
pub fn items(collection: &dyn Dispatch) -> Result<Vec<Rc<dyn Dispatch>>> {
    let count = collection.int("Count")?.max(0);
    (1..=count)
        .map(|i| collection.object("Item", &[Variant::Int(i)]))
        .collect()
}
