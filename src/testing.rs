//! Minimal host value used by the in-crate tests.

use crate::error::{Error, Result};
use crate::table::OrderedMap;
use crate::value::{equal_depth, hash_text, Value};
use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

pub(crate) struct DictCell {
    table: RefCell<OrderedMap<TV, TV>>,
}

#[derive(Clone)]
pub(crate) enum TV {
    Int(i64),
    Text(String),
    /// Every `Collide` hashes identically; only equality tells them apart.
    Collide(i64),
    Tuple(Rc<Vec<TV>>),
    Unhashable,
    Dict(Rc<DictCell>),
}

pub(crate) fn dict() -> TV {
    TV::Dict(Rc::new(DictCell {
        table: RefCell::new(OrderedMap::new()),
    }))
}

pub(crate) fn tuple(items: Vec<TV>) -> TV {
    TV::Tuple(Rc::new(items))
}

impl TV {
    pub(crate) fn insert(&self, k: TV, v: TV) -> Result<()> {
        match self {
            TV::Dict(d) => d.table.borrow_mut().insert(k, v),
            other => panic!("not a dict: {other}"),
        }
    }

    pub(crate) fn is_frozen(&self) -> bool {
        match self {
            TV::Dict(d) => d.table.borrow().is_frozen(),
            _ => true,
        }
    }

    pub(crate) fn freeze_value(&self) {
        Value::freeze(self);
    }
}

impl Value for TV {
    fn type_name(&self) -> &'static str {
        match self {
            TV::Int(_) => "int",
            TV::Text(_) => "string",
            TV::Collide(_) => "collide",
            TV::Tuple(_) => "tuple",
            TV::Unhashable => "unhashable",
            TV::Dict(_) => "dict",
        }
    }

    fn hash(&self) -> Result<u32> {
        match self {
            TV::Int(i) => Ok((*i as u64 ^ (*i as u64 >> 32)) as u32),
            TV::Text(s) => Ok(hash_text(s)),
            TV::Collide(_) => Ok(7),
            TV::Tuple(items) => {
                let mut x: u32 = 0x345678;
                for it in items.iter() {
                    x = x.wrapping_mul(1000003) ^ Value::hash(it)?;
                }
                Ok(x)
            }
            TV::Unhashable | TV::Dict(_) => Err(Error::Unhashable(self.type_name().into())),
        }
    }

    fn equals(&self, other: &Self, depth: usize) -> Result<bool> {
        Ok(match (self, other) {
            (TV::Int(a), TV::Int(b)) => a == b,
            (TV::Collide(a), TV::Collide(b)) => a == b,
            (TV::Text(a), TV::Text(b)) => a == b,
            (TV::Tuple(a), TV::Tuple(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !equal_depth(x, y, depth)? {
                        return Ok(false);
                    }
                }
                true
            }
            (TV::Unhashable, TV::Unhashable) => true,
            (TV::Dict(a), TV::Dict(b)) => Rc::ptr_eq(a, b),
            _ => false,
        })
    }

    fn freeze(&self) {
        match self {
            TV::Dict(d) => d.table.borrow().freeze(),
            TV::Tuple(items) => items.iter().for_each(Value::freeze),
            _ => {}
        }
    }

    fn from_text(text: &str) -> Self {
        TV::Text(text.to_string())
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            TV::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for TV {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.equals(other, 64), Ok(true))
    }
}

impl fmt::Display for TV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TV::Int(i) => write!(f, "{i}"),
            TV::Text(s) => write!(f, "{s:?}"),
            TV::Collide(i) => write!(f, "collide({i})"),
            TV::Tuple(items) => {
                f.write_str("(")?;
                for (i, it) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{it}")?;
                }
                f.write_str(")")
            }
            TV::Unhashable => f.write_str("<unhashable>"),
            TV::Dict(_) => f.write_str("{...}"),
        }
    }
}

impl fmt::Debug for TV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
