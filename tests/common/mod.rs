// Sample host value type shared by the integration tests.
//
// It stands in for the interpreter's dynamic values: a few hashable
// scalars, a mutable (unhashable) list with its own frozen flag, a dict
// backed by OrderedMap, records, gensym-style symbols used as branded
// constructors, and a value whose comparison always fails.
#![allow(dead_code)]

use record_table::{equal_depth, hash_text, Error, OrderedMap, Record, Result, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub struct ListCell {
    items: RefCell<Vec<HV>>,
    frozen: Cell<bool>,
}

pub struct SymbolCell {
    name: String,
}

#[derive(Clone)]
pub enum HV {
    None,
    Int(i64),
    Str(String),
    List(Rc<ListCell>),
    Dict(Rc<RefCell<OrderedMap<HV, HV>>>),
    Struct(Rc<Record<HV>>),
    Symbol(Rc<SymbolCell>),
    /// Comparing a `Broken` with anything fails.
    Broken,
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn int(i: i64) -> HV {
    HV::Int(i)
}

pub fn s(x: &str) -> HV {
    HV::Str(x.to_string())
}

pub fn list(items: Vec<HV>) -> HV {
    HV::List(Rc::new(ListCell {
        items: RefCell::new(items),
        frozen: Cell::new(false),
    }))
}

pub fn dict() -> HV {
    HV::Dict(Rc::new(RefCell::new(OrderedMap::new())))
}

pub fn symbol(name: &str) -> HV {
    HV::Symbol(Rc::new(SymbolCell {
        name: name.to_string(),
    }))
}

fn pairs(fields: &[(&str, HV)]) -> Vec<(String, HV)> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// `struct(**fields)`
pub fn strukt(fields: &[(&str, HV)]) -> Record<HV> {
    Record::with_default(pairs(fields))
}

/// `ctor(**fields)` for a branded constructor.
pub fn branded(ctor: &HV, fields: &[(&str, HV)]) -> Record<HV> {
    Record::from_keywords(ctor.clone(), pairs(fields))
}

pub fn wrap(r: Record<HV>) -> HV {
    HV::Struct(Rc::new(r))
}

impl HV {
    pub fn push(&self, v: HV) -> Result<()> {
        match self {
            HV::List(l) if l.frozen.get() => {
                Err(Error::Value("cannot append to frozen list".into()))
            }
            HV::List(l) => {
                l.items.borrow_mut().push(v);
                Ok(())
            }
            other => Err(Error::Value(format!("{} has no append", other.type_name()))),
        }
    }

    pub fn set(&self, k: HV, v: HV) -> Result<()> {
        match self {
            HV::Dict(d) => d.borrow_mut().insert(k, v),
            other => Err(Error::Value(format!("{} is not a dict", other.type_name()))),
        }
    }

    pub fn is_frozen(&self) -> bool {
        match self {
            HV::List(l) => l.frozen.get(),
            HV::Dict(d) => d.borrow().is_frozen(),
            HV::Struct(r) => r.is_frozen(),
            _ => true,
        }
    }
}

impl Value for HV {
    fn type_name(&self) -> &'static str {
        match self {
            HV::None => "NoneType",
            HV::Int(_) => "int",
            HV::Str(_) => "string",
            HV::List(_) => "list",
            HV::Dict(_) => "dict",
            HV::Struct(_) => "struct",
            HV::Symbol(_) => "symbol",
            HV::Broken => "broken",
        }
    }

    fn hash(&self) -> Result<u32> {
        match self {
            HV::None => Ok(0),
            HV::Int(i) => Ok((*i as u64 ^ (*i as u64 >> 32)) as u32),
            HV::Str(x) => Ok(hash_text(x)),
            HV::Struct(r) => r.hash(),
            HV::Broken => Ok(99),
            HV::List(_) | HV::Dict(_) | HV::Symbol(_) => {
                Err(Error::Unhashable(self.type_name().to_string()))
            }
        }
    }

    fn equals(&self, other: &Self, depth: usize) -> Result<bool> {
        match (self, other) {
            (HV::Broken, _) | (_, HV::Broken) => {
                Err(Error::Value("broken values cannot be compared".into()))
            }
            (HV::None, HV::None) => Ok(true),
            (HV::Int(a), HV::Int(b)) => Ok(a == b),
            (HV::Str(a), HV::Str(b)) => Ok(a == b),
            (HV::List(a), HV::List(b)) => {
                let (a, b) = (a.items.borrow(), b.items.borrow());
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !equal_depth(x, y, depth)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (HV::Dict(a), HV::Dict(b)) => Ok(Rc::ptr_eq(a, b)),
            (HV::Struct(a), HV::Struct(b)) => a.equals(b, depth),
            (HV::Symbol(a), HV::Symbol(b)) => Ok(Rc::ptr_eq(a, b)),
            _ => Ok(false),
        }
    }

    fn freeze(&self) {
        match self {
            HV::List(l) => {
                if !l.frozen.replace(true) {
                    for it in l.items.borrow().iter() {
                        it.freeze();
                    }
                }
            }
            HV::Dict(d) => d.borrow().freeze(),
            HV::Struct(r) => r.freeze(),
            _ => {}
        }
    }

    fn from_text(text: &str) -> Self {
        HV::Str(text.to_string())
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            HV::Str(x) => Some(x),
            _ => None,
        }
    }
}

impl PartialEq for HV {
    fn eq(&self, other: &Self) -> bool {
        matches!(record_table::equal(self, other), Ok(true))
    }
}

impl fmt::Display for HV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HV::None => f.write_str("None"),
            HV::Int(i) => write!(f, "{i}"),
            HV::Str(x) => write!(f, "{x:?}"),
            HV::List(l) => {
                f.write_str("[")?;
                for (i, it) in l.items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{it}")?;
                }
                f.write_str("]")
            }
            HV::Dict(d) => write!(f, "<dict of {}>", d.borrow().len()),
            HV::Struct(r) => write!(f, "{r}"),
            HV::Symbol(sym) => f.write_str(&sym.name),
            HV::Broken => f.write_str("broken"),
        }
    }
}

impl fmt::Debug for HV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
