//! Record: immutable, branded collection of named fields ("struct").
//!
//! Fields live in a private [`StringKeyedMap`] whose insertion order is
//! ascending name order. Construction always inserts sorted names, and
//! merge emits a sorted union, so every record walks its fields sorted.
//! Merge and equality rely on that to work in a single linear pass.

use crate::error::{CompareOp, Error, Result};
use crate::table::StringKeyedMap;
use crate::value::{equal, equal_depth, hash_text, Value};
use core::cmp::Ordering;
use core::fmt;

/// Text of the default constructor.
pub const DEFAULT_CONSTRUCTOR: &str = "struct";

pub struct Record<V> {
    constructor: V,
    fields: StringKeyedMap<V>,
}

impl<V: Value> Record<V> {
    /// Builds a record from named fields, in any order. When a name is
    /// repeated, the last value supplied wins.
    pub fn new<I>(constructor: V, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut pairs: Vec<(String, V)> = fields.into_iter().collect();
        // Stable, so among repeated names the last supplied stays last.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let mut sorted: Vec<(String, V)> = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            match sorted.last_mut() {
                Some(last) if last.0 == k => last.1 = v,
                _ => sorted.push((k, v)),
            }
        }
        let mut table = StringKeyedMap::with_capacity(sorted.len());
        for (k, v) in sorted {
            table.append_unique(k, v);
        }
        Self {
            constructor,
            fields: table,
        }
    }

    /// A record branded with the default constructor.
    pub fn with_default<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
    {
        Self::new(V::from_text(DEFAULT_CONSTRUCTOR), fields)
    }

    /// Builds a record from keyword arguments of a constructor call.
    pub fn from_keywords(constructor: V, kwargs: Vec<(String, V)>) -> Self {
        Self::new(constructor, kwargs)
    }

    /// Builds a record holding a copy of every entry of `map`.
    pub fn from_map(constructor: V, map: &StringKeyedMap<V>) -> Self {
        Self::new(constructor, map.items())
    }

    pub fn constructor(&self) -> &V {
        &self.constructor
    }

    /// Whether the constructor is the default `"struct"` text value.
    pub fn has_default_constructor(&self) -> bool {
        self.constructor.as_text() == Some(DEFAULT_CONSTRUCTOR)
    }

    pub fn type_name(&self) -> &'static str {
        "struct"
    }

    /// Records are truthy even when empty.
    pub fn truth(&self) -> bool {
        true
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn attr(&self, name: &str) -> Result<&V> {
        if let Some(v) = self.fields.lookup(name)? {
            return Ok(v);
        }
        let constructor = if self.has_default_constructor() {
            None
        } else {
            Some(self.constructor.to_string())
        };
        Err(Error::NoSuchAttr {
            constructor,
            name: name.to_string(),
        })
    }

    /// Field names in sorted order.
    pub fn attr_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// `(name, value)` pairs in sorted order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = (&str, &V)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Inserts every field into `dest`, overwriting existing names.
    pub fn copy_into(&self, dest: &mut StringKeyedMap<V>) -> Result<()> {
        for (k, v) in self.fields.iter() {
            dest.insert(k.clone(), v.clone())?;
        }
        Ok(())
    }

    /// The `+` operator: sorted union of both field sets where `other`
    /// wins on shared names. Both operands must share a constructor.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        match equal(&self.constructor, &other.constructor) {
            Err(e) => {
                return Err(Error::ConstructorComparison {
                    left: self.constructor.to_string(),
                    right: other.constructor.to_string(),
                    source: Box::new(e),
                })
            }
            Ok(false) => {
                return Err(Error::ConstructorMismatch {
                    left: self.constructor.to_string(),
                    right: other.constructor.to_string(),
                })
            }
            Ok(true) => {}
        }

        let mut out = StringKeyedMap::with_capacity(self.len() + other.len());
        let mut xs = self.fields.iter().peekable();
        let mut ys = other.fields.iter().peekable();
        loop {
            let step = match (xs.peek(), ys.peek()) {
                (Some((kx, _)), Some((ky, _))) => kx.cmp(ky),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };
            let next = match step {
                Ordering::Less => xs.next(),
                Ordering::Equal => {
                    xs.next();
                    ys.next()
                }
                Ordering::Greater => ys.next(),
            };
            if let Some((k, v)) = next {
                out.append_unique(k.clone(), v.clone());
            }
        }
        log::trace!(
            "merged records of {} and {} fields into {}",
            self.len(),
            other.len(),
            out.len()
        );
        Ok(Self {
            constructor: self.constructor.clone(),
            fields: out,
        })
    }

    /// Structural equality with a recursion budget for field values.
    ///
    /// Differing field counts or constructors give `false` without looking
    /// at values. Field values are compared with `equal_depth(.., depth)`,
    /// so a zero budget fails with [`Error::RecursionLimit`] as soon as a
    /// value must be inspected.
    ///
    /// The record level itself spends no budget: `depth` is what the caller
    /// of [`Value::equals`] passes after its own decrement. A record of
    /// scalar fields therefore compares with a budget of one, and each
    /// nested container costs one more.
    pub fn equals(&self, other: &Self, depth: usize) -> Result<bool> {
        if self.len() != other.len() {
            return Ok(false);
        }
        match equal(&self.constructor, &other.constructor) {
            Err(e) => {
                return Err(Error::ConstructorComparison {
                    left: self.constructor.to_string(),
                    right: other.constructor.to_string(),
                    source: Box::new(e),
                })
            }
            Ok(false) => return Ok(false),
            Ok(true) => {}
        }
        for ((kx, vx), (ky, vy)) in self.fields.iter().zip(other.fields.iter()) {
            if kx != ky {
                return Ok(false);
            }
            if !equal_depth(vx, vy, depth)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluates `self op other`. Only `==` and `!=` are defined.
    pub fn compare(&self, op: CompareOp, other: &Self, depth: usize) -> Result<bool> {
        match op {
            CompareOp::Eq => self.equals(other, depth),
            CompareOp::Ne => self.equals(other, depth).map(|eq| !eq),
            _ => Err(Error::UnsupportedComparison {
                op,
                type_name: self.type_name(),
            }),
        }
    }

    /// Order-dependent mix of every field's name and value hashes.
    pub fn hash(&self) -> Result<u32> {
        let (mut x, mut m): (u32, u32) = (8731, 9839);
        for (k, v) in self.fields.iter() {
            x ^= hash_text(k).wrapping_mul(3);
            let y = Value::hash(v)?;
            x ^= y.wrapping_mul(m);
            m = m.wrapping_add(7349);
        }
        Ok(x)
    }

    /// Freezes every field value and the constructor. Idempotent.
    pub fn freeze(&self) {
        if self.fields.is_frozen() {
            return;
        }
        self.fields.freeze();
        self.constructor.freeze();
    }

    pub fn is_frozen(&self) -> bool {
        self.fields.is_frozen()
    }
}

impl<V: Value> fmt::Display for Record<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_default_constructor() {
            f.write_str(DEFAULT_CONSTRUCTOR)?;
        } else {
            write!(f, "{}", self.constructor)?;
        }
        f.write_str("(")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k} = {v}")?;
        }
        f.write_str(")")
    }
}

impl<V: Value> fmt::Debug for Record<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
