// Host value shared by the benches.
#![allow(dead_code)]

use record_table::{hash_text, Result, Value};
use std::fmt;

/// Minimal host value: integers and text.
#[derive(Clone)]
pub enum BV {
    Int(i64),
    Text(String),
}

impl fmt::Display for BV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BV::Int(i) => write!(f, "{i}"),
            BV::Text(t) => write!(f, "{t:?}"),
        }
    }
}

impl Value for BV {
    fn type_name(&self) -> &'static str {
        match self {
            BV::Int(_) => "int",
            BV::Text(_) => "string",
        }
    }
    fn hash(&self) -> Result<u32> {
        Ok(match self {
            BV::Int(i) => (*i as u64 ^ (*i as u64 >> 32)) as u32,
            BV::Text(t) => hash_text(t),
        })
    }
    fn equals(&self, other: &Self, _depth: usize) -> Result<bool> {
        Ok(match (self, other) {
            (BV::Int(a), BV::Int(b)) => a == b,
            (BV::Text(a), BV::Text(b)) => a == b,
            _ => false,
        })
    }
    fn freeze(&self) {}
    fn from_text(text: &str) -> Self {
        BV::Text(text.to_string())
    }
    fn as_text(&self) -> Option<&str> {
        match self {
            BV::Text(t) => Some(t),
            _ => None,
        }
    }
}
