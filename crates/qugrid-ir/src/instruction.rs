//! Gate cells and the options they carry.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::ClassicalCondition;

/// Identifier shared by all cells of one gate instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GateId(pub String);

impl GateId {
    /// A fresh random identifier.
    pub fn fresh() -> Self {
        GateId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single actual parameter: a number or expression text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Expr(String),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Expr(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Expr(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Expr(s) => write!(f, "{s}"),
        }
    }
}

/// Actual parameters of a gate instance.
///
/// The map form binds formals by name; the list form is the legacy
/// positional layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamBindings {
    Named(IndexMap<String, ParamValue>),
    Positional(Vec<ParamValue>),
}

impl Default for ParamBindings {
    fn default() -> Self {
        ParamBindings::Named(IndexMap::new())
    }
}

impl ParamBindings {
    /// Named bindings from `(name, value)` pairs.
    pub fn named<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        ParamBindings::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Whether no actual is supplied.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamBindings::Named(map) => map.is_empty(),
            ParamBindings::Positional(list) => list.is_empty(),
        }
    }

    /// Actual for the formal `name` at position `index`.
    pub fn lookup(&self, index: usize, name: &str) -> Option<&ParamValue> {
        match self {
            ParamBindings::Named(map) => map.get(name),
            ParamBindings::Positional(list) => list.get(index),
        }
    }

    /// Mutable access to every actual.
    pub fn values_mut(&mut self) -> Box<dyn Iterator<Item = &mut ParamValue> + '_> {
        match self {
            ParamBindings::Named(map) => Box::new(map.values_mut()),
            ParamBindings::Positional(list) => Box::new(list.iter_mut()),
        }
    }
}

/// A classical bit index as it appears in snapshots.
///
/// Older snapshots store indices as strings or floats; [`BitIndex::resolve`]
/// rejects anything that is not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BitIndex {
    Index(u64),
    Float(f64),
    Text(String),
}

impl BitIndex {
    /// Resolve to a bit position within `register`.
    pub fn resolve(&self, register: &str) -> IrResult<usize> {
        let invalid = || IrError::InvalidBitIndex {
            register: register.to_string(),
            found: self.to_string(),
        };
        match self {
            BitIndex::Index(i) => usize::try_from(*i).map_err(|_| invalid()),
            BitIndex::Float(f) => {
                if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX.into() {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    Ok(*f as usize)
                } else {
                    Err(invalid())
                }
            }
            BitIndex::Text(s) => s.trim().parse::<usize>().map_err(|_| invalid()),
        }
    }
}

impl From<usize> for BitIndex {
    fn from(value: usize) -> Self {
        BitIndex::Index(value as u64)
    }
}

impl fmt::Display for BitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitIndex::Index(i) => write!(f, "{i}"),
            BitIndex::Float(v) => write!(f, "{v}"),
            BitIndex::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Classical write destination of a `measure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CregTarget {
    /// Register name.
    pub name: String,
    /// Bit within the register.
    pub bit: BitIndex,
}

impl CregTarget {
    /// Create a destination.
    pub fn new(name: impl Into<String>, bit: impl Into<BitIndex>) -> Self {
        Self {
            name: name.into(),
            bit: bit.into(),
        }
    }
}

/// Per-instance options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateOptions {
    /// Actual parameters.
    #[serde(default, skip_serializing_if = "ParamBindings::is_empty")]
    pub params: ParamBindings,
    /// Classical destination, used by `measure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creg: Option<CregTarget>,
    /// Execute only when the register equals the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl GateOptions {
    /// Options with the given parameter bindings.
    pub fn with_params(params: ParamBindings) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Set the classical destination.
    #[must_use]
    pub fn with_creg(mut self, creg: CregTarget) -> Self {
        self.creg = Some(creg);
        self
    }

    /// Set the execution condition.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether the options carry nothing.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.creg.is_none() && self.condition.is_none()
    }
}

/// One occupied grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCell {
    /// Instance identifier, shared by the instance's cells.
    pub id: GateId,
    /// Gate name.
    pub name: String,
    /// Position of this wire in the instance's wire list.
    pub connector: usize,
    /// Instance options; repeated on every cell.
    #[serde(default, skip_serializing_if = "GateOptions::is_empty")]
    pub options: GateOptions,
}

impl GateCell {
    /// Whether this cell must own its whole column: `measure` or conditional.
    pub fn is_column_exclusive(&self) -> bool {
        self.name == crate::gate::MEASURE || self.options.condition.is_some()
    }
}

/// A logical gate instance reassembled from its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GateInstance {
    /// Instance identifier.
    pub id: GateId,
    /// Gate name.
    pub name: String,
    /// Wires ordered by connector.
    pub wires: Vec<usize>,
    /// Instance options.
    pub options: GateOptions,
}
