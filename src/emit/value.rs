//! Observed values and the assertions built from them.

/// A value observed on a variable after executing a test case.
///
/// Every kind of value the emitter can assert on is a variant here, so
/// rendering is a single exhaustive `match`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObservedValue {
    /// `true` / `false`.
    Bool(bool),
    /// Integral number.
    Int(i64),
    /// Floating-point number, compared approximately.
    Float(f64),
    /// Text.
    Str(String),
    /// The absence of a value.
    None,
    /// A named member of an enumeration type.
    Enum { type_name: String, member: String },
    /// A list, tuple, set or mapping of nested values.
    Collection(Collection),
    /// An instance of a user type with named fields.
    Object {
        type_name: String,
        fields: Vec<(String, ObservedValue)>,
    },
}

/// Collection shapes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Collection {
    /// Ordered, rendered as `[a, b]`.
    List(Vec<ObservedValue>),
    /// Fixed-size, rendered as `(a, b)`.
    Tuple(Vec<ObservedValue>),
    /// Unordered, rendered as `{a, b}`.
    Set(Vec<ObservedValue>),
    /// Key/value pairs, rendered as `{k: v}`.
    Map(Vec<(ObservedValue, ObservedValue)>),
}

/// One check on a statement's result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Assertion {
    /// The variable produced by statement `source` equals `value`.
    Value { source: usize, value: ObservedValue },
    /// Field `field` of the variable produced by `source` equals `value`.
    Field {
        source: usize,
        field: String,
        value: ObservedValue,
    },
}

impl Assertion {
    /// The statement whose variable is asserted on.
    pub fn source(&self) -> usize {
        match self {
            Assertion::Value { source, .. } | Assertion::Field { source, .. } => *source,
        }
    }
}
