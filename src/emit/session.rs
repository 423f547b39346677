//! Rendering of assertions within one emission session.

use super::value::{Assertion, Collection, ObservedValue};
use std::collections::HashMap;

/// Naming state for one emission run.
///
/// Variable names are scoped to the current test case; comparison
/// object names are unique across the whole session. Two sessions never
/// share counters.
///
/// ```
/// use u_mosa::emit::{Assertion, EmissionSession, ObservedValue};
///
/// let mut session = EmissionSession::new();
/// let lines = session.render(&Assertion::Value {
///     source: 4,
///     value: ObservedValue::Int(42),
/// });
/// assert_eq!(lines, vec!["assert var_0 == 42"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmissionSession {
    variables: HashMap<usize, String>,
    objects_created: usize,
}

impl EmissionSession {
    /// A session with no names handed out yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new test case: variable names restart from `var_0`.
    pub fn begin_test_case(&mut self) {
        self.variables.clear();
    }

    /// Name of the variable produced by statement `source`.
    ///
    /// Names are assigned in order of first use.
    pub fn variable_name(&mut self, source: usize) -> String {
        let next = self.variables.len();
        self.variables
            .entry(source)
            .or_insert_with(|| format!("var_{next}"))
            .clone()
    }

    /// A comparison object name never used before in this session.
    pub fn fresh_object_name(&mut self) -> String {
        let name = format!("obj_{}", self.objects_created);
        self.objects_created += 1;
        name
    }

    /// Number of comparison objects created so far.
    pub fn objects_created(&self) -> usize {
        self.objects_created
    }

    /// Renders one assertion into source lines.
    ///
    /// Objects are built into fresh comparison variables before the
    /// assertion line that uses them.
    pub fn render(&mut self, assertion: &Assertion) -> Vec<String> {
        let target = match assertion {
            Assertion::Value { source, .. } => self.variable_name(*source),
            Assertion::Field { source, field, .. } => {
                format!("{}.{field}", self.variable_name(*source))
            }
        };
        let value = match assertion {
            Assertion::Value { value, .. } | Assertion::Field { value, .. } => value,
        };

        let mut lines = Vec::new();
        let check = match value {
            ObservedValue::Bool(b) => format!("{target} is {}", bool_literal(*b)),
            ObservedValue::None => format!("{target} is None"),
            ObservedValue::Float(f) => {
                format!("{target} == approx({}, abs=0.01, rel=0.01)", float_literal(*f))
            }
            other => format!("{target} == {}", self.expression(other, &mut lines)),
        };
        lines.push(format!("assert {check}"));
        lines
    }

    /// Renders `value` as an expression, pushing any setup lines it needs.
    fn expression(&mut self, value: &ObservedValue, setup: &mut Vec<String>) -> String {
        match value {
            ObservedValue::Bool(b) => bool_literal(*b).to_string(),
            ObservedValue::Int(i) => i.to_string(),
            ObservedValue::Float(f) => float_literal(*f),
            ObservedValue::Str(s) => format!("{s:?}"),
            ObservedValue::None => "None".to_string(),
            ObservedValue::Enum { type_name, member } => format!("{type_name}.{member}"),
            ObservedValue::Collection(collection) => self.collection(collection, setup),
            ObservedValue::Object { type_name, fields } => self.object(type_name, fields, setup),
        }
    }

    fn collection(&mut self, collection: &Collection, setup: &mut Vec<String>) -> String {
        match collection {
            Collection::List(values) => format!("[{}]", self.items(values, setup)),
            Collection::Tuple(values) if values.len() == 1 => {
                format!("({},)", self.items(values, setup))
            }
            Collection::Tuple(values) => format!("({})", self.items(values, setup)),
            Collection::Set(values) if values.is_empty() => "set()".to_string(),
            Collection::Set(values) => format!("{{{}}}", self.items(values, setup)),
            Collection::Map(pairs) => {
                let entries: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| {
                        let key = self.expression(k, setup);
                        format!("{key}: {}", self.expression(v, setup))
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }

    fn items(&mut self, values: &[ObservedValue], setup: &mut Vec<String>) -> String {
        let rendered: Vec<String> = values.iter().map(|v| self.expression(v, setup)).collect();
        rendered.join(", ")
    }

    fn object(
        &mut self,
        type_name: &str,
        fields: &[(String, ObservedValue)],
        setup: &mut Vec<String>,
    ) -> String {
        let name = self.fresh_object_name();
        setup.push(format!("{name} = {type_name}.__new__({type_name})"));
        for (field, value) in fields {
            let expr = self.expression(value, setup);
            setup.push(format!("{name}.{field} = {expr}"));
        }
        name
    }
}

fn bool_literal(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

fn float_literal(f: f64) -> String {
    if f.is_finite() {
        format!("{f:?}")
    } else if f.is_nan() {
        "float('nan')".to_string()
    } else if f > 0.0 {
        "float('inf')".to_string()
    } else {
        "float('-inf')".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(source: usize, value: ObservedValue) -> Assertion {
        Assertion::Value { source, value }
    }

    #[test]
    fn test_primitive_assertions() {
        let mut session = EmissionSession::new();
        assert_eq!(
            session.render(&value(0, ObservedValue::Bool(false))),
            vec!["assert var_0 is False"]
        );
        assert_eq!(
            session.render(&value(0, ObservedValue::Str("a\"b".into()))),
            vec![r#"assert var_0 == "a\"b""#]
        );
        assert_eq!(
            session.render(&value(1, ObservedValue::Float(1.5))),
            vec!["assert var_1 == approx(1.5, abs=0.01, rel=0.01)"]
        );
        assert_eq!(
            session.render(&value(2, ObservedValue::None)),
            vec!["assert var_2 is None"]
        );
    }

    #[test]
    fn test_enum_and_field_assertions() {
        let mut session = EmissionSession::new();
        let lines = session.render(&Assertion::Field {
            source: 3,
            field: "color".into(),
            value: ObservedValue::Enum {
                type_name: "Color".into(),
                member: "RED".into(),
            },
        });
        assert_eq!(lines, vec!["assert var_0.color == Color.RED"]);
    }

    #[test]
    fn test_collections() {
        let mut session = EmissionSession::new();
        let nested = ObservedValue::Collection(Collection::List(vec![
            ObservedValue::Int(1),
            ObservedValue::Collection(Collection::Tuple(vec![ObservedValue::Str("x".into())])),
            ObservedValue::Collection(Collection::Map(vec![(
                ObservedValue::Str("k".into()),
                ObservedValue::Bool(true),
            )])),
            ObservedValue::Collection(Collection::Set(vec![])),
        ]));
        assert_eq!(
            session.render(&value(0, nested)),
            vec![r#"assert var_0 == [1, ("x",), {"k": True}, set()]"#]
        );
    }

    #[test]
    fn test_objects_get_session_unique_names() {
        let mut session = EmissionSession::new();
        let point = ObservedValue::Object {
            type_name: "Point".into(),
            fields: vec![
                ("x".into(), ObservedValue::Int(1)),
                ("y".into(), ObservedValue::Int(2)),
            ],
        };

        let first = session.render(&value(0, point.clone()));
        assert_eq!(
            first,
            vec![
                "obj_0 = Point.__new__(Point)",
                "obj_0.x = 1",
                "obj_0.y = 2",
                "assert var_0 == obj_0",
            ]
        );

        session.begin_test_case();
        let second = session.render(&value(5, point));
        assert_eq!(second.last().map(String::as_str), Some("assert var_0 == obj_1"));
        assert_eq!(session.objects_created(), 2);

        // A fresh session starts counting again.
        let mut other = EmissionSession::new();
        assert_eq!(other.fresh_object_name(), "obj_0");
    }

    #[test]
    fn test_variable_names_follow_first_use() {
        let mut session = EmissionSession::new();
        assert_eq!(session.variable_name(7), "var_0");
        assert_eq!(session.variable_name(2), "var_1");
        assert_eq!(session.variable_name(7), "var_0");
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(float_literal(f64::INFINITY), "float('inf')");
        assert_eq!(float_literal(f64::NEG_INFINITY), "float('-inf')");
        assert_eq!(float_literal(f64::NAN), "float('nan')");
        assert_eq!(float_literal(2.0), "2.0");
    }
}
