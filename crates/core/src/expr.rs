//! The expression tree embedded in entity definitions.
//!
//! An [`Expr`] is either literal data (passed through untouched) or one of
//! the intrinsic forms that refer to other entities by name. Expressions are
//! plain values: they are built once, nest freely, and are only consumed by
//! serialization and the registry's reference check.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::pseudo::PseudoParameter;

/// Ordered key/value pairs supplied to `Fn::Sub`.
pub type SubstitutionMap = IndexMap<String, Expr>;

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal JSON, emitted verbatim.
    Literal(Value),
    List(Vec<Expr>),
    Object(IndexMap<String, Expr>),
    Ref(String),
    GetAtt {
        resource: String,
        attribute: String,
    },
    Condition(String),
    FindInMap {
        map: String,
        top_key: Box<Expr>,
        second_key: Box<Expr>,
    },
    Sub {
        template: String,
        substitutions: Option<SubstitutionMap>,
    },
    If {
        condition: String,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Equals(Box<Expr>, Box<Expr>),
}

/// How an expression points at a named entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceUse {
    Ref,
    GetAtt,
    Condition,
    FindInMap,
    DependsOn,
}

impl ReferenceUse {
    /// Builder name used in error messages.
    pub fn builder(self) -> &'static str {
        match self {
            ReferenceUse::Ref => "Ref",
            ReferenceUse::GetAtt => "Fn::GetAtt",
            ReferenceUse::Condition => "Condition",
            ReferenceUse::FindInMap => "Fn::FindInMap",
            ReferenceUse::DependsOn => "DependsOn",
        }
    }
}

impl Expr {
    /// Build an object expression from ordered pairs.
    pub fn object<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Expr
    where
        K: Into<String>,
        V: Into<Expr>,
    {
        Expr::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn list<V: Into<Expr>>(items: impl IntoIterator<Item = V>) -> Expr {
        Expr::List(items.into_iter().map(Into::into).collect())
    }

    /// Render the wire form of this expression.
    pub fn to_json(&self) -> Value {
        match self {
            Expr::Literal(v) => v.clone(),
            Expr::List(items) => Value::Array(items.iter().map(Expr::to_json).collect()),
            Expr::Object(fields) => {
                let mut m = Map::new();
                for (k, v) in fields {
                    m.insert(k.clone(), v.to_json());
                }
                Value::Object(m)
            }
            Expr::Ref(name) => single("Ref", json!(name)),
            Expr::GetAtt {
                resource,
                attribute,
            } => single("Fn::GetAtt", json!([resource, attribute])),
            Expr::Condition(name) => single("Condition", json!(name)),
            Expr::FindInMap {
                map,
                top_key,
                second_key,
            } => single(
                "Fn::FindInMap",
                Value::Array(vec![json!(map), top_key.to_json(), second_key.to_json()]),
            ),
            Expr::Sub {
                template,
                substitutions,
            } => match substitutions {
                None => single("Fn::Sub", json!(template)),
                Some(subs) => {
                    let mut m = Map::new();
                    for (k, v) in subs {
                        m.insert(k.clone(), v.to_json());
                    }
                    single("Fn::Sub", Value::Array(vec![json!(template), Value::Object(m)]))
                }
            },
            Expr::If {
                condition,
                then,
                otherwise,
            } => single(
                "Fn::If",
                Value::Array(vec![json!(condition), then.to_json(), otherwise.to_json()]),
            ),
            Expr::Equals(lhs, rhs) => {
                single("Fn::Equals", Value::Array(vec![lhs.to_json(), rhs.to_json()]))
            }
        }
    }

    /// Every entity name this expression points at, in tree order.
    ///
    /// Placeholders inside `Fn::Sub` templates are not included; the
    /// registry checks them separately against the substitution map.
    pub fn references(&self) -> Vec<(ReferenceUse, &str)> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<(ReferenceUse, &'a str)>) {
        match self {
            Expr::Literal(_) => {}
            Expr::List(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            Expr::Object(fields) => {
                for v in fields.values() {
                    v.collect_references(out);
                }
            }
            Expr::Ref(name) => out.push((ReferenceUse::Ref, name.as_str())),
            Expr::GetAtt { resource, .. } => out.push((ReferenceUse::GetAtt, resource.as_str())),
            Expr::Condition(name) => out.push((ReferenceUse::Condition, name.as_str())),
            Expr::FindInMap {
                map,
                top_key,
                second_key,
            } => {
                out.push((ReferenceUse::FindInMap, map.as_str()));
                top_key.collect_references(out);
                second_key.collect_references(out);
            }
            Expr::Sub { substitutions, .. } => {
                for v in substitutions.iter().flat_map(|s| s.values()) {
                    v.collect_references(out);
                }
            }
            Expr::If {
                condition,
                then,
                otherwise,
            } => {
                out.push((ReferenceUse::Condition, condition.as_str()));
                then.collect_references(out);
                otherwise.collect_references(out);
            }
            Expr::Equals(lhs, rhs) => {
                lhs.collect_references(out);
                rhs.collect_references(out);
            }
        }
    }

    /// Visit this node and every nested expression, parents first. Stops at
    /// the first error returned by `f`.
    pub fn try_walk<'a, E>(
        &'a self,
        f: &mut impl FnMut(&'a Expr) -> Result<(), E>,
    ) -> Result<(), E> {
        f(self)?;
        match self {
            Expr::Literal(_)
            | Expr::Ref(_)
            | Expr::GetAtt { .. }
            | Expr::Condition(_) => Ok(()),
            Expr::List(items) => items.iter().try_for_each(|item| item.try_walk(f)),
            Expr::Object(fields) => fields.values().try_for_each(|v| v.try_walk(f)),
            Expr::FindInMap {
                top_key,
                second_key,
                ..
            } => {
                top_key.try_walk(f)?;
                second_key.try_walk(f)
            }
            Expr::Sub { substitutions, .. } => substitutions
                .iter()
                .flat_map(|s| s.values())
                .try_for_each(|v| v.try_walk(f)),
            Expr::If {
                then, otherwise, ..
            } => {
                then.try_walk(f)?;
                otherwise.try_walk(f)
            }
            Expr::Equals(lhs, rhs) => {
                lhs.try_walk(f)?;
                rhs.try_walk(f)
            }
        }
    }

    /// The reserved key of a literal or object node that would render as an
    /// intrinsic function (`{"Ref": ..}`, `{"Fn::GetAtt": ..}`, ...) without
    /// going through the typed variants. Literal JSON is searched in depth.
    pub(crate) fn untyped_intrinsic(&self) -> Option<&str> {
        match self {
            Expr::Literal(v) => literal_intrinsic(v),
            Expr::Object(fields) if fields.len() == 1 => fields
                .keys()
                .next()
                .map(String::as_str)
                .filter(|k| is_intrinsic_key(k)),
            _ => None,
        }
    }
}

fn is_intrinsic_key(key: &str) -> bool {
    key == "Ref" || key == "Condition" || key.starts_with("Fn::")
}

fn literal_intrinsic(value: &Value) -> Option<&str> {
    match value {
        Value::Object(m) => {
            if m.len() == 1 {
                if let Some(key) = m.keys().next().filter(|k| is_intrinsic_key(k)) {
                    return Some(key.as_str());
                }
            }
            m.values().find_map(literal_intrinsic)
        }
        Value::Array(items) => items.iter().find_map(literal_intrinsic),
        _ => None,
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut m = Map::new();
    m.insert(key.to_owned(), value);
    Value::Object(m)
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// ──────────────────────────────────────────────
// Condition references
// ──────────────────────────────────────────────

/// A reference to a registered condition.
///
/// Only obtainable from a condition handle. Accepted wherever a condition
/// name is required: a resource or output `Condition` field, or the first
/// operand of `Fn::If`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionRef {
    name: String,
}

impl ConditionRef {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        ConditionRef { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<ConditionRef> for Expr {
    fn from(c: ConditionRef) -> Self {
        Expr::Condition(c.name)
    }
}

impl From<&ConditionRef> for Expr {
    fn from(c: &ConditionRef) -> Self {
        Expr::Condition(c.name.clone())
    }
}

// ──────────────────────────────────────────────
// Conversions
// ──────────────────────────────────────────────

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Literal(v)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Literal(Value::String(s.to_owned()))
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Literal(Value::String(s))
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Literal(Value::Bool(b))
    }
}

macro_rules! expr_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(n: $t) -> Self {
                    Expr::Literal(Value::from(n))
                }
            }
        )*
    };
}

expr_from_number!(i32, i64, u16, u32, u64, f64);

impl From<Vec<Expr>> for Expr {
    fn from(items: Vec<Expr>) -> Self {
        Expr::List(items)
    }
}

impl From<IndexMap<String, Expr>> for Expr {
    fn from(fields: IndexMap<String, Expr>) -> Self {
        Expr::Object(fields)
    }
}

impl From<PseudoParameter> for Expr {
    fn from(p: PseudoParameter) -> Self {
        p.reference()
    }
}
