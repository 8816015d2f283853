//! Entity definitions: the caller-supplied body of each registered entity.
//!
//! The registry does not interpret property values. Each definition only
//! knows how to render itself with the document's key names and which
//! expressions it carries, so the registry can check their references.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::expr::{ConditionRef, Expr};
use crate::handle::ResourceHandle;

/// The five kinds of named entity. All share one logical-id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Parameter,
    Mapping,
    Condition,
    Resource,
    Output,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Parameter => "Parameter",
            EntityKind::Mapping => "Mapping",
            EntityKind::Condition => "Condition",
            EntityKind::Resource => "Resource",
            EntityKind::Output => "Output",
        };
        f.write_str(s)
    }
}

// ──────────────────────────────────────────────
// Parameters
// ──────────────────────────────────────────────

/// A template parameter. `AllowedValues` and `Default` are literal JSON
/// and are emitted exactly as given.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDef {
    pub type_: String,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub allowed_values: Vec<Value>,
    pub allowed_pattern: Option<String>,
    pub constraint_description: Option<String>,
    pub min_value: Option<Value>,
    pub max_value: Option<Value>,
    pub no_echo: bool,
}

impl ParameterDef {
    pub fn new(type_: impl Into<String>) -> Self {
        ParameterDef {
            type_: type_.into(),
            description: None,
            default: None,
            allowed_values: Vec::new(),
            allowed_pattern: None,
            constraint_description: None,
            min_value: None,
            max_value: None,
            no_echo: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn allowed_values<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn allowed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self
    }

    pub fn constraint_description(mut self, description: impl Into<String>) -> Self {
        self.constraint_description = Some(description.into());
        self
    }

    pub fn min_value(mut self, min: impl Into<Value>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    pub fn max_value(mut self, max: impl Into<Value>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    pub fn no_echo(mut self) -> Self {
        self.no_echo = true;
        self
    }

    pub fn to_json(&self) -> Value {
        let mut m = Map::new();
        m.insert("Type".to_owned(), json!(self.type_));
        if let Some(d) = &self.description {
            m.insert("Description".to_owned(), json!(d));
        }
        if let Some(d) = &self.default {
            m.insert("Default".to_owned(), d.clone());
        }
        if !self.allowed_values.is_empty() {
            m.insert(
                "AllowedValues".to_owned(),
                Value::Array(self.allowed_values.clone()),
            );
        }
        if let Some(p) = &self.allowed_pattern {
            m.insert("AllowedPattern".to_owned(), json!(p));
        }
        if let Some(c) = &self.constraint_description {
            m.insert("ConstraintDescription".to_owned(), json!(c));
        }
        if let Some(v) = &self.min_value {
            m.insert("MinValue".to_owned(), v.clone());
        }
        if let Some(v) = &self.max_value {
            m.insert("MaxValue".to_owned(), v.clone());
        }
        if self.no_echo {
            m.insert("NoEcho".to_owned(), json!(true));
        }
        Value::Object(m)
    }
}

// ──────────────────────────────────────────────
// Mappings
// ──────────────────────────────────────────────

/// Two-level lookup table: top-level key -> second-level key -> value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingDef {
    entries: IndexMap<String, IndexMap<String, Value>>,
}

impl MappingDef {
    pub fn new() -> Self {
        MappingDef::default()
    }

    /// Add (or extend) a top-level entry.
    pub fn entry<K, V>(
        mut self,
        top_key: impl Into<String>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let slot = self.entries.entry(top_key.into()).or_default();
        for (k, v) in values {
            slot.insert(k.into(), v.into());
        }
        self
    }

    pub fn get(&self, top_key: &str, second_key: &str) -> Option<&Value> {
        self.entries.get(top_key)?.get(second_key)
    }

    pub fn to_json(&self) -> Value {
        let mut m = Map::new();
        for (top, inner) in &self.entries {
            let mut im = Map::new();
            for (k, v) in inner {
                im.insert(k.clone(), v.clone());
            }
            m.insert(top.clone(), Value::Object(im));
        }
        Value::Object(m)
    }
}

// ──────────────────────────────────────────────
// Resources
// ──────────────────────────────────────────────

/// A resource: an opaque type name plus an ordered property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDef {
    pub type_: String,
    pub condition: Option<ConditionRef>,
    pub depends_on: Vec<String>,
    pub properties: IndexMap<String, Expr>,
}

impl ResourceDef {
    pub fn new(type_: impl Into<String>) -> Self {
        ResourceDef {
            type_: type_.into(),
            condition: None,
            depends_on: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    pub fn condition(mut self, condition: ConditionRef) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn depends_on(mut self, resource: &ResourceHandle) -> Self {
        self.depends_on.push(resource.logical_id().to_owned());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut m = Map::new();
        m.insert("Type".to_owned(), json!(self.type_));
        if let Some(c) = &self.condition {
            m.insert("Condition".to_owned(), json!(c.name()));
        }
        if !self.depends_on.is_empty() {
            m.insert("DependsOn".to_owned(), json!(self.depends_on));
        }
        if !self.properties.is_empty() {
            let mut pm = Map::new();
            for (k, v) in &self.properties {
                pm.insert(k.clone(), v.to_json());
            }
            m.insert("Properties".to_owned(), Value::Object(pm));
        }
        Value::Object(m)
    }
}

// ──────────────────────────────────────────────
// Outputs
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct OutputDef {
    pub value: Expr,
    pub description: Option<String>,
    pub condition: Option<ConditionRef>,
    pub export_name: Option<Expr>,
}

impl OutputDef {
    pub fn new(value: impl Into<Expr>) -> Self {
        OutputDef {
            value: value.into(),
            description: None,
            condition: None,
            export_name: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn condition(mut self, condition: ConditionRef) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn export_name(mut self, name: impl Into<Expr>) -> Self {
        self.export_name = Some(name.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut m = Map::new();
        if let Some(d) = &self.description {
            m.insert("Description".to_owned(), json!(d));
        }
        m.insert("Value".to_owned(), self.value.to_json());
        if let Some(c) = &self.condition {
            m.insert("Condition".to_owned(), json!(c.name()));
        }
        if let Some(name) = &self.export_name {
            m.insert("Export".to_owned(), json!({ "Name": name.to_json() }));
        }
        Value::Object(m)
    }
}

// ──────────────────────────────────────────────
// Generic definitions
// ──────────────────────────────────────────────

/// Any entity definition, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Parameter(ParameterDef),
    Mapping(MappingDef),
    /// A condition body, typically built with `fn_equals`.
    Condition(Expr),
    Resource(ResourceDef),
    Output(OutputDef),
}

impl Definition {
    pub fn kind(&self) -> EntityKind {
        match self {
            Definition::Parameter(_) => EntityKind::Parameter,
            Definition::Mapping(_) => EntityKind::Mapping,
            Definition::Condition(_) => EntityKind::Condition,
            Definition::Resource(_) => EntityKind::Resource,
            Definition::Output(_) => EntityKind::Output,
        }
    }

    /// Every top-level expression this definition carries.
    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            Definition::Parameter(_) | Definition::Mapping(_) => Vec::new(),
            Definition::Condition(body) => vec![body],
            Definition::Resource(r) => r.properties.values().collect(),
            Definition::Output(o) => std::iter::once(&o.value)
                .chain(o.export_name.as_ref())
                .collect(),
        }
    }

    /// Names this definition points at, paired with how they are used.
    pub fn references(&self) -> Vec<(crate::expr::ReferenceUse, &str)> {
        use crate::expr::ReferenceUse;
        match self {
            Definition::Parameter(_) | Definition::Mapping(_) => Vec::new(),
            Definition::Condition(body) => body.references(),
            Definition::Resource(r) => {
                let mut out = Vec::new();
                if let Some(c) = &r.condition {
                    out.push((ReferenceUse::Condition, c.name()));
                }
                for dep in &r.depends_on {
                    out.push((ReferenceUse::DependsOn, dep.as_str()));
                }
                for v in r.properties.values() {
                    out.extend(v.references());
                }
                out
            }
            Definition::Output(o) => {
                let mut out = Vec::new();
                if let Some(c) = &o.condition {
                    out.push((ReferenceUse::Condition, c.name()));
                }
                out.extend(o.value.references());
                if let Some(name) = &o.export_name {
                    out.extend(name.references());
                }
                out
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Definition::Parameter(p) => p.to_json(),
            Definition::Mapping(m) => m.to_json(),
            Definition::Condition(body) => body.to_json(),
            Definition::Resource(r) => r.to_json(),
            Definition::Output(o) => o.to_json(),
        }
    }
}

impl From<ParameterDef> for Definition {
    fn from(p: ParameterDef) -> Self {
        Definition::Parameter(p)
    }
}

impl From<MappingDef> for Definition {
    fn from(m: MappingDef) -> Self {
        Definition::Mapping(m)
    }
}

/// A bare expression registers as a condition body.
impl From<Expr> for Definition {
    fn from(body: Expr) -> Self {
        Definition::Condition(body)
    }
}

impl From<ResourceDef> for Definition {
    fn from(r: ResourceDef) -> Self {
        Definition::Resource(r)
    }
}

impl From<OutputDef> for Definition {
    fn from(o: OutputDef) -> Self {
        Definition::Output(o)
    }
}
