//! The document registry.
//!
//! A [`Stack`] owns every named entity of one template document. It enforces
//! the single logical-id namespace, checks that every name a definition
//! refers to is already registered with a compatible kind, and renders the
//! whole document in registration order.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::definition::{Definition, EntityKind, MappingDef, OutputDef, ParameterDef, ResourceDef};
use crate::error::{Result, StackError};
use crate::expr::{Expr, ReferenceUse};
use crate::handle::{
    ConditionHandle, Handle, MappingHandle, OutputHandle, ParameterHandle, ResourceHandle,
};
use crate::intrinsic::check_placeholders;
use crate::metadata::Metadata;
use crate::pseudo::PseudoParameter;

#[derive(Debug, Clone, Default)]
pub struct Stack {
    description: Option<String>,
    /// All entities keyed by logical id, in registration order.
    entities: IndexMap<String, Definition>,
    metadata: Metadata,
}

impl Stack {
    /// Start a document. The description is emitted exactly as given; an
    /// empty description is omitted from the output.
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        Stack {
            description: (!description.is_empty()).then_some(description),
            ..Stack::default()
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Kind of the entity registered under `logical_id`, if any.
    pub fn kind_of(&self, logical_id: &str) -> Option<EntityKind> {
        self.entities.get(logical_id).map(Definition::kind)
    }

    pub fn definition(&self, logical_id: &str) -> Option<&Definition> {
        self.entities.get(logical_id)
    }

    /// Logical ids of one kind, in registration order.
    pub fn logical_ids(&self, kind: EntityKind) -> impl Iterator<Item = &str> + '_ {
        self.entities
            .iter()
            .filter(move |(_, d)| d.kind() == kind)
            .map(|(id, _)| id.as_str())
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Register any definition and get back the matching kind-tagged handle.
    pub fn register(
        &mut self,
        logical_id: impl Into<String>,
        definition: impl Into<Definition>,
    ) -> Result<Handle> {
        let definition = definition.into();
        let kind = definition.kind();
        let id = self.insert(logical_id.into(), definition)?;
        Ok(Handle::new(kind, &id))
    }

    pub fn add_parameter(
        &mut self,
        logical_id: impl Into<String>,
        definition: ParameterDef,
    ) -> Result<ParameterHandle> {
        let id = self.insert(logical_id.into(), Definition::Parameter(definition))?;
        Ok(ParameterHandle::new(id))
    }

    pub fn add_mapping(
        &mut self,
        logical_id: impl Into<String>,
        definition: MappingDef,
    ) -> Result<MappingHandle> {
        let id = self.insert(logical_id.into(), Definition::Mapping(definition))?;
        Ok(MappingHandle::new(id))
    }

    /// Register a condition whose body is usually built with `fn_equals`.
    pub fn add_condition(
        &mut self,
        logical_id: impl Into<String>,
        body: Expr,
    ) -> Result<ConditionHandle> {
        let id = self.insert(logical_id.into(), Definition::Condition(body))?;
        Ok(ConditionHandle::new(id))
    }

    pub fn add_resource(
        &mut self,
        logical_id: impl Into<String>,
        definition: ResourceDef,
    ) -> Result<ResourceHandle> {
        let id = self.insert(logical_id.into(), Definition::Resource(definition))?;
        Ok(ResourceHandle::new(id))
    }

    pub fn add_output(
        &mut self,
        logical_id: impl Into<String>,
        definition: OutputDef,
    ) -> Result<OutputHandle> {
        let id = self.insert(logical_id.into(), Definition::Output(definition))?;
        Ok(OutputHandle::new(id))
    }

    /// Validate and store. Nothing is mutated unless every check passes.
    fn insert(&mut self, id: String, definition: Definition) -> Result<String> {
        let kind = definition.kind();
        if let Err(e) = self.check(&id, &definition) {
            tracing::warn!(kind = %kind, id = %id, error = %e, "rejected registration");
            return Err(e);
        }
        tracing::debug!(kind = %kind, id = %id, "registered entity");
        self.entities.insert(id.clone(), definition);
        Ok(id)
    }

    fn check(&self, id: &str, definition: &Definition) -> Result<()> {
        let kind = definition.kind();

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StackError::InvalidIdentifier {
                kind,
                id: id.to_owned(),
            });
        }

        if let Some(existing) = self.entities.get(id) {
            return Err(StackError::DuplicateIdentifier {
                kind,
                id: id.to_owned(),
                existing_kind: existing.kind(),
            });
        }

        for expr in definition.expressions() {
            expr.try_walk(&mut |node| {
                if let Some(key) = node.untyped_intrinsic() {
                    return Err(StackError::UntypedIntrinsic {
                        kind,
                        id: id.to_owned(),
                        key: key.to_owned(),
                    });
                }
                match node {
                    Expr::Sub {
                        template,
                        substitutions,
                    } => check_placeholders(template, substitutions.as_ref()),
                    _ => Ok(()),
                }
            })?;
        }

        for (usage, target) in definition.references() {
            if usage == ReferenceUse::Ref && PseudoParameter::from_name(target).is_some() {
                continue;
            }
            let Some(found) = self.entities.get(target) else {
                return Err(StackError::DanglingReference {
                    kind,
                    id: id.to_owned(),
                    target: target.to_owned(),
                });
            };
            let target_kind = found.kind();
            let compatible = match usage {
                ReferenceUse::Ref => {
                    matches!(target_kind, EntityKind::Parameter | EntityKind::Resource)
                }
                ReferenceUse::GetAtt | ReferenceUse::DependsOn => {
                    target_kind == EntityKind::Resource
                }
                ReferenceUse::Condition => target_kind == EntityKind::Condition,
                ReferenceUse::FindInMap => target_kind == EntityKind::Mapping,
            };
            if !compatible {
                return Err(StackError::InvalidReferenceKind {
                    kind: target_kind,
                    id: target.to_owned(),
                    builder: usage.builder(),
                });
            }
        }

        Ok(())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Group parameters under a console label, in the given order.
    pub fn add_parameter_group(
        &mut self,
        label: impl Into<String>,
        parameters: &[&ParameterHandle],
    ) -> Result<()> {
        for p in parameters {
            self.check_parameter(p)?;
        }
        let names = parameters.iter().map(|p| p.name().to_owned()).collect();
        self.metadata.push_group(label.into(), names);
        Ok(())
    }

    pub fn add_parameter_label(
        &mut self,
        parameter: &ParameterHandle,
        label: impl Into<String>,
    ) -> Result<()> {
        self.check_parameter(parameter)?;
        self.metadata
            .set_label(parameter.name().to_owned(), label.into());
        Ok(())
    }

    fn check_parameter(&self, parameter: &ParameterHandle) -> Result<()> {
        match self.kind_of(parameter.name()) {
            Some(EntityKind::Parameter) => Ok(()),
            _ => Err(StackError::DanglingReference {
                kind: EntityKind::Parameter,
                id: parameter.name().to_owned(),
                target: parameter.name().to_owned(),
            }),
        }
    }

    // ── Serialization ────────────────────────────────────────────────

    /// Render the complete document. Sections appear in a fixed order and
    /// are omitted when empty; entries keep registration order.
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();
        if let Some(d) = &self.description {
            doc.insert("Description".to_owned(), json!(d));
        }
        for (section, kind) in [
            ("Parameters", EntityKind::Parameter),
            ("Mappings", EntityKind::Mapping),
            ("Conditions", EntityKind::Condition),
            ("Resources", EntityKind::Resource),
            ("Outputs", EntityKind::Output),
        ] {
            let mut entries = Map::new();
            for (id, def) in self.entities.iter().filter(|(_, d)| d.kind() == kind) {
                entries.insert(id.clone(), def.to_json());
            }
            if !entries.is_empty() {
                doc.insert(section.to_owned(), Value::Object(entries));
            }
        }
        if !self.metadata.is_empty() {
            doc.insert("Metadata".to_owned(), self.metadata.to_json());
        }
        Value::Object(doc)
    }

    /// Pretty-printed JSON document.
    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.to_json())
    }
}

impl Serialize for Stack {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
