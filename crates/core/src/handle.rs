//! Typed handles returned by registration.
//!
//! Each entity kind gets its own handle type exposing only the reference
//! builders that make sense for it, so calling `attr` on a parameter does
//! not compile. [`Handle`] is the tagged union returned by the generic
//! [`Stack::register`](crate::Stack::register); its `try_*` builders check
//! the kind at runtime and fail with `InvalidReferenceKind`.

use crate::definition::EntityKind;
use crate::error::{Result, StackError};
use crate::expr::{ConditionRef, Expr};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterHandle {
    logical_id: String,
}

impl ParameterHandle {
    pub(crate) fn new(logical_id: impl Into<String>) -> Self {
        ParameterHandle {
            logical_id: logical_id.into(),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// The literal parameter name, as used in metadata groups and labels.
    pub fn name(&self) -> &str {
        &self.logical_id
    }

    pub fn reference(&self) -> Expr {
        Expr::Ref(self.logical_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingHandle {
    logical_id: String,
}

impl MappingHandle {
    pub(crate) fn new(logical_id: impl Into<String>) -> Self {
        MappingHandle {
            logical_id: logical_id.into(),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `{"Fn::FindInMap": [map, top_key, second_key]}`
    pub fn find_in_map(&self, top_key: impl Into<Expr>, second_key: impl Into<Expr>) -> Expr {
        Expr::FindInMap {
            map: self.logical_id.clone(),
            top_key: Box::new(top_key.into()),
            second_key: Box::new(second_key.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionHandle {
    logical_id: String,
}

impl ConditionHandle {
    pub(crate) fn new(logical_id: impl Into<String>) -> Self {
        ConditionHandle {
            logical_id: logical_id.into(),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn condition(&self) -> ConditionRef {
        ConditionRef::new(self.logical_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    logical_id: String,
}

impl ResourceHandle {
    pub(crate) fn new(logical_id: impl Into<String>) -> Self {
        ResourceHandle {
            logical_id: logical_id.into(),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn reference(&self) -> Expr {
        Expr::Ref(self.logical_id.clone())
    }

    /// `{"Fn::GetAtt": [resource, attribute]}`. The attribute name is not
    /// checked against the resource type.
    pub fn attr(&self, attribute: impl Into<String>) -> Expr {
        Expr::GetAtt {
            resource: self.logical_id.clone(),
            attribute: attribute.into(),
        }
    }
}

/// Outputs cannot be referenced; the handle only records the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputHandle {
    logical_id: String,
}

impl OutputHandle {
    pub(crate) fn new(logical_id: impl Into<String>) -> Self {
        OutputHandle {
            logical_id: logical_id.into(),
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }
}

// ──────────────────────────────────────────────
// Kind-tagged handle
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
    Parameter(ParameterHandle),
    Mapping(MappingHandle),
    Condition(ConditionHandle),
    Resource(ResourceHandle),
    Output(OutputHandle),
}

impl Handle {
    pub(crate) fn new(kind: EntityKind, logical_id: &str) -> Self {
        match kind {
            EntityKind::Parameter => Handle::Parameter(ParameterHandle::new(logical_id)),
            EntityKind::Mapping => Handle::Mapping(MappingHandle::new(logical_id)),
            EntityKind::Condition => Handle::Condition(ConditionHandle::new(logical_id)),
            EntityKind::Resource => Handle::Resource(ResourceHandle::new(logical_id)),
            EntityKind::Output => Handle::Output(OutputHandle::new(logical_id)),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Handle::Parameter(_) => EntityKind::Parameter,
            Handle::Mapping(_) => EntityKind::Mapping,
            Handle::Condition(_) => EntityKind::Condition,
            Handle::Resource(_) => EntityKind::Resource,
            Handle::Output(_) => EntityKind::Output,
        }
    }

    pub fn logical_id(&self) -> &str {
        match self {
            Handle::Parameter(h) => h.logical_id(),
            Handle::Mapping(h) => h.logical_id(),
            Handle::Condition(h) => h.logical_id(),
            Handle::Resource(h) => h.logical_id(),
            Handle::Output(h) => h.logical_id(),
        }
    }

    /// `Ref`, valid for parameters and resources.
    pub fn try_reference(&self) -> Result<Expr> {
        match self {
            Handle::Parameter(h) => Ok(h.reference()),
            Handle::Resource(h) => Ok(h.reference()),
            _ => Err(self.invalid("Ref")),
        }
    }

    /// `Fn::GetAtt`, valid for resources only.
    pub fn try_attr(&self, attribute: impl Into<String>) -> Result<Expr> {
        match self {
            Handle::Resource(h) => Ok(h.attr(attribute)),
            _ => Err(self.invalid("Fn::GetAtt")),
        }
    }

    /// `Condition`, valid for conditions only.
    pub fn try_condition(&self) -> Result<ConditionRef> {
        match self {
            Handle::Condition(h) => Ok(h.condition()),
            _ => Err(self.invalid("Condition")),
        }
    }

    /// `Fn::FindInMap`, valid for mappings only.
    pub fn try_find_in_map(
        &self,
        top_key: impl Into<Expr>,
        second_key: impl Into<Expr>,
    ) -> Result<Expr> {
        match self {
            Handle::Mapping(h) => Ok(h.find_in_map(top_key, second_key)),
            _ => Err(self.invalid("Fn::FindInMap")),
        }
    }

    fn invalid(&self, builder: &'static str) -> StackError {
        StackError::InvalidReferenceKind {
            kind: self.kind(),
            id: self.logical_id().to_owned(),
            builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_are_idempotent() {
        let r = ResourceHandle::new("WebServerInstance");
        assert_eq!(r.reference(), r.reference());
        assert_eq!(r.attr("PublicDnsName"), r.attr("PublicDnsName"));
        let c = ConditionHandle::new("SshAccessAllowed");
        assert_eq!(c.condition(), c.condition());
    }

    #[test]
    fn mapping_lookup_shape() {
        let m = MappingHandle::new("RegionImages");
        assert_eq!(
            m.find_in_map("us-east-1", "ImageId").to_json(),
            json!({"Fn::FindInMap": ["RegionImages", "us-east-1", "ImageId"]})
        );
    }

    #[test]
    fn tagged_handle_rejects_attr_on_parameter() {
        let h = Handle::new(EntityKind::Parameter, "VpcId");
        let err = h.try_attr("Arn").unwrap_err();
        assert_eq!(
            err,
            StackError::InvalidReferenceKind {
                kind: EntityKind::Parameter,
                id: "VpcId".to_string(),
                builder: "Fn::GetAtt",
            }
        );
        assert_eq!(h.try_reference().unwrap().to_json(), json!({"Ref": "VpcId"}));
    }

    #[test]
    fn tagged_handle_rejects_ref_on_condition_and_output() {
        for kind in [EntityKind::Condition, EntityKind::Output, EntityKind::Mapping] {
            let h = Handle::new(kind, "Thing");
            assert_eq!(h.try_reference().unwrap_err().code(), "InvalidReferenceKind");
        }
    }

    #[test]
    fn tagged_handle_condition_and_lookup() {
        let c = Handle::new(EntityKind::Condition, "IsProd");
        assert_eq!(c.try_condition().unwrap().name(), "IsProd");
        assert!(c.try_find_in_map("a", "b").is_err());

        let m = Handle::new(EntityKind::Mapping, "Sizes");
        assert!(m.try_find_in_map("a", "b").is_ok());
        assert!(m.try_condition().is_err());
    }
}
