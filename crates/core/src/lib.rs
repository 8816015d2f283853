//! stackform-core: typed builder for declarative infrastructure templates.
//!
//! Entities (parameters, mappings, conditions, resources, outputs) are
//! registered on a [`Stack`], which hands back a typed handle per kind.
//! Handles build the reference expressions other entities embed, and the
//! intrinsic constructors assemble `Fn::Sub`, `Fn::If` and `Fn::Equals`.
//! Invalid names and placeholders are rejected when the expression or
//! entity is built, never at serialization time.
//!
//! # Public API
//!
//! - [`Stack`] -- the document registry and serializer
//! - [`Expr`], [`ConditionRef`] -- the expression tree
//! - [`fn_sub()`], [`fn_if()`], [`fn_equals()`] -- intrinsic constructors
//! - [`PseudoParameter`] -- the fixed set of environment-provided names
//! - [`StackError`] -- construction error type

pub mod definition;
pub mod error;
pub mod expr;
pub mod handle;
pub mod intrinsic;
pub mod metadata;
pub mod pseudo;
pub mod stack;
pub mod tag;

// ── Convenience re-exports ───────────────────────────────────────────

pub use definition::{Definition, EntityKind, MappingDef, OutputDef, ParameterDef, ResourceDef};
pub use error::{Result, StackError};
pub use expr::{ConditionRef, Expr, ReferenceUse, SubstitutionMap};
pub use handle::{
    ConditionHandle, Handle, MappingHandle, OutputHandle, ParameterHandle, ResourceHandle,
};
pub use intrinsic::{fn_equals, fn_if, fn_sub};
pub use metadata::Metadata;
pub use pseudo::PseudoParameter;
pub use stack::Stack;
pub use tag::{name_tag, name_tag_sub, tag};
