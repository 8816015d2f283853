use crate::definition::EntityKind;

/// A document-construction error.
///
/// Every variant is raised at the point where the offending entity or
/// expression is built; nothing invalid ever reaches serialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// Logical ids must be non-empty and ASCII alphanumeric.
    #[error("invalid {kind} id '{id}': logical ids must be non-empty and alphanumeric")]
    InvalidIdentifier { kind: EntityKind, id: String },

    /// The logical id is already taken by another entity of any kind.
    #[error("duplicate {kind} id '{id}': already registered as a {existing_kind}")]
    DuplicateIdentifier {
        kind: EntityKind,
        id: String,
        existing_kind: EntityKind,
    },

    /// A reference builder was invoked on a handle that does not support it.
    #[error("cannot build {builder} reference to {kind} '{id}'")]
    InvalidReferenceKind {
        kind: EntityKind,
        id: String,
        builder: &'static str,
    },

    /// A colon-qualified placeholder that is not a pseudo parameter.
    #[error("invalid pseudo parameter {placeholder}. Pseudo parameter should be: {valid}")]
    UnknownPseudoParameter { placeholder: String, valid: String },

    /// A plain placeholder with no matching substitution key.
    #[error("invalid parameter {placeholder}: it does not exist in the substitution map")]
    UnknownSubstitutionKey { placeholder: String },

    /// A literal or object expression is shaped like an intrinsic function
    /// (a single `Ref`, `Condition` or `Fn::*` key). Intrinsics must be built
    /// through the typed constructors so their references are checked.
    #[error("{kind} '{id}' contains an untyped intrinsic '{key}'; build it with the expression constructors")]
    UntypedIntrinsic {
        kind: EntityKind,
        id: String,
        key: String,
    },

    /// A definition references a name that is not registered in the stack.
    #[error("{kind} '{id}' references unknown name '{target}'")]
    DanglingReference {
        kind: EntityKind,
        id: String,
        target: String,
    },
}

impl StackError {
    /// Stable machine-readable name of the variant.
    pub fn code(&self) -> &'static str {
        match self {
            StackError::InvalidIdentifier { .. } => "InvalidIdentifier",
            StackError::DuplicateIdentifier { .. } => "DuplicateIdentifier",
            StackError::InvalidReferenceKind { .. } => "InvalidReferenceKind",
            StackError::UnknownPseudoParameter { .. } => "UnknownPseudoParameter",
            StackError::UnknownSubstitutionKey { .. } => "UnknownSubstitutionKey",
            StackError::UntypedIntrinsic { .. } => "UntypedIntrinsic",
            StackError::DanglingReference { .. } => "DanglingReference",
        }
    }

    /// Serialize to the `{"code", "message"}` shape used for JSON error output.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "code":    self.code(),
            "message": self.to_string(),
        })
    }
}

pub type Result<T, E = StackError> = std::result::Result<T, E>;
