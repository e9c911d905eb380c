//! Error types for code generation
//!
//! Generation-time errors abort the run. Coercion-time errors are what the
//! generated parse functions raise at runtime; the generator only describes
//! them.

use crate::naming::{NamingKey, QualifiedName};

/// Fatal error raised while generating artifacts
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// Two distinct naming keys produced the same qualified name
    #[error("naming collision on `{name}`: {first} and {second}")]
    NamingCollision {
        /// The contested name
        name: QualifiedName,
        /// Key that claimed the name first
        first: NamingKey,
        /// Key that tried to claim it again
        second: NamingKey,
    },

    /// A directive is missing a required argument or has the wrong value type
    #[error("invalid argument `{argument}` on @{directive} at `{node}`: {reason}")]
    InvalidDirectiveArgument {
        /// Qualified schema name of the annotated node
        node: String,
        /// Directive name
        directive: String,
        /// Argument name
        argument: String,
        /// What was wrong with it
        reason: String,
    },

    /// A type reference names a type that does not exist in the graph
    #[error("unknown type `{type_name}` referenced at `{node}`")]
    UnknownType {
        /// Qualified schema name of the referencing node
        node: String,
        /// The missing type name
        type_name: String,
    },

    /// A generator parameter could not be parsed
    #[error("invalid parameter `{key}`: {reason}")]
    InvalidParameter {
        /// Parameter key
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// The emitter produced source it could not parse back
    #[error("failed to render `{artifact}`: {message}")]
    Render {
        /// Artifact being rendered
        artifact: QualifiedName,
        /// Parser message
        message: String,
    },
}

impl GenerationError {
    /// Creates an invalid directive argument error
    pub fn invalid_argument(
        node: impl Into<String>,
        directive: impl Into<String>,
        argument: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDirectiveArgument {
            node: node.into(),
            directive: directive.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when converting an untyped input value into its typed form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    /// The input string is not one of the enum's values
    #[error("unknown value `{value}` for enum `{enum_name}`")]
    UnknownEnumValue {
        /// Enum being parsed
        enum_name: String,
        /// Offending input
        value: String,
    },

    /// The input does not have the shape the schema requires
    #[error("malformed input at `{path}`: expected {expected}, found {found}")]
    MalformedInputShape {
        /// Location inside the input value (`$`, `$.field`, `$[2]`)
        path: String,
        /// Expected shape
        expected: String,
        /// What was actually there
        found: String,
    },
}
