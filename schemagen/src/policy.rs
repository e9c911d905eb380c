//! Directive-driven generation policy
//!
//! Directives are looked up by name exactly once per node and folded into a
//! [`Policy`] record; generators only ever read the record.

use crate::error::GenerationError;
use crate::ir::{Argument, DirectiveSet, Field, NamedType, Value};
use crate::wrapping;

/// Opt-in emission for a type
pub const GENERATE: &str = "generate";
/// Reuse an externally supplied type instead of generating one
pub const REPRESENTATION: &str = "representation";
/// Argument of [`REPRESENTATION`] naming the external type
pub const REPRESENTATION_TYPE: &str = "type";
/// Opt-in resolver emission for a field
pub const RESOLVER: &str = "resolver";
/// Distinguish absent from explicit null
pub const DOUBLE_NULL: &str = "doubleNull";
/// Wrap a list field in a connection
pub const PAGINATION: &str = "pagination";

/// Generation policy resolved for a single node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// Whether an artifact should be emitted for the node
    pub generate: bool,

    /// External type replacing the generated one
    pub representation: Option<String>,

    /// Whether nullable values are boxed to keep absent and null apart
    pub double_null: bool,

    /// Whether the field is paginated (fields only)
    pub pagination: bool,
}

impl Policy {
    /// Policy for a named type definition
    pub fn for_type(ty: &NamedType, generate_all: bool) -> Result<Self, GenerationError> {
        let node = ty.name();
        let directives = ty.directives();
        Ok(Self {
            generate: should_generate(node, directives, generate_all)?,
            representation: resolve_representation(node, directives)?,
            double_null: resolve_double_null(directives),
            pagination: false,
        })
    }

    /// Policy for a field of `container`
    pub fn for_field(
        container: &str,
        field: &Field,
        generate_all: bool,
    ) -> Result<Self, GenerationError> {
        let node = field_path(container, &field.name);
        Ok(Self {
            generate: should_generate(&node, &field.directives, generate_all)?,
            representation: resolve_representation(&node, &field.directives)?,
            double_null: resolve_double_null(&field.directives),
            pagination: resolve_pagination(field),
        })
    }

    /// Policy for an argument of `container.field`. Arguments are never
    /// generated on their own.
    pub fn for_argument(
        container: &str,
        field: &str,
        argument: &Argument,
    ) -> Result<Self, GenerationError> {
        let node = argument_path(container, field, &argument.name);
        Ok(Self {
            generate: false,
            representation: resolve_representation(&node, &argument.directives)?,
            double_null: resolve_double_null(&argument.directives),
            pagination: false,
        })
    }
}

/// Whether to emit an artifact for a node.
///
/// A representation override always wins: the type already exists
/// elsewhere.
pub fn should_generate(
    node: &str,
    directives: &DirectiveSet,
    generate_all: bool,
) -> Result<bool, GenerationError> {
    if resolve_representation(node, directives)?.is_some() {
        return Ok(false);
    }
    Ok(generate_all || directives.contains(GENERATE) || directives.contains(RESOLVER))
}

/// External type named by a representation directive, if present
pub fn resolve_representation(
    node: &str,
    directives: &DirectiveSet,
) -> Result<Option<String>, GenerationError> {
    let Some(directive) = directives.get(REPRESENTATION) else {
        return Ok(None);
    };

    match directive.argument(REPRESENTATION_TYPE) {
        Some(Value::String(ty)) if !ty.trim().is_empty() => Ok(Some(ty.trim().to_string())),
        Some(Value::String(_)) => Err(GenerationError::invalid_argument(
            node,
            REPRESENTATION,
            REPRESENTATION_TYPE,
            "must not be empty",
        )),
        Some(other) => Err(GenerationError::invalid_argument(
            node,
            REPRESENTATION,
            REPRESENTATION_TYPE,
            format!("expected a string, found {}", other.kind_name()),
        )),
        None => Err(GenerationError::invalid_argument(
            node,
            REPRESENTATION,
            REPRESENTATION_TYPE,
            "required argument is missing",
        )),
    }
}

/// Whether a field is paginated: it carries the directive and is a list
pub fn resolve_pagination(field: &Field) -> bool {
    if !field.directives.contains(PAGINATION) {
        return false;
    }
    let is_list = wrapping::is_list(&field.ty);
    if !is_list {
        tracing::debug!(field = %field.name, ty = %field.ty, "ignoring @pagination on non-list field");
    }
    is_list
}

/// Whether nullable values of this node are boxed to keep absent and null apart
pub fn resolve_double_null(directives: &DirectiveSet) -> bool {
    directives.contains(DOUBLE_NULL)
}

/// Qualified schema name of a field, e.g. `User.friends`
pub fn field_path(container: &str, field: &str) -> String {
    format!("{container}.{field}")
}

/// Qualified schema name of an argument, e.g. `User.friends(first)`
pub fn argument_path(container: &str, field: &str, argument: &str) -> String {
    format!("{container}.{field}({argument})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Directive, EnumType, TypeRef};

    fn set(directives: impl IntoIterator<Item = Directive>) -> DirectiveSet {
        directives.into_iter().collect()
    }

    fn representation(ty: &str) -> Directive {
        Directive::new(REPRESENTATION).with_argument(REPRESENTATION_TYPE, Value::string(ty))
    }

    #[test]
    fn test_should_generate_matrix() {
        let empty = set([]);
        let explicit = set([Directive::new(GENERATE)]);
        let resolver = set([Directive::new(RESOLVER)]);
        let represented = set([Directive::new(GENERATE), representation("ext::Color")]);

        assert!(!should_generate("T", &empty, false).unwrap());
        assert!(should_generate("T", &empty, true).unwrap());
        assert!(should_generate("T", &explicit, false).unwrap());
        assert!(should_generate("T", &resolver, false).unwrap());
        assert!(!should_generate("T", &represented, false).unwrap());
        assert!(!should_generate("T", &represented, true).unwrap());
    }

    #[test]
    fn test_representation_requires_string_argument() {
        let missing = set([Directive::new(REPRESENTATION)]);
        let err = resolve_representation("User", &missing).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidDirectiveArgument { ref node, ref argument, .. }
                if node == "User" && argument == REPRESENTATION_TYPE
        ));

        let wrong = set([Directive::new(REPRESENTATION).with_argument(REPRESENTATION_TYPE, Value::Int(3))]);
        assert!(resolve_representation("User", &wrong).is_err());

        let blank = set([representation("  ")]);
        assert!(resolve_representation("User", &blank).is_err());

        let ok = set([representation("crate::User")]);
        assert_eq!(
            resolve_representation("User", &ok).unwrap().as_deref(),
            Some("crate::User")
        );
    }

    #[test]
    fn test_pagination_requires_list() {
        let list = Field::new("friends", TypeRef::named("User").non_null().list().non_null())
            .with_directive(Directive::new(PAGINATION));
        let single = Field::new("best", TypeRef::named("User"))
            .with_directive(Directive::new(PAGINATION));
        let plain = Field::new("all", TypeRef::named("User").list());

        assert!(resolve_pagination(&list));
        assert!(!resolve_pagination(&single));
        assert!(!resolve_pagination(&plain));
    }

    #[test]
    fn test_policy_for_type_and_field() {
        let ty = NamedType::Enum(
            EnumType::new("Color", ["RED"]).with_directive(Directive::new(GENERATE)),
        );
        let policy = Policy::for_type(&ty, false).unwrap();
        assert!(policy.generate);
        assert_eq!(policy.representation, None);

        let field = Field::new("nickname", TypeRef::named("String"))
            .with_directive(Directive::new(DOUBLE_NULL))
            .with_directive(representation("Nick"));
        let policy = Policy::for_field("User", &field, true).unwrap();
        assert!(!policy.generate);
        assert!(policy.double_null);
        assert_eq!(policy.representation.as_deref(), Some("Nick"));
    }

    #[test]
    fn test_invalid_argument_names_argument_node() {
        let argument = Argument::new("first", TypeRef::named("Int"))
            .with_directive(Directive::new(REPRESENTATION));
        let err = Policy::for_argument("User", "friends", &argument).unwrap_err();
        assert!(err.to_string().contains("User.friends(first)"));
    }
}
