//! Mapping from schema type references to target-language types
//!
//! The resolver flattens a `TypeRef` with [`wrapping::layers`], resolves the
//! base name, then rebuilds the list nesting with per-layer nullability.
//! It is the single place where type identity is decided, so comparing two
//! [`TargetType`]s is how the rest of the crate asks "same type?".

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::ir::{NamedType, Schema, TypeKind, TypeRef};
use crate::naming::{Namer, NamingKey, QualifiedName};
use crate::policy::{self, Policy};
use crate::wrapping::{self, Layer};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Built-in scalar names and their target types
static BUILTIN_SCALARS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("String", "String"),
        ("Boolean", "bool"),
        ("Int", "i32"),
        ("Float", "f64"),
        ("ID", "String"),
        ("Long", "i64"),
        ("Short", "i16"),
        ("Byte", "u8"),
        ("Decimal", "rust_decimal::Decimal"),
        ("BigInt", "num_bigint::BigInt"),
    ])
});

/// Whether `name` is one of the built-in scalars
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains_key(name)
}

/// The innermost, non-wrapper part of a target type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// A scalar mapped through the scalar table
    Builtin(String),
    /// A type produced by this generator
    Generated(QualifiedName),
    /// A type supplied from outside via a representation override
    External(String),
    /// Universal fallback for types with no mapping
    Unknown,
    /// A generic parameter of the enclosing artifact
    Param(String),
    /// A generic artifact applied to type arguments
    Instance {
        name: QualifiedName,
        args: Vec<TargetType>,
    },
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Builtin(ty) | BaseType::External(ty) => f.write_str(ty),
            BaseType::Generated(name) => write!(f, "{name}"),
            BaseType::Unknown => f.write_str("Unknown"),
            BaseType::Param(name) => f.write_str(name),
            BaseType::Instance { name, args } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Kind of a wrapper around the base type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    List,
    /// One-field box separating explicit null from absent
    Box,
}

/// A single wrapper layer with its own nullability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wrapper {
    pub kind: WrapperKind,
    pub nullable: bool,
}

/// A resolved target-language type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetType {
    /// Base identifier
    pub base: BaseType,

    /// Nullability of the base value itself
    pub nullable: bool,

    /// Wrappers, outermost first
    pub wrapping: Vec<Wrapper>,
}

impl TargetType {
    /// A non-null, unwrapped type
    pub fn required(base: BaseType) -> Self {
        Self {
            base,
            nullable: false,
            wrapping: Vec::new(),
        }
    }

    /// A nullable, unwrapped type
    pub fn optional(base: BaseType) -> Self {
        Self {
            base,
            nullable: true,
            wrapping: Vec::new(),
        }
    }

    /// Wrap in an outer list
    pub fn list_of(mut self, nullable: bool) -> Self {
        self.wrapping.insert(
            0,
            Wrapper {
                kind: WrapperKind::List,
                nullable,
            },
        );
        self
    }

    /// Whether the outermost position admits null
    pub fn is_nullable(&self) -> bool {
        self.wrapping.first().map_or(self.nullable, |w| w.nullable)
    }

    /// Whether the outermost wrapper is the double-null box
    pub fn is_boxed(&self) -> bool {
        matches!(self.wrapping.first(), Some(w) if w.kind == WrapperKind::Box)
    }

    /// The type without its outermost box, if any
    pub fn unboxed(&self) -> TargetType {
        let mut inner = self.clone();
        if inner.is_boxed() {
            inner.wrapping.remove(0);
        }
        inner
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = if self.nullable {
            format!("Option<{}>", self.base)
        } else {
            self.base.to_string()
        };
        for wrapper in self.wrapping.iter().rev() {
            rendered = match wrapper.kind {
                WrapperKind::List => format!("Vec<{rendered}>"),
                WrapperKind::Box => format!("Present<{rendered}>"),
            };
            if wrapper.nullable {
                rendered = format!("Option<{rendered}>");
            }
        }
        f.write_str(&rendered)
    }
}

/// Resolves schema type references against one schema and configuration
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    schema: &'a Schema,
    config: &'a GeneratorConfig,
    namer: &'a Namer,
}

impl<'a> TypeResolver<'a> {
    pub fn new(schema: &'a Schema, config: &'a GeneratorConfig, namer: &'a Namer) -> Self {
        Self {
            schema,
            config,
            namer,
        }
    }

    /// Resolve a type reference found at `node`.
    ///
    /// `context` is the policy of the field or argument carrying the type; it
    /// contributes a representation override and the double-null box.
    pub fn resolve(
        &self,
        node: &str,
        ty: &TypeRef,
        context: Option<&Policy>,
    ) -> Result<TargetType, GenerationError> {
        let layers = wrapping::layers(ty);
        let (base_layer, modifiers) = layers
            .split_last()
            .ok_or_else(|| GenerationError::UnknownType {
                node: node.to_string(),
                type_name: ty.to_string(),
            })?;
        let Layer::Named(base_name) = base_layer else {
            return Err(GenerationError::UnknownType {
                node: node.to_string(),
                type_name: ty.to_string(),
            });
        };

        let base = match context.and_then(|p| p.representation.as_deref()) {
            Some(external) => BaseType::External(external.to_string()),
            None => self.resolve_base(node, base_name)?,
        };

        let mut wrapping = Vec::new();
        let mut non_null = false;
        for layer in modifiers {
            match layer {
                Layer::NonNull => non_null = true,
                Layer::List => {
                    wrapping.push(Wrapper {
                        kind: WrapperKind::List,
                        nullable: !non_null,
                    });
                    non_null = false;
                }
                Layer::Named(_) => {}
            }
        }

        let mut target = TargetType {
            base,
            nullable: !non_null,
            wrapping,
        };

        if context.is_some_and(|p| p.double_null) && target.is_nullable() {
            target.wrapping.insert(
                0,
                Wrapper {
                    kind: WrapperKind::Box,
                    nullable: true,
                },
            );
        }

        Ok(target)
    }

    /// Whether the configuration maps scalar `name` to its own target type
    pub fn is_remapped(&self, name: &str) -> bool {
        self.config.scalars.contains_key(name)
    }

    /// Resolve a base type name
    pub fn resolve_base(&self, node: &str, name: &str) -> Result<BaseType, GenerationError> {
        if let Some(target) = self.config.scalars.get(name) {
            return Ok(BaseType::Builtin(target.clone()));
        }
        if let Some(target) = BUILTIN_SCALARS.get(name) {
            return Ok(BaseType::Builtin((*target).to_string()));
        }
        let named = self.schema.lookup(node, name)?;
        self.resolve_named(named)
    }

    /// Resolve a named type definition
    pub fn resolve_named(&self, named: &NamedType) -> Result<BaseType, GenerationError> {
        let node = named.name();
        let representation = policy::resolve_representation(node, named.directives())?;
        if let Some(external) = representation {
            return Ok(BaseType::External(external));
        }

        let base = match named {
            NamedType::Scalar(_) => None,
            NamedType::Enum(_) | NamedType::InputRecord(_) => Some(self.generated(named.kind(), node)?),
            NamedType::OutputRecord(_) => {
                if policy::should_generate(node, named.directives(), self.config.generate_all)? {
                    Some(self.generated(TypeKind::OutputRecord, node)?)
                } else {
                    None
                }
            }
            NamedType::Interface(_) => None,
            NamedType::Union(union) => self.resolve_uniform_union(node, &union.members)?,
        };

        Ok(base.unwrap_or_else(|| {
            tracing::debug!(ty = node, kind = %named.kind(), "no mapping, falling back to Unknown");
            BaseType::Unknown
        }))
    }

    /// A union whose members all resolve to one type is represented by that type
    fn resolve_uniform_union(
        &self,
        node: &str,
        members: &[String],
    ) -> Result<Option<BaseType>, GenerationError> {
        let mut shared: Option<BaseType> = None;
        for member in members {
            let resolved = self.resolve_named(self.schema.lookup(node, member)?)?;
            match &shared {
                None => shared = Some(resolved),
                Some(existing) if *existing == resolved => {}
                Some(_) => {
                    tracing::debug!(union = node, "union members disagree on representation");
                    return Ok(None);
                }
            }
        }
        Ok(shared.filter(|base| *base != BaseType::Unknown))
    }

    fn generated(&self, kind: TypeKind, name: &str) -> Result<BaseType, GenerationError> {
        let name = self.namer.name(&NamingKey::type_name(kind, name))?;
        Ok(BaseType::Generated(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Directive, EnumType, RecordType, ScalarType, UnionType, Value};
    use pretty_assertions::assert_eq;

    fn representation(ty: &str) -> Directive {
        Directive::new(policy::REPRESENTATION)
            .with_argument(policy::REPRESENTATION_TYPE, Value::string(ty))
    }

    fn schema() -> Schema {
        Schema::new()
            .with_type(EnumType::new("Color", ["RED", "GREEN"]))
            .with_type(ScalarType::new("DateTime"))
            .with_type(ScalarType::new("Url").with_directive(representation("url::Url")))
            .with_type(NamedType::OutputRecord(
                RecordType::new("Cat").with_directive(representation("pets::Animal")),
            ))
            .with_type(NamedType::OutputRecord(
                RecordType::new("Dog").with_directive(representation("pets::Animal")),
            ))
            .with_type(NamedType::OutputRecord(
                RecordType::new("Fish").with_directive(Directive::new(policy::GENERATE)),
            ))
            .with_type(NamedType::OutputRecord(RecordType::new("Plain")))
            .with_type(UnionType::new("Pet", ["Cat", "Dog"]))
            .with_type(UnionType::new("Mixed", ["Cat", "Fish"]))
            .with_type(NamedType::Interface(RecordType::new("Node")))
    }

    fn resolve(ty: TypeRef, context: Option<&Policy>) -> TargetType {
        let schema = schema();
        let config = GeneratorConfig::new().scalar("DateTime", "chrono::NaiveDateTime");
        let namer = Namer::new(&config);
        TypeResolver::new(&schema, &config, &namer)
            .resolve("Test.field", &ty, context)
            .unwrap()
    }

    #[test]
    fn test_builtin_scalars() {
        let target = resolve(TypeRef::named("Int").non_null(), None);
        assert_eq!(target, TargetType::required(BaseType::Builtin("i32".into())));

        let target = resolve(TypeRef::named("ID"), None);
        assert_eq!(target, TargetType::optional(BaseType::Builtin("String".into())));
    }

    #[test]
    fn test_configured_and_represented_scalars() {
        assert_eq!(
            resolve(TypeRef::named("DateTime"), None).base,
            BaseType::Builtin("chrono::NaiveDateTime".into())
        );
        assert_eq!(
            resolve(TypeRef::named("Url"), None).base,
            BaseType::External("url::Url".into())
        );
    }

    #[test]
    fn test_per_layer_nullability() {
        // [Color]! -> Vec<Option<Color>>
        let target = resolve(TypeRef::named("Color").list().non_null(), None);
        assert!(target.nullable);
        assert_eq!(
            target.wrapping,
            vec![Wrapper {
                kind: WrapperKind::List,
                nullable: false
            }]
        );
        assert_eq!(target.to_string(), "Vec<Option<generated.enums.Color>>");

        // [[Int!]] -> Option<Vec<Option<Vec<i32>>>>
        let target = resolve(TypeRef::named("Int").non_null().list().list(), None);
        assert_eq!(target.to_string(), "Option<Vec<Option<Vec<i32>>>>");
    }

    #[test]
    fn test_output_records_and_interfaces() {
        assert_eq!(
            resolve(TypeRef::named("Fish"), None).base,
            BaseType::Generated(QualifiedName::new("generated.objects", "Fish"))
        );
        assert_eq!(resolve(TypeRef::named("Plain"), None).base, BaseType::Unknown);
        assert_eq!(resolve(TypeRef::named("Node"), None).base, BaseType::Unknown);
    }

    #[test]
    fn test_union_uniformity_shortcut() {
        assert_eq!(
            resolve(TypeRef::named("Pet"), None).base,
            BaseType::External("pets::Animal".into())
        );
        assert_eq!(resolve(TypeRef::named("Mixed"), None).base, BaseType::Unknown);
    }

    #[test]
    fn test_double_null_boxes_only_nullable() {
        let context = Policy {
            double_null: true,
            ..Policy::default()
        };
        let target = resolve(TypeRef::named("String"), Some(&context));
        assert!(target.is_boxed());
        assert!(target.is_nullable());
        assert_eq!(target.to_string(), "Option<Present<Option<String>>>");
        assert_eq!(target.unboxed(), TargetType::optional(BaseType::Builtin("String".into())));

        let target = resolve(TypeRef::named("String").non_null(), Some(&context));
        assert!(!target.is_boxed());
    }

    #[test]
    fn test_field_representation_overrides_base_only() {
        let context = Policy {
            representation: Some("ext::Tag".into()),
            ..Policy::default()
        };
        let target = resolve(TypeRef::named("String").non_null().list(), Some(&context));
        assert_eq!(target.to_string(), "Option<Vec<ext::Tag>>");
    }

    #[test]
    fn test_unknown_reference_is_fatal() {
        let schema = schema();
        let config = GeneratorConfig::new();
        let namer = Namer::new(&config);
        let err = TypeResolver::new(&schema, &config, &namer)
            .resolve("User.pet", &TypeRef::named("Parrot"), None)
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnknownType {
                node: "User.pet".into(),
                type_name: "Parrot".into()
            }
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let ty = TypeRef::named("Color").non_null().list();
        assert_eq!(resolve(ty.clone(), None), resolve(ty, None));
    }
}
