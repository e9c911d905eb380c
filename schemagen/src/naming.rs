//! Identifier and namespace synthesis for generated artifacts
//!
//! Every artifact is named from a [`NamingKey`]: an optional container type,
//! an optional field, and the role the artifact plays. The mapping is a pure
//! function of the key and the configured prefix/namespace, so artifacts
//! generated independently can reference each other by name.
//!
//! [`Namer`] memoizes results and records which key claimed which name. A
//! second key landing on an already claimed name is a fatal collision.

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::ir::TypeKind;
use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// A namespaced identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Dot separated namespace
    pub namespace: String,

    /// Bare identifier
    pub identifier: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            identifier: identifier.into(),
        }
    }

    /// Namespace segments, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.namespace.split('.').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.identifier)
        } else {
            write!(f, "{}.{}", self.namespace, self.identifier)
        }
    }
}

/// What a generated artifact is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NameRole {
    /// The target type generated for a schema type
    TypeName(TypeKind),
    /// Resolver contract for one field
    FieldResolver,
    /// Record holding a field's parsed arguments
    FieldArguments,
    /// Function parsing a field's raw arguments
    ArgumentParser,
    /// Function building an input record from a raw value
    InputParser,
    /// One-field box distinguishing explicit null from absent
    ValueBox,
    /// Wrapper passed to every resolver (source, arguments, context)
    EnvironmentWrapper,
    /// Page of results returned by a paginated resolver
    PaginationResult,
    /// Edge of a paginated field's connection
    PaginationEdge,
    /// Connection of a paginated field
    PaginationConnection,
    /// Shared page info record
    PageInfo,
    /// Function turning a page of results into a connection
    ConnectionBuilder,
}

impl NameRole {
    /// Namespace segment appended under the base namespace
    fn namespace_segment(self) -> &'static str {
        match self {
            NameRole::TypeName(TypeKind::Scalar) => "scalars",
            NameRole::TypeName(TypeKind::Enum) => "enums",
            NameRole::TypeName(TypeKind::InputRecord) | NameRole::InputParser => "inputs",
            NameRole::TypeName(TypeKind::OutputRecord) => "objects",
            NameRole::TypeName(TypeKind::Interface) => "interfaces",
            NameRole::TypeName(TypeKind::Union) => "unions",
            NameRole::FieldResolver | NameRole::FieldArguments | NameRole::ArgumentParser => {
                "resolvers"
            }
            NameRole::ValueBox | NameRole::EnvironmentWrapper => "runtime",
            NameRole::PaginationResult
            | NameRole::PaginationEdge
            | NameRole::PaginationConnection
            | NameRole::PageInfo
            | NameRole::ConnectionBuilder => "pagination",
        }
    }

    /// Runtime support types keep their fixed names
    fn suppresses_prefix(self) -> bool {
        matches!(
            self,
            NameRole::ValueBox | NameRole::EnvironmentWrapper | NameRole::PageInfo
        )
    }

    /// Functions get snake_case identifiers, everything else UpperCamelCase
    fn is_function(self) -> bool {
        matches!(
            self,
            NameRole::ArgumentParser | NameRole::InputParser | NameRole::ConnectionBuilder
        )
    }
}

/// Input to the naming engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamingKey {
    /// Owning schema type, if any
    pub container: Option<String>,

    /// Field within the container, if any
    pub field: Option<String>,

    /// Artifact role
    pub role: NameRole,
}

impl NamingKey {
    /// Key for the target type of a schema type
    pub fn type_name(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            container: Some(name.into()),
            field: None,
            role: NameRole::TypeName(kind),
        }
    }

    /// Key for a per-type artifact other than the type itself
    pub fn for_type(role: NameRole, name: impl Into<String>) -> Self {
        Self {
            container: Some(name.into()),
            field: None,
            role,
        }
    }

    /// Key for a field-scoped artifact
    pub fn for_field(role: NameRole, container: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            container: Some(container.into()),
            field: Some(field.into()),
            role,
        }
    }

    /// Key for a fixed, run-wide artifact
    pub fn fixed(role: NameRole) -> Self {
        Self {
            container: None,
            field: None,
            role,
        }
    }
}

impl fmt::Display for NamingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.role)?;
        match (&self.container, &self.field) {
            (Some(c), Some(field)) => write!(f, "({c}.{field})"),
            (Some(c), None) => write!(f, "({c})"),
            (None, Some(field)) => write!(f, "(.{field})"),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct NameTable {
    by_key: HashMap<NamingKey, QualifiedName>,
    by_name: HashMap<QualifiedName, NamingKey>,
}

/// Memoizing, collision-checking naming engine for one generation run
#[derive(Debug)]
pub struct Namer {
    prefix: Option<String>,
    base_namespace: String,
    table: RwLock<NameTable>,
}

impl Namer {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            prefix: config.name_prefix.clone().filter(|p| !p.is_empty()),
            base_namespace: config.base_namespace.clone(),
            table: RwLock::new(NameTable::default()),
        }
    }

    /// Name an artifact, claiming the name for `key`.
    ///
    /// Fails if a different key already claimed the same qualified name.
    pub fn name(&self, key: &NamingKey) -> Result<QualifiedName, GenerationError> {
        {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(name) = table.by_key.get(key) {
                return Ok(name.clone());
            }
        }

        let name = self.compose(key);
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(owner) = table.by_name.get(&name) {
            if owner != key {
                return Err(GenerationError::NamingCollision {
                    name,
                    first: owner.clone(),
                    second: key.clone(),
                });
            }
        }
        table.by_name.insert(name.clone(), key.clone());
        table.by_key.insert(key.clone(), name.clone());
        Ok(name)
    }

    /// Compute the name for a key without claiming it
    pub fn compose(&self, key: &NamingKey) -> QualifiedName {
        let namespace = if self.base_namespace.is_empty() {
            key.role.namespace_segment().to_string()
        } else {
            format!("{}.{}", self.base_namespace, key.role.namespace_segment())
        };
        QualifiedName {
            namespace,
            identifier: self.identifier(key),
        }
    }

    fn identifier(&self, key: &NamingKey) -> String {
        let scope = scoped_stem(key);
        let bare = match key.role {
            NameRole::TypeName(_) => scope,
            NameRole::FieldResolver => format!("{scope}Resolver"),
            NameRole::FieldArguments => format!("{scope}Args"),
            NameRole::ArgumentParser => format!("parse_{}_args", scope.to_snake_case()),
            NameRole::InputParser => format!("parse_{}", scope.to_snake_case()),
            NameRole::ValueBox => "Present".to_string(),
            NameRole::EnvironmentWrapper => "ResolverEnv".to_string(),
            NameRole::PaginationResult => format!("{scope}Page"),
            NameRole::PaginationEdge => format!("{scope}Edge"),
            NameRole::PaginationConnection => format!("{scope}Connection"),
            NameRole::PageInfo => "PageInfo".to_string(),
            NameRole::ConnectionBuilder => format!("build_{}_connection", scope.to_snake_case()),
        };

        match self.prefix.as_deref() {
            Some(prefix) if !key.role.suppresses_prefix() => {
                if key.role.is_function() {
                    format!("{}_{}", prefix.to_snake_case(), bare)
                } else {
                    format!("{}{}", prefix, bare)
                }
            }
            _ => bare,
        }
    }
}

/// Container identifier followed by the capitalized field identifier
fn scoped_stem(key: &NamingKey) -> String {
    let container = key
        .container
        .as_deref()
        .map(|c| c.to_upper_camel_case())
        .unwrap_or_default();
    match key.field.as_deref() {
        Some(field) => format!("{}{}", container, field.to_upper_camel_case()),
        None => container,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namer(prefix: Option<&str>) -> Namer {
        let mut config = GeneratorConfig::new().base_namespace("app.gen");
        config.name_prefix = prefix.map(str::to_string);
        Namer::new(&config)
    }

    #[test]
    fn test_type_names_are_namespaced_by_kind() {
        let namer = namer(None);
        let e = namer.name(&NamingKey::type_name(TypeKind::Enum, "Color")).unwrap();
        let i = namer
            .name(&NamingKey::type_name(TypeKind::InputRecord, "Color"))
            .unwrap();

        assert_eq!(e.to_string(), "app.gen.enums.Color");
        assert_eq!(i.to_string(), "app.gen.inputs.Color");
    }

    #[test]
    fn test_field_scoped_names() {
        let namer = namer(None);
        let key = NamingKey::for_field(NameRole::FieldResolver, "User", "friends");
        assert_eq!(namer.name(&key).unwrap().identifier, "UserFriendsResolver");

        let key = NamingKey::for_field(NameRole::ArgumentParser, "User", "friends");
        assert_eq!(namer.name(&key).unwrap().identifier, "parse_user_friends_args");

        let key = NamingKey::for_field(NameRole::ConnectionBuilder, "User", "friends");
        let name = namer.name(&key).unwrap();
        assert_eq!(name.identifier, "build_user_friends_connection");
        assert_eq!(name.namespace, "app.gen.pagination");
    }

    #[test]
    fn test_prefix_applies_except_for_runtime_types() {
        let namer = namer(Some("X"));
        let t = namer.name(&NamingKey::type_name(TypeKind::Enum, "Color")).unwrap();
        let f = namer
            .name(&NamingKey::for_type(NameRole::InputParser, "UserInput"))
            .unwrap();
        let b = namer.name(&NamingKey::fixed(NameRole::ValueBox)).unwrap();
        let p = namer.name(&NamingKey::fixed(NameRole::PageInfo)).unwrap();

        assert_eq!(t.identifier, "XColor");
        assert_eq!(f.identifier, "x_parse_user_input");
        assert_eq!(b.identifier, "Present");
        assert_eq!(p.identifier, "PageInfo");
    }

    #[test]
    fn test_name_is_memoized_and_stable() {
        let namer = namer(None);
        let key = NamingKey::for_field(NameRole::FieldArguments, "Query", "search");
        let first = namer.name(&key).unwrap();
        let second = namer.name(&key).unwrap();
        assert_eq!(first, second);
        assert_eq!(namer.compose(&key), first);
    }

    #[test]
    fn test_collision_is_reported_with_both_keys() {
        let namer = namer(None);
        let a = NamingKey::for_field(NameRole::FieldResolver, "User", "friendsList");
        let b = NamingKey::for_field(NameRole::FieldResolver, "UserFriends", "list");

        namer.name(&a).unwrap();
        match namer.name(&b) {
            Err(GenerationError::NamingCollision { name, first, second }) => {
                assert_eq!(name.identifier, "UserFriendsListResolver");
                assert_eq!(first, a);
                assert_eq!(second, b);
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_key_display() {
        let key = NamingKey::for_field(NameRole::FieldResolver, "User", "friends");
        assert_eq!(key.to_string(), "FieldResolver(User.friends)");
        assert_eq!(NamingKey::fixed(NameRole::PageInfo).to_string(), "PageInfo");
    }
}
