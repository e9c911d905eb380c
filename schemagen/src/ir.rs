//! Intermediate Representation (IR) of the input type graph
//!
//! The IR is produced by an external schema parser and is read-only for the
//! rest of the crate. Named types live in a `Schema` in declaration order;
//! fields and arguments refer to them through `TypeRef`, which carries the
//! list/non-null wrapping around a type name.

use crate::error::GenerationError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A complete type graph
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Named types in declaration order
    types: Vec<NamedType>,

    /// Type name -> position in `types`
    index: HashMap<String, usize>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, builder style
    pub fn with_type(mut self, ty: impl Into<NamedType>) -> Self {
        self.add_type(ty.into());
        self
    }

    /// Add a type. A redefinition replaces the earlier one in place.
    pub fn add_type(&mut self, ty: NamedType) {
        match self.index.get(ty.name()) {
            Some(&pos) => self.types[pos] = ty,
            None => {
                self.index.insert(ty.name().to_string(), self.types.len());
                self.types.push(ty);
            }
        }
    }

    /// Look up a named type
    pub fn get(&self, name: &str) -> Option<&NamedType> {
        self.index.get(name).map(|&pos| &self.types[pos])
    }

    /// Look up a named type referenced from `node`, failing if it is missing
    pub fn lookup(&self, node: &str, name: &str) -> Result<&NamedType, GenerationError> {
        self.get(name).ok_or_else(|| GenerationError::UnknownType {
            node: node.to_string(),
            type_name: name.to_string(),
        })
    }

    /// All named types in declaration order
    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.types.iter()
    }

    /// Number of named types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the schema declares no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Kind of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Scalar,
    Enum,
    InputRecord,
    OutputRecord,
    Interface,
    Union,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Enum => "enum",
            TypeKind::InputRecord => "input",
            TypeKind::OutputRecord => "type",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
        };
        f.write_str(name)
    }
}

/// A named (non-wrapper) schema type
#[derive(Debug, Clone)]
pub enum NamedType {
    Scalar(ScalarType),
    Enum(EnumType),
    InputRecord(RecordType),
    OutputRecord(RecordType),
    Interface(RecordType),
    Union(UnionType),
}

impl NamedType {
    /// Type name
    pub fn name(&self) -> &str {
        match self {
            NamedType::Scalar(t) => &t.name,
            NamedType::Enum(t) => &t.name,
            NamedType::InputRecord(t) | NamedType::OutputRecord(t) | NamedType::Interface(t) => {
                &t.name
            }
            NamedType::Union(t) => &t.name,
        }
    }

    /// Directives attached to the type definition
    pub fn directives(&self) -> &DirectiveSet {
        match self {
            NamedType::Scalar(t) => &t.directives,
            NamedType::Enum(t) => &t.directives,
            NamedType::InputRecord(t) | NamedType::OutputRecord(t) | NamedType::Interface(t) => {
                &t.directives
            }
            NamedType::Union(t) => &t.directives,
        }
    }

    /// Kind of this type
    pub fn kind(&self) -> TypeKind {
        match self {
            NamedType::Scalar(_) => TypeKind::Scalar,
            NamedType::Enum(_) => TypeKind::Enum,
            NamedType::InputRecord(_) => TypeKind::InputRecord,
            NamedType::OutputRecord(_) => TypeKind::OutputRecord,
            NamedType::Interface(_) => TypeKind::Interface,
            NamedType::Union(_) => TypeKind::Union,
        }
    }
}

/// A scalar type definition
#[derive(Debug, Clone)]
pub struct ScalarType {
    /// Scalar name
    pub name: String,

    /// Directives on the definition
    pub directives: DirectiveSet,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directives: DirectiveSet::default(),
        }
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.insert(directive);
        self
    }
}

/// An enum type definition
#[derive(Debug, Clone)]
pub struct EnumType {
    /// Enum name
    pub name: String,

    /// Values in declaration order
    pub values: Vec<String>,

    /// Directives on the definition
    pub directives: DirectiveSet,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            directives: DirectiveSet::default(),
        }
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.insert(directive);
        self
    }
}

/// Shape shared by input records, output records and interfaces
#[derive(Debug, Clone)]
pub struct RecordType {
    /// Type name
    pub name: String,

    /// Fields in declaration order
    pub fields: Vec<Field>,

    /// Directives on the definition
    pub directives: DirectiveSet,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            directives: DirectiveSet::default(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.insert(directive);
        self
    }
}

/// A union type definition
#[derive(Debug, Clone)]
pub struct UnionType {
    /// Union name
    pub name: String,

    /// Names of the member output records
    pub members: Vec<String>,

    /// Directives on the definition
    pub directives: DirectiveSet,
}

impl UnionType {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
            directives: DirectiveSet::default(),
        }
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.insert(directive);
        self
    }
}

impl From<ScalarType> for NamedType {
    fn from(t: ScalarType) -> Self {
        NamedType::Scalar(t)
    }
}

impl From<EnumType> for NamedType {
    fn from(t: EnumType) -> Self {
        NamedType::Enum(t)
    }
}

impl From<UnionType> for NamedType {
    fn from(t: UnionType) -> Self {
        NamedType::Union(t)
    }
}

/// A field of a record or interface
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name as written in the schema
    pub name: String,

    /// Field type
    pub ty: TypeRef,

    /// Arguments (output fields only)
    pub arguments: Vec<Argument>,

    /// Directives on the field
    pub directives: DirectiveSet,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: Vec::new(),
            directives: DirectiveSet::default(),
        }
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.insert(directive);
        self
    }
}

/// An argument of an output field
#[derive(Debug, Clone)]
pub struct Argument {
    /// Argument name
    pub name: String,

    /// Argument type
    pub ty: TypeRef,

    /// Directives on the argument
    pub directives: DirectiveSet,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            directives: DirectiveSet::default(),
        }
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.insert(directive);
        self
    }
}

/// A reference to a type, possibly wrapped in list/non-null modifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A named type
    Named(String),
    /// A list of the inner type
    List(Box<TypeRef>),
    /// The inner type, excluding null
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Reference a named type
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Wrap in a list
    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// Wrap in non-null
    pub fn non_null(self) -> Self {
        TypeRef::NonNull(Box::new(self))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// A directive applied to a schema node
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Directive name without the `@`
    pub name: String,

    /// Argument values by name
    pub arguments: BTreeMap<String, Value>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    /// Look up an argument value
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

/// Directives on one node, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveSet {
    entries: BTreeMap<String, Directive>,
}

impl DirectiveSet {
    /// Attach a directive. Directive names are unique per node; a repeated
    /// directive replaces the earlier one.
    pub fn insert(&mut self, directive: Directive) {
        self.entries.insert(directive.name.clone(), directive);
    }

    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Directive> for DirectiveSet {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        let mut set = DirectiveSet::default();
        for directive in iter {
            set.insert(directive);
        }
        set
    }
}

/// An untyped value: directive arguments and raw input to generated parsers
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Build an object value from key/value pairs
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Short shape name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}
