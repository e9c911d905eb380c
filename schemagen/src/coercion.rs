//! Layered coercion synthesis
//!
//! For a wrapped type the synthesizer emits one [`CoercionStep`] per layer,
//! innermost first. Step `n` converts a raw value by deferring to step
//! `n - 1` for whatever it contains: a list step maps the previous step over
//! its elements, a non-null step rejects null and hands the value inward.
//! The chain is data; emitters render it and `runtime::coerce` executes it.

use crate::error::GenerationError;
use crate::ir::{NamedType, Schema, TypeRef, Value};
use crate::naming::{NameRole, Namer, NamingKey, QualifiedName};
use crate::policy::{self, Policy};
use crate::types::{BaseType, TargetType, TypeResolver};
use crate::wrapping::{self, Layer};

/// Accepted raw shapes for a scalar cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarShape {
    String,
    /// Strings or integers
    Id,
    Boolean,
    /// Integers within an inclusive range
    Integer { min: i64, max: i64 },
    /// Floats or integers
    Float,
    /// Arbitrary-precision numbers: integers, floats or numeric strings
    Numeric,
    /// Anything; the consumer owns validation
    Any,
}

impl ScalarShape {
    /// Shape for a schema scalar name
    pub fn for_scalar(name: &str) -> Self {
        match name {
            "String" => ScalarShape::String,
            "ID" => ScalarShape::Id,
            "Boolean" => ScalarShape::Boolean,
            "Int" => ScalarShape::Integer {
                min: i64::from(i32::MIN),
                max: i64::from(i32::MAX),
            },
            "Long" => ScalarShape::Integer {
                min: i64::MIN,
                max: i64::MAX,
            },
            "Short" => ScalarShape::Integer {
                min: i64::from(i16::MIN),
                max: i64::from(i16::MAX),
            },
            "Byte" => ScalarShape::Integer {
                min: 0,
                max: i64::from(u8::MAX),
            },
            "Float" => ScalarShape::Float,
            "Decimal" | "BigInt" => ScalarShape::Numeric,
            _ => ScalarShape::Any,
        }
    }

    /// Shape for a scalar remapped to a Rust type through the configuration
    pub fn for_target(ty: &str) -> Self {
        let integer = |min: i64, max: i64| ScalarShape::Integer { min, max };
        match ty.trim() {
            "String" | "std::string::String" | "::std::string::String" => ScalarShape::String,
            "bool" => ScalarShape::Boolean,
            "i8" => integer(i64::from(i8::MIN), i64::from(i8::MAX)),
            "i16" => integer(i64::from(i16::MIN), i64::from(i16::MAX)),
            "i32" => integer(i64::from(i32::MIN), i64::from(i32::MAX)),
            "i64" | "isize" => integer(i64::MIN, i64::MAX),
            "u8" => integer(0, i64::from(u8::MAX)),
            "u16" => integer(0, i64::from(u16::MAX)),
            "u32" => integer(0, i64::from(u32::MAX)),
            "u64" | "usize" => integer(0, i64::MAX),
            "f32" | "f64" => ScalarShape::Float,
            "rust_decimal::Decimal" | "num_bigint::BigInt" => ScalarShape::Numeric,
            _ => ScalarShape::Any,
        }
    }

    /// Whether a non-null raw value has this shape
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (ScalarShape::Any, _) => true,
            (ScalarShape::String, Value::String(_)) => true,
            (ScalarShape::Id, Value::String(_) | Value::Int(_)) => true,
            (ScalarShape::Boolean, Value::Bool(_)) => true,
            (ScalarShape::Integer { min, max }, Value::Int(i)) => (min..=max).contains(i),
            (ScalarShape::Float, Value::Float(_) | Value::Int(_)) => true,
            (ScalarShape::Numeric, Value::Float(_) | Value::Int(_)) => true,
            (ScalarShape::Numeric, Value::String(s)) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        }
    }

    /// Description used in error messages
    pub fn describe(self) -> String {
        match self {
            ScalarShape::String => "string".to_string(),
            ScalarShape::Id => "string or int".to_string(),
            ScalarShape::Boolean => "boolean".to_string(),
            ScalarShape::Integer { min, max } => format!("int in {min}..={max}"),
            ScalarShape::Float => "float".to_string(),
            ScalarShape::Numeric => "number or numeric string".to_string(),
            ScalarShape::Any => "any value".to_string(),
        }
    }
}

/// One conversion layer
#[derive(Debug, Clone, PartialEq)]
pub enum CoercionStep {
    /// Identity conversion after a shape check
    Cast {
        target: BaseType,
        shape: ScalarShape,
        nullable: bool,
    },
    /// Parse a string against the enum's values
    ParseEnum {
        enum_name: String,
        target: BaseType,
        values: Vec<String>,
        nullable: bool,
    },
    /// Delegate to an input record's parse function
    BuildInput {
        input: String,
        builder: QualifiedName,
        nullable: bool,
    },
    /// Reject null, then apply the previous step
    NonNull,
    /// Map the previous step over list elements
    MapList {
        /// Whether the list itself may be null
        nullable: bool,
        /// Whether the produced elements may be null
        elements_nullable: bool,
    },
}

impl CoercionStep {
    /// Whether this step is the terminal (base type) conversion
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CoercionStep::Cast { .. } | CoercionStep::ParseEnum { .. } | CoercionStep::BuildInput { .. }
        )
    }
}

/// How the outermost result is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent and null collapse into null
    Plain,
    /// Absent -> no box, null -> box(null), value -> box(value)
    Boxed,
}

/// Conversion from a raw value to a target type, one step per layer
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionChain {
    /// Steps, innermost (base type) first
    pub steps: Vec<CoercionStep>,

    /// Outermost presentation
    pub presence: Presence,

    /// Type the chain produces
    pub target: TargetType,
}

/// Builds coercion chains
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    schema: &'a Schema,
    resolver: TypeResolver<'a>,
    namer: &'a Namer,
}

impl<'a> Synthesizer<'a> {
    pub fn new(schema: &'a Schema, resolver: TypeResolver<'a>, namer: &'a Namer) -> Self {
        Self {
            schema,
            resolver,
            namer,
        }
    }

    /// Synthesize the chain converting a raw value into `ty` at `node`
    pub fn synthesize(
        &self,
        node: &str,
        ty: &TypeRef,
        context: Option<&Policy>,
    ) -> Result<CoercionChain, GenerationError> {
        let target = self.resolver.resolve(node, ty, context)?;
        let layers = wrapping::layers(ty);

        let mut steps = Vec::with_capacity(layers.len());
        for (index, layer) in layers.iter().enumerate().rev() {
            let nullable = index == 0 || layers[index - 1] != Layer::NonNull;
            let step = match layer {
                Layer::Named(name) => self.terminal(node, name, nullable, context)?,
                Layer::NonNull => CoercionStep::NonNull,
                Layer::List => CoercionStep::MapList {
                    nullable,
                    elements_nullable: layers.get(index + 1) != Some(&Layer::NonNull),
                },
            };
            steps.push(step);
        }

        let presence = if target.is_boxed() {
            Presence::Boxed
        } else {
            Presence::Plain
        };

        Ok(CoercionChain {
            steps,
            presence,
            target,
        })
    }

    fn terminal(
        &self,
        node: &str,
        name: &str,
        nullable: bool,
        context: Option<&Policy>,
    ) -> Result<CoercionStep, GenerationError> {
        if let Some(external) = context.and_then(|p| p.representation.as_deref()) {
            return Ok(CoercionStep::Cast {
                target: BaseType::External(external.to_string()),
                shape: ScalarShape::Any,
                nullable,
            });
        }

        let target = self.resolver.resolve_base(node, name)?;
        let named = match self.schema.get(name) {
            Some(named) => named,
            // built-in or configured scalar without a definition
            None => {
                let shape = self.scalar_shape(name, &target);
                return Ok(CoercionStep::Cast {
                    target,
                    shape,
                    nullable,
                });
            }
        };

        let step = match named {
            NamedType::Scalar(_) => CoercionStep::Cast {
                shape: self.scalar_shape(name, &target),
                target,
                nullable,
            },
            NamedType::Enum(e) => CoercionStep::ParseEnum {
                enum_name: e.name.clone(),
                target,
                values: e.values.clone(),
                nullable,
            },
            NamedType::InputRecord(input) => {
                if policy::resolve_representation(&input.name, &input.directives)?.is_some() {
                    CoercionStep::Cast {
                        target,
                        shape: ScalarShape::Any,
                        nullable,
                    }
                } else {
                    let builder = self
                        .namer
                        .name(&NamingKey::for_type(NameRole::InputParser, &input.name))?;
                    CoercionStep::BuildInput {
                        input: input.name.clone(),
                        builder,
                        nullable,
                    }
                }
            }
            NamedType::OutputRecord(_) | NamedType::Interface(_) | NamedType::Union(_) => {
                CoercionStep::Cast {
                    target,
                    shape: ScalarShape::Any,
                    nullable,
                }
            }
        };
        Ok(step)
    }

    /// Shape check for a scalar, following a configured remapping when present
    fn scalar_shape(&self, name: &str, target: &BaseType) -> ScalarShape {
        match target {
            BaseType::Builtin(ty) if self.resolver.is_remapped(name) => ScalarShape::for_target(ty),
            _ => ScalarShape::for_scalar(name),
        }
    }
}
