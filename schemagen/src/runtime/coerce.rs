//! Execution of coercion chains against untyped input

use crate::artifact::{ArtifactDescriptor, FieldCoercion, FunctionBody};
use crate::coercion::{CoercionChain, CoercionStep, Presence};
use crate::error::CoercionError;
use crate::ir::Value;
use crate::naming::QualifiedName;
use std::collections::{BTreeMap, HashMap};

/// A typed value produced by a coercion chain
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Key was not present (double-null fields only)
    Absent,
    Null,
    /// Scalar or pass-through value
    Scalar(Value),
    /// Parsed enum value
    Enum { enum_name: String, variant: String },
    List(Vec<Coerced>),
    /// Built input record, fields in declaration order
    Record {
        record: QualifiedName,
        fields: Vec<(String, Coerced)>,
    },
    /// The double-null box
    Present(Box<Coerced>),
}

impl Coerced {
    /// Field of a record value
    pub fn field(&self, name: &str) -> Option<&Coerced> {
        match self {
            Coerced::Record { fields, .. } => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct RecordBuilder {
    record: QualifiedName,
    fields: Vec<FieldCoercion>,
}

/// Input record parse functions by name
#[derive(Debug, Clone, Default)]
pub struct CoercionRegistry {
    builders: HashMap<QualifiedName, RecordBuilder>,
}

impl CoercionRegistry {
    /// Collect every record-building function from a set of artifacts
    pub fn from_artifacts<'a>(artifacts: impl IntoIterator<Item = &'a ArtifactDescriptor>) -> Self {
        let mut builders = HashMap::new();
        for artifact in artifacts {
            if let Some((_, _, FunctionBody::BuildRecord { record, fields })) = artifact.function() {
                builders.insert(
                    artifact.name.clone(),
                    RecordBuilder {
                        record: record.clone(),
                        fields: fields.clone(),
                    },
                );
            }
        }
        Self { builders }
    }

    /// Run the parse function `builder` on a raw object
    pub fn build(&self, builder: &QualifiedName, input: &Value) -> Result<Coerced, CoercionError> {
        self.build_at(builder, input, "$")
    }

    fn build_at(
        &self,
        builder: &QualifiedName,
        input: &Value,
        path: &str,
    ) -> Result<Coerced, CoercionError> {
        let recipe = self
            .builders
            .get(builder)
            .ok_or_else(|| CoercionError::MalformedInputShape {
                path: path.to_string(),
                expected: format!("input accepted by `{builder}`"),
                found: "no such parse function".to_string(),
            })?;

        let Value::Object(entries) = input else {
            return Err(malformed(path, "object", input));
        };

        if let Some(unknown) = entries.keys().find(|k| !recipe.fields.iter().any(|f| &f.key == *k)) {
            return Err(CoercionError::MalformedInputShape {
                path: format!("{path}.{unknown}"),
                expected: format!("a field of `{}`", recipe.record),
                found: "unknown field".to_string(),
            });
        }

        let mut fields = Vec::with_capacity(recipe.fields.len());
        for field in &recipe.fields {
            let field_path = format!("{path}.{}", field.key);
            let value = evaluate_at(&field.chain, entries.get(&field.key), self, &field_path)?;
            fields.push((field.key.clone(), value));
        }

        Ok(Coerced::Record {
            record: recipe.record.clone(),
            fields,
        })
    }
}

/// Run a chain on a raw value. `None` means the key was absent.
pub fn evaluate(
    chain: &CoercionChain,
    input: Option<&Value>,
    registry: &CoercionRegistry,
) -> Result<Coerced, CoercionError> {
    evaluate_at(chain, input, registry, "$")
}

/// Run a chain on the entries of a raw argument object, one chain per key
pub fn evaluate_object(
    fields: &[FieldCoercion],
    input: &BTreeMap<String, Value>,
    registry: &CoercionRegistry,
) -> Result<Vec<(String, Coerced)>, CoercionError> {
    fields
        .iter()
        .map(|field| {
            let path = format!("$.{}", field.key);
            evaluate_at(&field.chain, input.get(&field.key), registry, &path)
                .map(|value| (field.key.clone(), value))
        })
        .collect()
}

fn evaluate_at(
    chain: &CoercionChain,
    input: Option<&Value>,
    registry: &CoercionRegistry,
    path: &str,
) -> Result<Coerced, CoercionError> {
    match (chain.presence, input) {
        (Presence::Boxed, None) => Ok(Coerced::Absent),
        (Presence::Boxed, Some(value)) => {
            let inner = apply(&chain.steps, value, registry, path)?;
            Ok(Coerced::Present(Box::new(inner)))
        }
        (Presence::Plain, value) => apply(&chain.steps, value.unwrap_or(&Value::Null), registry, path),
    }
}

/// Apply the outermost step of `steps`, which defers to the rest
fn apply(
    steps: &[CoercionStep],
    value: &Value,
    registry: &CoercionRegistry,
    path: &str,
) -> Result<Coerced, CoercionError> {
    let Some((step, inner)) = steps.split_last() else {
        return Ok(Coerced::Scalar(value.clone()));
    };

    match step {
        CoercionStep::NonNull => {
            if value.is_null() {
                return Err(malformed(path, "non-null value", value));
            }
            apply(inner, value, registry, path)
        }
        CoercionStep::MapList { nullable, .. } => match value {
            Value::Null if *nullable => Ok(Coerced::Null),
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| apply(inner, item, registry, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Coerced::List),
            other => Err(malformed(path, "list", other)),
        },
        CoercionStep::Cast {
            shape, nullable, ..
        } => match value {
            Value::Null if *nullable => Ok(Coerced::Null),
            Value::Null => Err(malformed(path, "non-null value", value)),
            other if shape.accepts(other) => Ok(Coerced::Scalar(other.clone())),
            other => Err(malformed(path, &shape.describe(), other)),
        },
        CoercionStep::ParseEnum {
            enum_name,
            values,
            nullable,
            ..
        } => match value {
            Value::Null if *nullable => Ok(Coerced::Null),
            Value::Null => Err(malformed(path, "non-null value", value)),
            Value::String(s) | Value::Enum(s) => {
                if values.iter().any(|v| v == s) {
                    Ok(Coerced::Enum {
                        enum_name: enum_name.clone(),
                        variant: s.clone(),
                    })
                } else {
                    Err(CoercionError::UnknownEnumValue {
                        enum_name: enum_name.clone(),
                        value: s.clone(),
                    })
                }
            }
            other => Err(malformed(path, "enum value", other)),
        },
        CoercionStep::BuildInput {
            builder, nullable, ..
        } => match value {
            Value::Null if *nullable => Ok(Coerced::Null),
            Value::Null => Err(malformed(path, "non-null value", value)),
            other => registry.build_at(builder, other, path),
        },
    }
}

fn malformed(path: &str, expected: &str, found: &Value) -> CoercionError {
    CoercionError::MalformedInputShape {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::ScalarShape;
    use crate::types::{BaseType, TargetType};

    fn color() -> CoercionStep {
        CoercionStep::ParseEnum {
            enum_name: "Color".into(),
            target: BaseType::Unknown,
            values: vec!["RED".into(), "BLUE".into()],
            nullable: true,
        }
    }

    fn chain(steps: Vec<CoercionStep>, presence: Presence) -> CoercionChain {
        CoercionChain {
            steps,
            presence,
            target: TargetType::optional(BaseType::Unknown),
        }
    }

    #[test]
    fn test_apply_nested_list() {
        let chain = chain(
            vec![
                color(),
                CoercionStep::MapList {
                    nullable: false,
                    elements_nullable: true,
                },
                CoercionStep::NonNull,
            ],
            Presence::Plain,
        );
        let registry = CoercionRegistry::default();
        let input = Value::List(vec![Value::string("RED"), Value::Null]);

        let out = evaluate(&chain, Some(&input), &registry).unwrap();
        assert_eq!(
            out,
            Coerced::List(vec![
                Coerced::Enum {
                    enum_name: "Color".into(),
                    variant: "RED".into()
                },
                Coerced::Null,
            ])
        );

        let err = evaluate(&chain, Some(&Value::Null), &registry).unwrap_err();
        assert!(matches!(err, CoercionError::MalformedInputShape { ref path, .. } if path == "$"));
    }

    #[test]
    fn test_wrong_element_shape_reports_path() {
        let chain = chain(
            vec![
                CoercionStep::Cast {
                    target: BaseType::Builtin("i32".into()),
                    shape: ScalarShape::for_scalar("Int"),
                    nullable: false,
                },
                CoercionStep::NonNull,
                CoercionStep::MapList {
                    nullable: true,
                    elements_nullable: false,
                },
            ],
            Presence::Plain,
        );
        let input = Value::List(vec![Value::Int(1), Value::string("two")]);
        let err = evaluate(&chain, Some(&input), &CoercionRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            CoercionError::MalformedInputShape {
                path: "$[1]".into(),
                expected: format!("int in {}..={}", i32::MIN, i32::MAX),
                found: "string".into(),
            }
        );
    }

    #[test]
    fn test_unknown_enum_value() {
        let chain = chain(vec![color()], Presence::Plain);
        let err = evaluate(&chain, Some(&Value::string("PINK")), &CoercionRegistry::default())
            .unwrap_err();
        assert_eq!(
            err,
            CoercionError::UnknownEnumValue {
                enum_name: "Color".into(),
                value: "PINK".into()
            }
        );
    }

    #[test]
    fn test_boxed_presence() {
        let chain = chain(
            vec![CoercionStep::Cast {
                target: BaseType::Builtin("String".into()),
                shape: ScalarShape::String,
                nullable: true,
            }],
            Presence::Boxed,
        );
        let registry = CoercionRegistry::default();

        assert_eq!(evaluate(&chain, None, &registry).unwrap(), Coerced::Absent);
        assert_eq!(
            evaluate(&chain, Some(&Value::Null), &registry).unwrap(),
            Coerced::Present(Box::new(Coerced::Null))
        );
        assert_eq!(
            evaluate(&chain, Some(&Value::string("x")), &registry).unwrap(),
            Coerced::Present(Box::new(Coerced::Scalar(Value::string("x"))))
        );
    }

    #[test]
    fn test_missing_builder_is_malformed() {
        let registry = CoercionRegistry::default();
        let err = registry
            .build(&QualifiedName::new("gen.inputs", "parse_nothing"), &Value::object::<_, String>([]))
            .unwrap_err();
        assert!(matches!(err, CoercionError::MalformedInputShape { .. }));
    }
}
