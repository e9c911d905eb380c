//! Input record generation
//!
//! Each input record yields two artifacts:
//! - the record itself, one field per schema field
//! - a `parse_*` function building the record from an untyped object, with
//!   one coercion chain per field

use crate::artifact::{ArtifactDescriptor, ArtifactKind, FieldCoercion, FunctionBody, Member, Param};
use crate::error::GenerationError;
use crate::generator::GenerationContext;
use crate::ir::{RecordType, TypeKind};
use crate::naming::{NameRole, NamingKey};
use crate::policy::{Policy, field_path};
use crate::types::{BaseType, TargetType};

/// Generate the record and parse function for an input record
pub fn generate(
    ctx: &GenerationContext<'_>,
    input: &RecordType,
) -> Result<Vec<ArtifactDescriptor>, GenerationError> {
    let record_name = ctx.name(&NamingKey::type_name(TypeKind::InputRecord, &input.name))?;
    let parser_name = ctx.name(&NamingKey::for_type(NameRole::InputParser, &input.name))?;

    let mut fields = Vec::with_capacity(input.fields.len());
    let mut coercions = Vec::with_capacity(input.fields.len());

    for field in &input.fields {
        let node = field_path(&input.name, &field.name);
        let policy = Policy::for_field(&input.name, field, ctx.config.generate_all)?;
        let chain = ctx.synthesizer.synthesize(&node, &field.ty, Some(&policy))?;

        fields.push(Member::Field {
            name: field.name.clone(),
            ty: chain.target.clone(),
        });
        coercions.push(FieldCoercion {
            key: field.name.clone(),
            chain,
        });
    }

    let record = ArtifactDescriptor::new(record_name.clone(), ArtifactKind::Record, &input.name)
        .with_members(fields);

    let parser = ArtifactDescriptor::new(parser_name, ArtifactKind::Function, &input.name)
        .with_member(Member::Function {
            params: vec![Param::new("value", TargetType::required(BaseType::Unknown))],
            returns: TargetType::required(BaseType::Generated(record_name.clone())),
            body: FunctionBody::BuildRecord {
                record: record_name,
                fields: coercions,
            },
        });

    Ok(vec![record, parser])
}
