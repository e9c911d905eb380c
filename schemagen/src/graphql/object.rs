//! Output record generation

use crate::artifact::{ArtifactDescriptor, ArtifactKind, Member};
use crate::error::GenerationError;
use crate::generator::GenerationContext;
use crate::ir::{RecordType, TypeKind};
use crate::naming::NamingKey;
use crate::policy::{Policy, field_path};

/// Generate a record artifact for an output record.
///
/// Every field is included, including those served by a resolver, so the
/// record can carry whatever data its resolvers start from.
pub fn generate(
    ctx: &GenerationContext<'_>,
    object: &RecordType,
) -> Result<ArtifactDescriptor, GenerationError> {
    let name = ctx.name(&NamingKey::type_name(TypeKind::OutputRecord, &object.name))?;

    let mut fields = Vec::with_capacity(object.fields.len());
    for field in &object.fields {
        let node = field_path(&object.name, &field.name);
        let policy = Policy::for_field(&object.name, field, ctx.config.generate_all)?;
        let ty = ctx.resolver.resolve(&node, &field.ty, Some(&policy))?;
        fields.push(Member::Field {
            name: field.name.clone(),
            ty,
        });
    }

    Ok(ArtifactDescriptor::new(name, ArtifactKind::Record, &object.name).with_members(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::{Field, NamedType, Schema, TypeRef};
    use crate::naming::Namer;
    use crate::types::{BaseType, TargetType};

    #[test]
    fn test_self_reference_resolves_to_generated_name() {
        let user = RecordType::new("User")
            .with_field(Field::new("id", TypeRef::named("ID").non_null()))
            .with_field(Field::new("friends", TypeRef::named("User").non_null().list()));
        let schema = Schema::new().with_type(NamedType::OutputRecord(user.clone()));
        let config = GeneratorConfig::new().generate_all(true);
        let namer = Namer::new(&config);
        let ctx = GenerationContext::new(&schema, &config, &namer);

        let artifact = generate(&ctx, &user).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Record);
        assert_eq!(
            artifact.members[0],
            Member::Field {
                name: "id".into(),
                ty: TargetType::required(BaseType::Builtin("String".into())),
            }
        );
        assert_eq!(
            artifact.members[1],
            Member::Field {
                name: "friends".into(),
                ty: TargetType::required(BaseType::Generated(artifact.name.clone())).list_of(true),
            }
        );
    }
}
