//! Interface generation
//!
//! Generated interfaces become contracts with one getter per field. Values of
//! interface type still resolve to the fallback type unless represented.

use crate::artifact::{ArtifactDescriptor, ArtifactKind, Member};
use crate::error::GenerationError;
use crate::generator::GenerationContext;
use crate::ir::{RecordType, TypeKind};
use crate::naming::NamingKey;
use crate::policy::{Policy, field_path};

pub fn generate(
    ctx: &GenerationContext<'_>,
    interface: &RecordType,
) -> Result<ArtifactDescriptor, GenerationError> {
    let name = ctx.name(&NamingKey::type_name(TypeKind::Interface, &interface.name))?;

    let mut getters = Vec::with_capacity(interface.fields.len());
    for field in &interface.fields {
        let node = field_path(&interface.name, &field.name);
        let policy = Policy::for_field(&interface.name, field, ctx.config.generate_all)?;
        getters.push(Member::Method {
            name: field.name.clone(),
            params: Vec::new(),
            returns: ctx.resolver.resolve(&node, &field.ty, Some(&policy))?,
        });
    }

    Ok(ArtifactDescriptor::new(name, ArtifactKind::Interface, &interface.name).with_members(getters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::{Field, NamedType, Schema, TypeRef};
    use crate::naming::Namer;

    #[test]
    fn test_interface_has_getter_per_field() {
        let node = RecordType::new("Node")
            .with_field(Field::new("id", TypeRef::named("ID").non_null()))
            .with_field(Field::new("tags", TypeRef::named("String").list()));
        let schema = Schema::new().with_type(NamedType::Interface(node.clone()));
        let config = GeneratorConfig::new();
        let namer = Namer::new(&config);
        let ctx = GenerationContext::new(&schema, &config, &namer);

        let artifact = generate(&ctx, &node).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Interface);
        assert_eq!(artifact.name.to_string(), "generated.interfaces.Node");
        assert!(matches!(
            &artifact.members[1],
            Member::Method { name, params, .. } if name == "tags" && params.is_empty()
        ));
    }
}
