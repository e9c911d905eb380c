//! Enum artifact generation
//!
//! Variants keep their schema spelling; the emitter derives identifiers and
//! the parse-by-name table from them.

use crate::artifact::{ArtifactDescriptor, ArtifactKind, Member};
use crate::error::GenerationError;
use crate::generator::GenerationContext;
use crate::ir::{EnumType, TypeKind};
use crate::naming::NamingKey;

/// Generate the enum artifact for a schema enum
pub fn generate(
    ctx: &GenerationContext<'_>,
    enum_type: &EnumType,
) -> Result<ArtifactDescriptor, GenerationError> {
    let name = ctx.name(&NamingKey::type_name(TypeKind::Enum, &enum_type.name))?;
    let variants = enum_type
        .values
        .iter()
        .map(|value| Member::Variant { name: value.clone() });

    Ok(ArtifactDescriptor::new(name, ArtifactKind::Enum, &enum_type.name).with_members(variants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::Schema;
    use crate::naming::Namer;

    #[test]
    fn test_generate_enum_keeps_declaration_order() {
        let color = EnumType::new("Color", ["RED", "GREEN", "BLUE"]);
        let schema = Schema::new().with_type(color.clone());
        let config = GeneratorConfig::new().name_prefix("X");
        let namer = Namer::new(&config);
        let ctx = GenerationContext::new(&schema, &config, &namer);

        let artifact = generate(&ctx, &color).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Enum);
        assert_eq!(artifact.name.identifier, "XColor");
        assert_eq!(artifact.origin, "Color");
        let names: Vec<_> = artifact
            .members
            .iter()
            .map(|m| match m {
                Member::Variant { name } => name.as_str(),
                other => panic!("unexpected member {other:?}"),
            })
            .collect();
        assert_eq!(names, ["RED", "GREEN", "BLUE"]);
    }
}
