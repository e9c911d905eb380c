//! Run-wide support types, emitted exactly once per run
//!
//! - `Present<T>`: one-field box separating explicit null from absent
//! - `ResolverEnv<S, A>`: what every resolver receives (source, arguments,
//!   request context)

use crate::artifact::{ArtifactDescriptor, ArtifactKind, Member};
use crate::error::GenerationError;
use crate::generator::GenerationContext;
use crate::naming::{NameRole, NamingKey};
use crate::types::{BaseType, TargetType};

pub fn value_box(ctx: &GenerationContext<'_>) -> Result<ArtifactDescriptor, GenerationError> {
    let name = ctx.name(&NamingKey::fixed(NameRole::ValueBox))?;
    Ok(ArtifactDescriptor::new(name, ArtifactKind::Record, "").with_members([
        Member::TypeParam {
            name: "T".to_string(),
        },
        Member::Field {
            name: "value".to_string(),
            ty: TargetType::required(BaseType::Param("T".to_string())),
        },
    ]))
}

pub fn environment_wrapper(
    ctx: &GenerationContext<'_>,
) -> Result<ArtifactDescriptor, GenerationError> {
    let name = ctx.name(&NamingKey::fixed(NameRole::EnvironmentWrapper))?;
    let context = match ctx.config.global_context_type.as_deref() {
        Some(ty) => BaseType::External(ty.to_string()),
        None => BaseType::Builtin("()".to_string()),
    };

    Ok(ArtifactDescriptor::new(name, ArtifactKind::Record, "").with_members([
        Member::TypeParam {
            name: "S".to_string(),
        },
        Member::TypeParam {
            name: "A".to_string(),
        },
        Member::Field {
            name: "source".to_string(),
            ty: TargetType::required(BaseType::Param("S".to_string())),
        },
        Member::Field {
            name: "args".to_string(),
            ty: TargetType::required(BaseType::Param("A".to_string())),
        },
        Member::Field {
            name: "context".to_string(),
            ty: TargetType::required(context),
        },
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::Schema;
    use crate::naming::Namer;

    #[test]
    fn test_environment_carries_configured_context() {
        let schema = Schema::new();
        let config = GeneratorConfig::new().global_context_type("crate::AppContext");
        let namer = Namer::new(&config);
        let ctx = GenerationContext::new(&schema, &config, &namer);

        let env = environment_wrapper(&ctx).unwrap();
        assert_eq!(env.type_params().collect::<Vec<_>>(), ["S", "A"]);
        assert_eq!(
            env.members.last(),
            Some(&Member::Field {
                name: "context".into(),
                ty: TargetType::required(BaseType::External("crate::AppContext".into())),
            })
        );

        let boxed = value_box(&ctx).unwrap();
        assert_eq!(boxed.name.to_string(), "generated.runtime.Present");
        assert_eq!(boxed.type_params().collect::<Vec<_>>(), ["T"]);
    }
}
