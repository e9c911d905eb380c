//! Field resolver contract generation
//!
//! A resolver contract is an interface with a single `resolve` method that
//! takes the resolver environment (source object, parsed arguments, request
//! context). Fields with arguments also get an arguments record and a parse
//! function coercing each argument from the raw argument object.

use crate::artifact::{ArtifactDescriptor, ArtifactKind, FieldCoercion, FunctionBody, Member, Param};
use crate::error::GenerationError;
use crate::generator::GenerationContext;
use crate::ir::{Field, RecordType};
use crate::naming::{NameRole, NamingKey};
use crate::policy::{Policy, argument_path, field_path};
use crate::types::{BaseType, TargetType};

/// Name of the single method on every resolver contract
pub const RESOLVE_METHOD: &str = "resolve";

/// Generate the resolver contract (and argument artifacts) for a field
pub fn generate(
    ctx: &GenerationContext<'_>,
    container: &RecordType,
    field: &Field,
    policy: &Policy,
) -> Result<Vec<ArtifactDescriptor>, GenerationError> {
    let node = field_path(&container.name, &field.name);
    let mut artifacts = Vec::new();

    let args = arguments(ctx, container, field, &mut artifacts)?;
    let returns = ctx.resolver.resolve(&node, &field.ty, Some(policy))?;
    artifacts.push(contract(ctx, container, field, args, returns)?);

    Ok(artifacts)
}

/// Emit the arguments record and its parse function, returning the type the
/// resolver environment carries for arguments (`()` when there are none)
pub(crate) fn arguments(
    ctx: &GenerationContext<'_>,
    container: &RecordType,
    field: &Field,
    out: &mut Vec<ArtifactDescriptor>,
) -> Result<TargetType, GenerationError> {
    if field.arguments.is_empty() {
        return Ok(unit());
    }

    let node = field_path(&container.name, &field.name);
    let record_name = ctx.name(&NamingKey::for_field(
        NameRole::FieldArguments,
        &container.name,
        &field.name,
    ))?;
    let parser_name = ctx.name(&NamingKey::for_field(
        NameRole::ArgumentParser,
        &container.name,
        &field.name,
    ))?;

    let mut members = Vec::with_capacity(field.arguments.len());
    let mut coercions = Vec::with_capacity(field.arguments.len());
    for argument in &field.arguments {
        let arg_node = argument_path(&container.name, &field.name, &argument.name);
        let policy = Policy::for_argument(&container.name, &field.name, argument)?;
        let chain = ctx.synthesizer.synthesize(&arg_node, &argument.ty, Some(&policy))?;

        members.push(Member::Field {
            name: argument.name.clone(),
            ty: chain.target.clone(),
        });
        coercions.push(FieldCoercion {
            key: argument.name.clone(),
            chain,
        });
    }

    out.push(ArtifactDescriptor::new(record_name.clone(), ArtifactKind::Record, &node).with_members(members));
    out.push(
        ArtifactDescriptor::new(parser_name, ArtifactKind::Function, &node).with_member(Member::Function {
            params: vec![Param::new("args", TargetType::required(BaseType::Unknown))],
            returns: TargetType::required(BaseType::Generated(record_name.clone())),
            body: FunctionBody::BuildRecord {
                record: record_name.clone(),
                fields: coercions,
            },
        }),
    );

    Ok(TargetType::required(BaseType::Generated(record_name)))
}

/// The resolver contract itself
pub(crate) fn contract(
    ctx: &GenerationContext<'_>,
    container: &RecordType,
    field: &Field,
    args: TargetType,
    returns: TargetType,
) -> Result<ArtifactDescriptor, GenerationError> {
    let node = field_path(&container.name, &field.name);
    let name = ctx.name(&NamingKey::for_field(
        NameRole::FieldResolver,
        &container.name,
        &field.name,
    ))?;
    let env = ctx.name(&NamingKey::fixed(NameRole::EnvironmentWrapper))?;
    let source = TargetType::required(ctx.resolver.resolve_base(&node, &container.name)?);

    let env_ty = TargetType::required(BaseType::Instance {
        name: env,
        args: vec![source, args],
    });

    Ok(
        ArtifactDescriptor::new(name, ArtifactKind::Interface, node).with_member(Member::Method {
            name: RESOLVE_METHOD.to_string(),
            params: vec![Param::new("env", env_ty)],
            returns,
        }),
    )
}

pub(crate) fn unit() -> TargetType {
    TargetType::required(BaseType::Builtin("()".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::{Argument, Directive, EnumType, NamedType, Schema, TypeRef};
    use crate::naming::Namer;
    use crate::policy::RESOLVER;

    fn query() -> RecordType {
        RecordType::new("Query")
            .with_field(
                Field::new("users", TypeRef::named("User").non_null().list().non_null())
                    .with_argument(Argument::new("role", TypeRef::named("Role").non_null()))
                    .with_argument(Argument::new("limit", TypeRef::named("Int")))
                    .with_directive(Directive::new(RESOLVER)),
            )
            .with_field(Field::new("version", TypeRef::named("String").non_null()))
    }

    fn schema() -> Schema {
        Schema::new()
            .with_type(EnumType::new("Role", ["ADMIN", "MEMBER"]))
            .with_type(NamedType::OutputRecord(RecordType::new("User")))
            .with_type(NamedType::OutputRecord(query()))
    }

    #[test]
    fn test_resolver_with_arguments() {
        let schema = schema();
        let config = GeneratorConfig::new();
        let namer = Namer::new(&config);
        let ctx = GenerationContext::new(&schema, &config, &namer);
        let query = query();
        let field = &query.fields[0];
        let policy = Policy::for_field("Query", field, false).unwrap();

        let artifacts = generate(&ctx, &query, field, &policy).unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.name.identifier.as_str()).collect();
        assert_eq!(names, ["QueryUsersArgs", "parse_query_users_args", "QueryUsersResolver"]);
        assert!(artifacts.iter().all(|a| a.origin == "Query.users"));

        let contract = &artifacts[2];
        assert_eq!(contract.kind, ArtifactKind::Interface);
        let Member::Method { name, params, returns } = &contract.members[0] else {
            panic!("contract has no method");
        };
        assert_eq!(name, RESOLVE_METHOD);
        assert_eq!(params[0].name, "env");
        // User is not generated, so list elements fall back to Unknown
        assert_eq!(returns.base, BaseType::Unknown);

        let BaseType::Instance { name: env, args } = &params[0].ty.base else {
            panic!("env parameter is not an instance");
        };
        assert_eq!(env.identifier, "ResolverEnv");
        assert_eq!(args[1], TargetType::required(BaseType::Generated(artifacts[0].name.clone())));
    }

    #[test]
    fn test_resolver_without_arguments_uses_unit() {
        let schema = schema();
        let config = GeneratorConfig::new().generate_all(true);
        let namer = Namer::new(&config);
        let ctx = GenerationContext::new(&schema, &config, &namer);
        let query = query();
        let field = &query.fields[1];
        let policy = Policy::for_field("Query", field, true).unwrap();

        let artifacts = generate(&ctx, &query, field, &policy).unwrap();
        assert_eq!(artifacts.len(), 1);
        let Member::Method { params, .. } = &artifacts[0].members[0] else {
            panic!("contract has no method");
        };
        let BaseType::Instance { args, .. } = &params[0].ty.base else {
            panic!("env parameter is not an instance");
        };
        assert_eq!(args[1], unit());
        assert!(matches!(args[0].base, BaseType::Generated(ref n) if n.identifier == "Query"));
    }
}
