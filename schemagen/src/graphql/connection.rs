//! Paginated field resolver generation
//!
//! A paginated list field `Container.field: [T]` yields:
//! - `ContainerFieldPage` holding the rows and has-previous/has-next flags
//! - `ContainerFieldEdge` and `ContainerFieldConnection`
//! - a builder function turning a page into a connection
//! - the resolver contract, which returns the page
//!
//! `PageInfo` is shared and emitted once per run by the orchestrator.

use super::resolver;
use crate::artifact::{ArtifactDescriptor, ArtifactKind, FunctionBody, Member, Param};
use crate::error::GenerationError;
use crate::generator::GenerationContext;
use crate::ir::{Field, RecordType};
use crate::naming::{NameRole, NamingKey};
use crate::policy::{Policy, field_path};
use crate::types::{BaseType, TargetType, WrapperKind};

/// Generate the paginated resolver artifacts for a list field
pub fn generate(
    ctx: &GenerationContext<'_>,
    container: &RecordType,
    field: &Field,
    policy: &Policy,
) -> Result<Vec<ArtifactDescriptor>, GenerationError> {
    let node = field_path(&container.name, &field.name);
    let list = ctx.resolver.resolve(&node, &field.ty, None)?;
    let element = element_type(&list).ok_or_else(|| {
        GenerationError::invalid_argument(&node, crate::policy::PAGINATION, "-", "field is not a list")
    })?;
    tracing::trace!(field = %node, node_type = %element, double_null = policy.double_null, "paginated field");

    let key = |role| NamingKey::for_field(role, &container.name, &field.name);
    let page_name = ctx.name(&key(NameRole::PaginationResult))?;
    let edge_name = ctx.name(&key(NameRole::PaginationEdge))?;
    let connection_name = ctx.name(&key(NameRole::PaginationConnection))?;
    let builder_name = ctx.name(&key(NameRole::ConnectionBuilder))?;
    let page_info_name = ctx.name(&NamingKey::fixed(NameRole::PageInfo))?;

    let boolean = || TargetType::required(BaseType::Builtin("bool".to_string()));
    let page_ty = TargetType::required(BaseType::Generated(page_name.clone()));

    let page = ArtifactDescriptor::new(page_name, ArtifactKind::Record, &node).with_members([
        Member::Field {
            name: "data".to_string(),
            ty: element.clone().list_of(false),
        },
        Member::Field {
            name: "hasPreviousPage".to_string(),
            ty: boolean(),
        },
        Member::Field {
            name: "hasNextPage".to_string(),
            ty: boolean(),
        },
    ]);

    let edge = ArtifactDescriptor::new(edge_name.clone(), ArtifactKind::Record, &node).with_members([
        Member::Field {
            name: "node".to_string(),
            ty: element.clone(),
        },
        Member::Field {
            name: "cursor".to_string(),
            ty: TargetType::required(BaseType::Builtin("String".to_string())),
        },
    ]);

    let connection =
        ArtifactDescriptor::new(connection_name.clone(), ArtifactKind::Record, &node).with_members([
            Member::Field {
                name: "edges".to_string(),
                ty: TargetType::required(BaseType::Generated(edge_name.clone())).list_of(false),
            },
            Member::Field {
                name: "pageInfo".to_string(),
                ty: TargetType::required(BaseType::Generated(page_info_name.clone())),
            },
        ]);

    let builder = ArtifactDescriptor::new(builder_name, ArtifactKind::Function, &node).with_member(
        Member::Function {
            params: vec![Param::new("page", page_ty.clone())],
            returns: TargetType::required(BaseType::Generated(connection_name.clone())),
            body: FunctionBody::BuildConnection {
                node: element,
                edge: edge_name,
                connection: connection_name,
                page_info: page_info_name,
            },
        },
    );

    let mut artifacts = vec![page, edge, connection, builder];
    let args = resolver::arguments(ctx, container, field, &mut artifacts)?;
    artifacts.push(resolver::contract(ctx, container, field, args, page_ty)?);
    Ok(artifacts)
}

/// The shared `PageInfo` record
pub fn page_info(ctx: &GenerationContext<'_>) -> Result<ArtifactDescriptor, GenerationError> {
    let name = ctx.name(&NamingKey::fixed(NameRole::PageInfo))?;
    let boolean = || TargetType::required(BaseType::Builtin("bool".to_string()));
    let cursor = || TargetType::optional(BaseType::Builtin("String".to_string()));

    Ok(ArtifactDescriptor::new(name, ArtifactKind::Record, "").with_members([
        Member::Field {
            name: "hasNextPage".to_string(),
            ty: boolean(),
        },
        Member::Field {
            name: "hasPreviousPage".to_string(),
            ty: boolean(),
        },
        Member::Field {
            name: "startCursor".to_string(),
            ty: cursor(),
        },
        Member::Field {
            name: "endCursor".to_string(),
            ty: cursor(),
        },
    ]))
}

/// Element type of a resolved list type
fn element_type(list: &TargetType) -> Option<TargetType> {
    let (outer, inner) = list.wrapping.split_first()?;
    if outer.kind != WrapperKind::List {
        return None;
    }
    Some(TargetType {
        base: list.base.clone(),
        nullable: list.nullable,
        wrapping: inner.to_vec(),
    })
}
