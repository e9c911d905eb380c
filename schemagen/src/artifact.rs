//! Artifact descriptors
//!
//! An artifact is one generated unit (record, enum, interface or function)
//! described as data. Descriptors carry every decision an emitter needs:
//! resolved types, member lists and function bodies as coercion plans.

use crate::coercion::{CoercionChain, CoercionStep};
use crate::naming::QualifiedName;
use crate::types::{BaseType, TargetType};
use std::collections::BTreeSet;

/// Kind of generated unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Enum,
    Record,
    Interface,
    Function,
}

/// A generated unit, ready for emission
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDescriptor {
    /// Qualified name of the artifact
    pub name: QualifiedName,

    /// Kind of unit
    pub kind: ArtifactKind,

    /// Members in emission order
    pub members: Vec<Member>,

    /// Schema node the artifact was generated from (empty for fixed artifacts)
    pub origin: String,
}

impl ArtifactDescriptor {
    pub fn new(name: QualifiedName, kind: ArtifactKind, origin: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            members: Vec::new(),
            origin: origin.into(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_members(mut self, members: impl IntoIterator<Item = Member>) -> Self {
        self.members.extend(members);
        self
    }

    /// Generic parameters declared by the artifact
    pub fn type_params(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| match m {
            Member::TypeParam { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// The function definition, for `Function` artifacts
    pub fn function(&self) -> Option<(&[Param], &TargetType, &FunctionBody)> {
        self.members.iter().find_map(|m| match m {
            Member::Function {
                params,
                returns,
                body,
            } => Some((params.as_slice(), returns, body)),
            _ => None,
        })
    }

    /// Every generated artifact name this artifact refers to
    pub fn references(&self) -> BTreeSet<QualifiedName> {
        let mut out = BTreeSet::new();
        for member in &self.members {
            match member {
                Member::Variant { .. } | Member::TypeParam { .. } => {}
                Member::Field { ty, .. } => collect_type(ty, &mut out),
                Member::Method {
                    params, returns, ..
                } => {
                    params.iter().for_each(|p| collect_type(&p.ty, &mut out));
                    collect_type(returns, &mut out);
                }
                Member::Function {
                    params,
                    returns,
                    body,
                } => {
                    params.iter().for_each(|p| collect_type(&p.ty, &mut out));
                    collect_type(returns, &mut out);
                    collect_body(body, &mut out);
                }
            }
        }
        out
    }
}

fn collect_body(body: &FunctionBody, out: &mut BTreeSet<QualifiedName>) {
    match body {
        FunctionBody::BuildRecord { record, fields } => {
            out.insert(record.clone());
            for field in fields {
                collect_type(&field.chain.target, out);
                for step in &field.chain.steps {
                    match step {
                        CoercionStep::BuildInput { builder, .. } => {
                            out.insert(builder.clone());
                        }
                        CoercionStep::Cast { target, .. } | CoercionStep::ParseEnum { target, .. } => {
                            collect_base(target, out);
                        }
                        CoercionStep::NonNull | CoercionStep::MapList { .. } => {}
                    }
                }
            }
        }
        FunctionBody::BuildConnection {
            node,
            edge,
            connection,
            page_info,
        } => {
            collect_type(node, out);
            out.extend([edge.clone(), connection.clone(), page_info.clone()]);
        }
    }
}

fn collect_type(ty: &TargetType, out: &mut BTreeSet<QualifiedName>) {
    collect_base(&ty.base, out);
}

fn collect_base(base: &BaseType, out: &mut BTreeSet<QualifiedName>) {
    match base {
        BaseType::Generated(name) => {
            out.insert(name.clone());
        }
        BaseType::Instance { name, args } => {
            out.insert(name.clone());
            args.iter().for_each(|a| collect_type(a, out));
        }
        BaseType::Builtin(_) | BaseType::External(_) | BaseType::Unknown | BaseType::Param(_) => {}
    }
}

/// A member of an artifact
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// Enum value, as written in the schema
    Variant { name: String },

    /// Record field or interface getter, named as in the schema
    Field { name: String, ty: TargetType },

    /// Generic type parameter
    TypeParam { name: String },

    /// Interface method
    Method {
        name: String,
        params: Vec<Param>,
        returns: TargetType,
    },

    /// Function signature and body (one per `Function` artifact)
    Function {
        params: Vec<Param>,
        returns: TargetType,
        body: FunctionBody,
    },
}

/// A named, typed parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TargetType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TargetType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Function bodies as data
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    /// Build a record from a raw object, one coercion chain per field
    BuildRecord {
        record: QualifiedName,
        fields: Vec<FieldCoercion>,
    },

    /// Turn a page of results into a connection. The function also takes a
    /// cursor function for nodes after the listed parameters.
    BuildConnection {
        node: TargetType,
        edge: QualifiedName,
        connection: QualifiedName,
        page_info: QualifiedName,
    },
}

/// Coercion of one key of a raw object into one record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCoercion {
    /// Key in the raw input object
    pub key: String,

    /// Chain converting the value under `key`
    pub chain: CoercionChain,
}
