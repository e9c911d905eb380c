//! Code generation orchestration
//!
//! This module walks the type graph once, resolves the policy of every node
//! and hands the selected nodes to the per-artifact generators in
//! `crate::graphql`. Order is fixed: enums, input records, output records
//! (each followed by its field resolvers), interfaces, then the run-wide
//! support artifacts.
//!
//! Enums and input records are also emitted when not selected themselves
//! but referenced from an emitted artifact, so every generated name in the
//! output resolves to an artifact in the same output.

use crate::artifact::ArtifactDescriptor;
use crate::coercion::Synthesizer;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::graphql::{connection, enum_gen, input, interface, object, resolver, support};
use crate::ir::{NamedType, Schema, TypeKind};
use crate::naming::{NameRole, Namer, NamingKey, QualifiedName};
use crate::policy::Policy;
use crate::types::TypeResolver;
use std::collections::{BTreeSet, HashMap};

/// Shared, read-only state handed to every generator
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub schema: &'a Schema,
    pub config: &'a GeneratorConfig,
    pub namer: &'a Namer,
    pub resolver: TypeResolver<'a>,
    pub synthesizer: Synthesizer<'a>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(schema: &'a Schema, config: &'a GeneratorConfig, namer: &'a Namer) -> Self {
        let resolver = TypeResolver::new(schema, config, namer);
        Self {
            schema,
            config,
            namer,
            resolver,
            synthesizer: Synthesizer::new(schema, resolver, namer),
        }
    }

    /// Name an artifact through the run's naming engine
    pub fn name(&self, key: &NamingKey) -> Result<QualifiedName, GenerationError> {
        self.namer.name(key)
    }
}

/// Entry point for a generation run
#[derive(Debug, Clone, Copy, Default)]
pub struct Orchestrator;

impl Orchestrator {
    /// Generate every selected artifact of `schema`.
    ///
    /// Each run gets its own naming engine, so runs never share state.
    #[tracing::instrument(level = "debug", skip_all, fields(types = schema.len()))]
    pub fn run(
        schema: &Schema,
        config: &GeneratorConfig,
    ) -> Result<Vec<ArtifactDescriptor>, GenerationError> {
        let namer = Namer::new(config);
        let ctx = GenerationContext::new(schema, config, &namer);
        let generate_all = config.generate_all;

        let mut paginated = 0usize;
        let mut outputs = Vec::new();
        for ty in schema.types() {
            let NamedType::OutputRecord(record) = ty else {
                continue;
            };
            if selected(ty, generate_all)? {
                outputs.push(object::generate(&ctx, record)?);
            }
            for field in &record.fields {
                let policy = Policy::for_field(&record.name, field, generate_all)?;
                if !policy.generate {
                    continue;
                }
                if policy.pagination {
                    paginated += 1;
                    outputs.extend(connection::generate(&ctx, record, field, &policy)?);
                } else {
                    outputs.extend(resolver::generate(&ctx, record, field, &policy)?);
                }
            }
        }

        let mut interfaces = Vec::new();
        for ty in schema.types() {
            if let NamedType::Interface(record) = ty {
                if selected(ty, generate_all)? {
                    interfaces.push(interface::generate(&ctx, record)?);
                }
            }
        }

        // Enums and input records are emitted when selected or when an
        // emitted artifact refers to them.
        let mut owners: HashMap<QualifiedName, &str> = HashMap::new();
        let mut pending: Vec<&str> = Vec::new();
        for ty in schema.types() {
            let kind = match ty {
                NamedType::Enum(_) => TypeKind::Enum,
                NamedType::InputRecord(_) => TypeKind::InputRecord,
                _ => continue,
            };
            if selected(ty, generate_all)? {
                pending.push(ty.name());
            }
            owners.insert(namer.compose(&NamingKey::type_name(kind, ty.name())), ty.name());
            if kind == TypeKind::InputRecord {
                owners.insert(
                    namer.compose(&NamingKey::for_type(NameRole::InputParser, ty.name())),
                    ty.name(),
                );
            }
        }
        let referenced = |artifact: &ArtifactDescriptor| {
            artifact
                .references()
                .iter()
                .filter_map(|name| owners.get(name).copied())
                .collect::<Vec<_>>()
        };
        for artifact in outputs.iter().chain(&interfaces) {
            pending.extend(referenced(artifact));
        }

        let mut reached = BTreeSet::new();
        let mut inputs: HashMap<&str, Vec<ArtifactDescriptor>> = HashMap::new();
        while let Some(name) = pending.pop() {
            if !reached.insert(name) {
                continue;
            }
            if let Some(NamedType::InputRecord(record)) = schema.get(name) {
                let generated = input::generate(&ctx, record)?;
                for artifact in &generated {
                    pending.extend(referenced(artifact));
                }
                inputs.insert(name, generated);
            }
        }
        tracing::trace!(reached = reached.len(), "enums and input records to emit");

        let mut artifacts = Vec::new();
        for ty in schema.types() {
            if let NamedType::Enum(e) = ty {
                if reached.contains(e.name.as_str()) {
                    artifacts.push(enum_gen::generate(&ctx, e)?);
                }
            }
        }
        for ty in schema.types() {
            if let NamedType::InputRecord(record) = ty {
                if let Some(generated) = inputs.remove(record.name.as_str()) {
                    artifacts.extend(generated);
                }
            }
        }
        artifacts.extend(outputs);
        artifacts.extend(interfaces);

        if paginated > 0 {
            artifacts.push(connection::page_info(&ctx)?);
        }
        artifacts.push(support::value_box(&ctx)?);
        artifacts.push(support::environment_wrapper(&ctx)?);

        tracing::debug!(artifacts = artifacts.len(), paginated, "generation finished");
        Ok(artifacts)
    }
}

/// Generate artifacts for a schema (alias for [`Orchestrator::run`])
pub fn generate(
    schema: &Schema,
    config: &GeneratorConfig,
) -> Result<Vec<ArtifactDescriptor>, GenerationError> {
    Orchestrator::run(schema, config)
}

fn selected(ty: &NamedType, generate_all: bool) -> Result<bool, GenerationError> {
    let generate = Policy::for_type(ty, generate_all)?.generate;
    if !generate {
        tracing::trace!(ty = ty.name(), kind = %ty.kind(), "skipping type");
    }
    Ok(generate)
}
