//! schemagen
//!
//! Directive-driven code generation from GraphQL-style type graphs.
//!
//! A run takes a [`Schema`] and a [`GeneratorConfig`] and produces a list of
//! [`ArtifactDescriptor`]s: records, enums, contracts and functions described
//! as data, with every naming, typing and coercion decision already made.
//! [`render::Renderer`] turns descriptors into formatted Rust sources, and
//! [`runtime`] can execute the coercion plans directly against raw values.
//!
//! ```
//! use schemagen::ir::{EnumType, Schema};
//! use schemagen::{GeneratorConfig, Renderer};
//!
//! # fn main() -> Result<(), schemagen::GenerationError> {
//! let schema = Schema::new().with_type(EnumType::new("Color", ["RED", "GREEN"]));
//! let config = GeneratorConfig::from_parameter("generate_all=true,prefix=Api")?;
//! let artifacts = schemagen::generate(&schema, &config)?;
//! let files = Renderer::new(&config).render_artifacts(&artifacts)?;
//! assert!(files.iter().any(|f| f.name == "generated/enums/api_color.rs"));
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod coercion;
pub mod config;
pub mod error;
pub mod generator;
pub mod graphql;
pub mod ir;
pub mod naming;
pub mod policy;
pub mod render;
pub mod runtime;
pub mod types;
pub mod wrapping;

pub use artifact::{ArtifactDescriptor, ArtifactKind, FunctionBody, Member};
pub use coercion::{CoercionChain, CoercionStep};
pub use config::GeneratorConfig;
pub use error::{CoercionError, GenerationError};
pub use generator::{Orchestrator, generate};
pub use ir::{Schema, TypeRef, Value};
pub use naming::{NameRole, Namer, QualifiedName};
pub use render::{RenderedFile, Renderer};
pub use types::{BaseType, TargetType};
