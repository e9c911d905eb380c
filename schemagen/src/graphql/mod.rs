//! Artifact generators
//!
//! One module per artifact kind, each a set of free functions taking the
//! shared `GenerationContext`:
//! - Enums and input records (with their parse functions)
//! - Output records and interfaces
//! - Field resolver contracts, plain and paginated
//! - Run-wide support types (value box, resolver environment)

pub mod connection;
pub mod enum_gen;
pub mod input;
pub mod interface;
pub mod object;
pub mod resolver;
pub mod support;
