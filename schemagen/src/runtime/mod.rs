//! Reference semantics of generated code
//!
//! Generated parse functions and connection builders are described as data.
//! This module executes those descriptions directly, which is what the
//! generated code must agree with:
//! - `coerce` runs coercion chains against untyped values
//! - `connection` builds edges and page info from a page of results

pub mod coerce;
pub mod connection;

pub use coerce::{Coerced, CoercionRegistry, evaluate};
pub use connection::{Connection, Edge, PageInfo, PageResult};
