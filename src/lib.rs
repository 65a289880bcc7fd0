//! D-Bus introspection-XML to Rust code generator.
//!
//! See `SPEC_FULL.md` for the full design; in short, [`xml::ingest`]
//! turns an introspection document into a [`model::Node`] tree,
//! [`sig::mapper`] maps each member's type signatures (via
//! [`sig::cursor`]), [`synth::structimpl`] emits marshalling code for any
//! synthesized struct types, and [`generate::generate`] assembles the
//! final module source.

pub mod error;
pub mod generate;
pub mod mangle;
pub mod model;
pub mod sig;
pub mod synth;
pub mod xml;

pub use error::{Error, Result};
pub use generate::{generate, ConnectionType, GenOpts, Mode, MethodType, ServerAccess, ServerBackend};
