//! Declaration graph → schema type graph.
//!
//! ```text
//! DeclarationGraph ─▶ DeclarationRegistry ─▶ TypeResolver ─▶ ResolvedGraph ─▶ emit
//! ```
pub mod cli;
pub mod decl;
pub mod emit;
pub mod error;
pub mod expr;
pub mod generate;
pub mod ir;
pub mod jq_exec;
pub mod logging;
pub mod path_de;
pub mod registry;
pub mod resolve;

pub use decl::Declaration;
pub use error::{ResolveError, Warning};
pub use expr::TypeExpr;
pub use generate::{DeclarationGraph, Metadata, RootType, generate, generate_graph};
pub use ir::{RefId, SchemaType};
pub use registry::DeclarationRegistry;
pub use resolve::{GenericBindings, ResolvedGraph, TypeResolver};
