//! One generation run: every endpoint-level root resolved through a single
//! `TypeResolver`, then finalized into `Metadata`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::decl::Declaration;
use crate::error::ResolveError;
use crate::expr::{Hints, TypeExpr};
use crate::ir::SchemaType;
use crate::path_de::{self, LoadError};
use crate::registry::DeclarationRegistry;
use crate::resolve::{GenericBindings, ResolvedGraph, TypeResolver};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Input document: the declaration graph plus the usage sites to resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclarationGraph {
    pub declarations: Vec<Declaration>,
    pub roots: Vec<RootType>,
}

/// An endpoint-level type usage (return type, body parameter, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootType {
    pub label: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    /// Generic parameters in scope at the usage site.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub bindings: IndexMap<String, TypeExpr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Root label → resolved type, in input order.
    pub roots: IndexMap<String, SchemaType>,
    #[serde(flatten)]
    pub graph: ResolvedGraph,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DeclarationGraph {
    pub fn from_json_str(src: &str) -> Result<Self, LoadError> {
        path_de::from_str_with_path(src)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, LoadError> {
        path_de::from_value_with_path(value)
    }

    /// Fold another document into this one.
    pub fn merge(&mut self, other: DeclarationGraph) {
        self.declarations.extend(other.declarations);
        self.roots.extend(other.roots);
    }
}

impl RootType {
    pub fn new(label: impl Into<String>, ty: TypeExpr) -> Self {
        RootType {
            label: label.into(),
            ty,
            bindings: IndexMap::new(),
            decorators: Vec::new(),
            doc_tags: Vec::new(),
        }
    }

    fn hints(&self) -> Hints<'_> {
        Hints { decorators: &self.decorators, doc_tags: &self.doc_tags }
    }
}

impl Metadata {
    pub fn has_warnings(&self) -> bool {
        self.graph.has_warnings()
    }
}

/// Resolve every root in order. The first failure aborts the run.
pub fn generate(registry: &DeclarationRegistry, roots: &[RootType]) -> Result<Metadata, ResolveError> {
    let mut resolver = TypeResolver::new(registry);
    let mut resolved = IndexMap::with_capacity(roots.len());
    for root in roots {
        let bindings: GenericBindings = root.bindings.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let ty = resolver
            .resolve_type_with_hints(&root.ty, Some(&bindings), root.hints())
            .inspect_err(|err| tracing::error!(root = %root.label, error = %err, "there was a problem resolving type"))?;
        resolved.insert(root.label.clone(), ty);
    }
    let graph = resolver.finalize();
    tracing::info!(
        roots = resolved.len(),
        references = graph.reference_types.len(),
        warnings = graph.warnings.len(),
        "generation finished"
    );
    Ok(Metadata { roots: resolved, graph })
}

pub fn generate_graph(document: DeclarationGraph) -> Result<Metadata, ResolveError> {
    let DeclarationGraph { declarations, roots } = document;
    let registry = DeclarationRegistry::new(declarations);
    generate(&registry, &roots)
}
