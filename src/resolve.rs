//! Type resolution engine.
//!
//! A `TypeResolver` owns every piece of run-scoped state (reference cache,
//! in-progress set, deferred fix-ups, reference arena). Create one per
//! generation run, feed it type expressions through `resolve_type`, then
//! consume it with `finalize` to obtain the patched `ResolvedGraph`.
//!
//! Dispatch:
//! - keywords → primitive resolution (with refinement hints)
//! - named references → built-ins, generic parameters, or the reference resolver
//! - everything else → structural resolution (arrays, literals, unions; the
//!   remaining kinds fail fast)
pub mod canonical;
pub mod fixup;
pub mod primitive;
mod reference;
mod structural;

use std::ops::Index;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::{ResolveError, Warning};
use crate::expr::{Hints, IndexSignature, Member, PropertyDecl, TypeExpr};
use crate::ir::{Property, RefId, ReferenceStore, ReferenceType, SchemaType};
use crate::registry::{DeclarationRegistry, simple_name};

pub use fixup::DeferredFixups;

pub type Result<T> = std::result::Result<T, ResolveError>;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Generic parameter name → concrete type expression, scoped to one call chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericBindings {
    map: IndexMap<String, TypeExpr>,
}

#[derive(Debug, Default)]
struct ResolutionContext {
    cache: IndexMap<String, RefId>,
    in_progress: IndexSet<String>,
    fixups: DeferredFixups,
    store: ReferenceStore,
    warnings: Vec<Warning>,
}

pub struct TypeResolver<'g> {
    registry: &'g DeclarationRegistry,
    cx: ResolutionContext,
}

/// Output of a finalized run: every reference slot, patched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGraph {
    pub references: ReferenceStore,
    /// Canonical name → cached slot, in resolution-completion order.
    pub reference_types: IndexMap<String, RefId>,
    pub warnings: Vec<Warning>,
}

// ————————————————————————————————————————————————————————————————————————————
// GENERIC BINDINGS
// ————————————————————————————————————————————————————————————————————————————

impl GenericBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a declaration's type parameters with the supplied arguments.
    /// Parameters without an argument stay unbound.
    pub fn for_params(params: &[String], args: &[TypeExpr]) -> Self {
        params.iter().cloned().zip(args.iter().cloned()).collect()
    }

    pub fn bind(&mut self, param: impl Into<String>, ty: TypeExpr) {
        self.map.insert(param.into(), ty);
    }

    pub fn get(&self, param: &str) -> Option<&TypeExpr> {
        self.map.get(param)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Substitute bound parameters anywhere inside `expr`.
    pub fn apply(&self, expr: &TypeExpr) -> TypeExpr {
        if self.map.is_empty() {
            return expr.clone();
        }
        let all = |types: &[TypeExpr]| types.iter().map(|t| self.apply(t)).collect::<Vec<_>>();
        match expr {
            TypeExpr::Reference { name, args } if args.is_empty() => {
                self.map.get(name).cloned().unwrap_or_else(|| expr.clone())
            }
            TypeExpr::Reference { name, args } => TypeExpr::generic(name.clone(), all(args)),
            TypeExpr::Array { element } => TypeExpr::array_of(self.apply(element)),
            TypeExpr::Union { types } => TypeExpr::Union { types: all(types) },
            TypeExpr::Intersection { types } => TypeExpr::Intersection { types: all(types) },
            TypeExpr::Tuple { elements } => TypeExpr::Tuple { elements: all(elements) },
            TypeExpr::Optional { inner } => TypeExpr::Optional { inner: Box::new(self.apply(inner)) },
            TypeExpr::Object { members } => TypeExpr::Object {
                members: members.iter().map(|m| self.apply_member(m)).collect(),
            },
            _ => expr.clone(),
        }
    }

    fn apply_member(&self, member: &Member) -> Member {
        match member {
            Member::Property(p) => Member::Property(PropertyDecl {
                ty: p.ty.as_ref().map(|t| self.apply(t)),
                ..p.clone()
            }),
            Member::Index(sig) => Member::Index(IndexSignature {
                key: self.apply(&sig.key),
                value: self.apply(&sig.value),
            }),
            Member::Method { .. } => member.clone(),
        }
    }
}

impl FromIterator<(String, TypeExpr)> for GenericBindings {
    fn from_iter<I: IntoIterator<Item = (String, TypeExpr)>>(iter: I) -> Self {
        GenericBindings { map: iter.into_iter().collect() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT API
// ————————————————————————————————————————————————————————————————————————————

impl<'g> TypeResolver<'g> {
    pub fn new(registry: &'g DeclarationRegistry) -> Self {
        Self { registry, cx: ResolutionContext::default() }
    }

    pub fn registry(&self) -> &'g DeclarationRegistry {
        self.registry
    }

    /// Resolve a type usage site with no enclosing-declaration hints.
    pub fn resolve_type(&mut self, expr: &TypeExpr, bindings: Option<&GenericBindings>) -> Result<SchemaType> {
        self.resolve_type_with_hints(expr, bindings, Hints::none())
    }

    pub fn resolve_type_with_hints(
        &mut self,
        expr: &TypeExpr,
        bindings: Option<&GenericBindings>,
        hints: Hints<'_>,
    ) -> Result<SchemaType> {
        tracing::trace!(kind = %expr.syntax_kind(), "resolving type");
        match expr {
            TypeExpr::Keyword { .. } => primitive::resolve_primitive(expr, hints)
                .ok_or_else(|| ResolveError::unsupported(expr.syntax_kind(), expr.source_text())),
            TypeExpr::Reference { name, args } => self.resolve_named(name, args, bindings, hints),
            _ => self.resolve_structural(expr, bindings, hints),
        }
    }

    /// Current content of a reference slot. Placeholders read as empty until
    /// `finalize` runs.
    pub fn reference(&self, id: RefId) -> &ReferenceType {
        &self.cx.store[id]
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.cx.warnings
    }

    /// Drain the deferred fix-ups and hand over the reference graph.
    /// Consuming `self` makes this the last step of a run.
    pub fn finalize(mut self) -> ResolvedGraph {
        let pending = self.cx.fixups.len();
        let unresolved = self.cx.fixups.drain(&self.cx.cache, &mut self.cx.store);
        tracing::debug!(pending, unresolved = unresolved.len(), references = self.cx.cache.len(), "finalized run");
        self.cx
            .warnings
            .extend(unresolved.into_iter().map(|name| Warning::UnresolvedPlaceholder { name }));
        ResolvedGraph {
            references: self.cx.store,
            reference_types: self.cx.cache,
            warnings: self.cx.warnings,
        }
    }

    // -------------------------------- Named --------------------------------- //

    fn resolve_named(
        &mut self,
        name: &str,
        args: &[TypeExpr],
        bindings: Option<&GenericBindings>,
        hints: Hints<'_>,
    ) -> Result<SchemaType> {
        let bindings = bindings.filter(|b| !b.is_empty());
        if args.is_empty() {
            if let Some(bound) = bindings.and_then(|b| b.get(name)) {
                return self.resolve_type_with_hints(bound, None, hints);
            }
        }
        let args: Vec<TypeExpr> = match bindings {
            Some(b) => args.iter().map(|a| b.apply(a)).collect(),
            None => args.to_vec(),
        };

        match (simple_name(name), args.as_slice()) {
            ("Array", [element]) => Ok(SchemaType::array_of(self.resolve_type(element, None)?)),
            ("Promise", [inner]) => self.resolve_type_with_hints(inner, None, hints),
            (simple, _) => match primitive::resolve_builtin(simple, hints) {
                Some(builtin) => Ok(builtin),
                None => self.resolve_reference(name, &args),
            },
        }
    }

    // ------------------------------ Properties ------------------------------ //

    /// Properties of a member list, skipping methods and function-typed
    /// members.
    fn member_properties(
        &mut self,
        owner: &str,
        members: &[Member],
        bindings: Option<&GenericBindings>,
    ) -> Result<Vec<Property>> {
        members
            .iter()
            .filter_map(|m| match m {
                Member::Property(p) if !p.is_function_typed() => Some(p),
                _ => None,
            })
            .map(|p| self.property(owner, p, bindings))
            .collect()
    }

    fn property(&mut self, owner: &str, decl: &PropertyDecl, bindings: Option<&GenericBindings>) -> Result<Property> {
        let ty = decl.ty.as_ref().ok_or_else(|| ResolveError::MissingTypeAnnotation {
            owner: owner.to_string(),
            member: decl.name.clone(),
        })?;
        Ok(Property {
            name: decl.name.clone(),
            description: self.registry.documentation_of(decl),
            ty: self.resolve_type_with_hints(ty, bindings, decl.hints())?,
            required: !decl.optional,
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RESOLVED GRAPH
// ————————————————————————————————————————————————————————————————————————————

impl ResolvedGraph {
    pub fn get(&self, id: RefId) -> Option<&ReferenceType> {
        self.references.get(id)
    }

    pub fn lookup(&self, canonical_name: &str) -> Option<&ReferenceType> {
        self.reference_types.get(canonical_name).map(|id| &self.references[*id])
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Index<RefId> for ResolvedGraph {
    type Output = ReferenceType;

    fn index(&self, id: RefId) -> &ReferenceType {
        &self.references[id]
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::decl::Declaration;
    use crate::expr::Keyword;
    use crate::ir::Primitive;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    /// Build a registry from a JSON array of declarations.
    pub(crate) fn registry(declarations: Value) -> DeclarationRegistry {
        let declarations: Vec<Declaration> = serde_json::from_value(declarations).unwrap();
        DeclarationRegistry::new(declarations)
    }

    pub(crate) fn expr(v: Value) -> TypeExpr {
        serde_json::from_value(v).unwrap()
    }

    pub(crate) fn string() -> SchemaType {
        SchemaType::primitive(Primitive::String)
    }

    pub(crate) fn double() -> SchemaType {
        SchemaType::primitive(Primitive::Double)
    }

    #[test]
    fn keywords_resolve_to_primitives() {
        let registry = registry(json!([]));
        let mut resolver = TypeResolver::new(&registry);
        assert_eq!(resolver.resolve_type(&TypeExpr::keyword(Keyword::String), None).unwrap(), string());
        assert_eq!(resolver.resolve_type(&TypeExpr::keyword(Keyword::Number), None).unwrap(), double());
        assert_eq!(
            resolver.resolve_type(&TypeExpr::keyword(Keyword::Void), None).unwrap(),
            SchemaType::primitive(Primitive::Void)
        );
    }

    #[test]
    fn unmapped_keyword_fails_fast() {
        let registry = registry(json!([]));
        let mut resolver = TypeResolver::new(&registry);
        let err = resolver.resolve_type(&TypeExpr::keyword(Keyword::Any), None).unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedType { ref text, .. } if text == "any"));
    }

    #[test]
    fn bound_parameter_is_substituted() {
        let registry = registry(json!([]));
        let mut resolver = TypeResolver::new(&registry);
        let mut bindings = GenericBindings::new();
        bindings.bind("T", TypeExpr::keyword(Keyword::Boolean));
        let ty = resolver
            .resolve_type(&TypeExpr::array_of(TypeExpr::named("T")), Some(&bindings))
            .unwrap();
        assert_eq!(ty, SchemaType::array_of(SchemaType::primitive(Primitive::Boolean)));
    }

    #[test]
    fn builtin_wrappers_and_names() {
        let registry = registry(json!([]));
        let mut resolver = TypeResolver::new(&registry);
        let promise = expr(json!({
            "kind": "reference", "name": "Promise",
            "args": [{ "kind": "reference", "name": "Array", "args": [{ "kind": "keyword", "keyword": "string" }] }]
        }));
        assert_eq!(resolver.resolve_type(&promise, None).unwrap(), SchemaType::array_of(string()));
        assert_eq!(
            resolver.resolve_type(&TypeExpr::named("Date"), None).unwrap(),
            SchemaType::primitive(Primitive::DateTime)
        );
        assert_eq!(
            resolver.resolve_type(&TypeExpr::named("Buffer"), None).unwrap(),
            SchemaType::primitive(Primitive::Buffer)
        );
    }

    #[test]
    fn apply_substitutes_deeply() {
        let bindings = GenericBindings::for_params(&["T".to_string(), "U".to_string()], &[TypeExpr::keyword(Keyword::String)]);
        assert_eq!(bindings.len(), 1);
        let applied = bindings.apply(&TypeExpr::generic("Box", vec![TypeExpr::array_of(TypeExpr::named("T")), TypeExpr::named("U")]));
        assert_eq!(applied.source_text(), "Box<string[], U>");
    }

    #[test]
    fn missing_annotation_is_reported() {
        let registry = registry(json!([
            { "kind": "interface", "name": "Loose", "members": [{ "kind": "property", "name": "x" }] }
        ]));
        let mut resolver = TypeResolver::new(&registry);
        let err = resolver.resolve_type(&TypeExpr::named("Loose"), None).unwrap_err();
        assert_eq!(err, ResolveError::MissingTypeAnnotation { owner: "Loose".into(), member: "x".into() });
    }
}
