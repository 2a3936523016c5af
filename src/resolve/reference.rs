//! Named references to declarations.
//!
//! Resolution of `Name<Args>`:
//! 1. the canonical name (name + rendered args) keys the cache, so each
//!    instantiation is built once and shared by every holder;
//! 2. a name met again while still in progress yields a placeholder slot,
//!    patched by the deferred fix-ups at the end of the run;
//! 3. enums and literal-union aliases become enum types;
//! 4. interfaces, classes and aliases become reference types carrying their
//!    own properties, index signatures and everything inherited from their
//!    bases (own properties win). Bases are merged again once the run is
//!    finalized, so a base that was still a placeholder is not lost.

use super::{GenericBindings, Result, TypeResolver, canonical};
use crate::decl::{TypeAliasDecl, UsableDeclaration};
use crate::error::ResolveError;
use crate::expr::{Member, TypeExpr, Visibility};
use crate::ir::{Primitive, Property, RefId, ReferenceType, SchemaType};
use crate::registry::simple_name;

impl<'g> TypeResolver<'g> {
    #[tracing::instrument(level = "trace", skip(self, generic_args), fields(args = generic_args.len()))]
    pub(crate) fn resolve_reference(&mut self, name: &str, generic_args: &[TypeExpr]) -> Result<SchemaType> {
        let canonical = canonical::canonical_name(name, generic_args);

        if let Some(&id) = self.cx.cache.get(&canonical) {
            tracing::trace!(%canonical, "reference cache hit");
            return Ok(SchemaType::Reference { id });
        }

        if self.cx.in_progress.contains(&canonical) {
            let id = self.cx.store.alloc(ReferenceType::placeholder(&canonical));
            self.cx.fixups.register(&canonical, id);
            tracing::debug!(%canonical, "reference cycle, deferring placeholder");
            return Ok(SchemaType::Reference { id });
        }

        self.cx.in_progress.insert(canonical.clone());
        let outcome = self.build_reference(name, &canonical, generic_args);
        self.cx.in_progress.shift_remove(&canonical);

        if let Err(err) = &outcome {
            tracing::debug!(%canonical, error = %err, "there was a problem resolving type");
        }
        outcome
    }

    fn build_reference(&mut self, name: &str, canonical: &str, generic_args: &[TypeExpr]) -> Result<SchemaType> {
        let simple = simple_name(name);

        match self.registry.lookup_enum(simple).as_slice() {
            [] => {}
            [single] => {
                let members = single
                    .members
                    .iter()
                    .enumerate()
                    .map(|(i, m)| if m.is_empty() { i.to_string() } else { m.clone() })
                    .collect();
                return Ok(SchemaType::Enum { members });
            }
            many => return Err(ambiguous(simple, many.len())),
        }

        let candidates = self.registry.lookup_by_name(simple);

        let literal_aliases: Vec<&'g TypeAliasDecl> = candidates
            .iter()
            .filter_map(|d| match d {
                UsableDeclaration::TypeAlias(alias) if matches!(alias.ty, TypeExpr::Union { .. }) => Some(*alias),
                _ => None,
            })
            .collect();
        match literal_aliases.as_slice() {
            [] => {}
            [alias] => return literal_alias_enum(alias),
            many => return Err(ambiguous(simple, many.len())),
        }

        let decl = select_declaration(simple, &candidates, generic_args.len())?;
        let bindings = GenericBindings::for_params(decl.type_params(), generic_args);

        let (properties, aliased) = self.own_properties(decl, &bindings)?;
        let mut reference = ReferenceType {
            name: canonical.to_string(),
            description: self.registry.documentation_of(&decl),
            properties,
            additional_properties: self.additional_properties(decl, &bindings)?,
        };
        let mut bases = self.heritage_bases(decl, &bindings)?;
        bases.extend(aliased);
        for &base in &bases {
            reference.inherit(&self.cx.store[base].properties);
        }

        let id = self.cx.store.alloc(reference);
        self.cx.cache.insert(canonical.to_string(), id);
        for base in bases {
            let source = self.cx.store[base].name.clone();
            self.cx.fixups.register_merge(source, id);
        }
        tracing::debug!(%canonical, "resolved reference");
        Ok(SchemaType::Reference { id })
    }

    /// Declared properties, plus the target slot when an alias names a
    /// reference (its properties are inherited like a base's).
    fn own_properties(
        &mut self,
        decl: UsableDeclaration<'g>,
        bindings: &GenericBindings,
    ) -> Result<(Vec<Property>, Option<RefId>)> {
        let properties = match decl {
            UsableDeclaration::Interface(interface) => {
                self.member_properties(&interface.name, &interface.members, Some(bindings))?
            }
            UsableDeclaration::Class(class) => {
                let fields = class.members.iter().filter_map(|m| match m {
                    Member::Property(p)
                        if !p.is_function_typed()
                            && !matches!(p.visibility, Some(Visibility::Private | Visibility::Protected)) =>
                    {
                        Some(p)
                    }
                    _ => None,
                });
                let parameters = class
                    .constructor_params
                    .iter()
                    .filter(|p| p.visibility == Some(Visibility::Public));
                fields
                    .chain(parameters)
                    .map(|p| self.property(&class.name, p, Some(bindings)))
                    .collect::<Result<Vec<_>>>()?
            }
            UsableDeclaration::TypeAlias(alias) => match &alias.ty {
                TypeExpr::Keyword { .. } => Vec::new(),
                TypeExpr::Object { members } => self.member_properties(&alias.name, members, Some(bindings))?,
                target => match self.resolve_type(target, Some(bindings))? {
                    SchemaType::Reference { id } => return Ok((Vec::new(), Some(id))),
                    SchemaType::Object { properties } => properties,
                    _ => Vec::new(),
                },
            },
        };
        Ok((properties, None))
    }

    /// String-keyed index signatures of interfaces and object-literal aliases.
    fn additional_properties(
        &mut self,
        decl: UsableDeclaration<'g>,
        bindings: &GenericBindings,
    ) -> Result<Option<Vec<Property>>> {
        let members: &'g [Member] = match decl {
            UsableDeclaration::Interface(interface) => &interface.members,
            UsableDeclaration::TypeAlias(TypeAliasDecl { ty: TypeExpr::Object { members }, .. }) => members,
            _ => return Ok(None),
        };

        let mut additional = Vec::new();
        for member in members {
            let Member::Index(signature) = member else { continue };
            let key = self.resolve_type(&signature.key, Some(bindings))?;
            if key.as_primitive() != Some(Primitive::String) {
                return Err(ResolveError::UnsupportedIndex {
                    owner: decl.name().to_string(),
                    found: key.type_name().to_string(),
                });
            }
            additional.push(Property {
                name: String::new(),
                description: String::new(),
                ty: self.resolve_type(&signature.value, Some(bindings))?,
                required: true,
            });
        }
        Ok((!additional.is_empty()).then_some(additional))
    }

    /// Slots of every heritage base, generic arguments substituted through
    /// this declaration's bindings.
    fn heritage_bases(&mut self, decl: UsableDeclaration<'g>, bindings: &GenericBindings) -> Result<Vec<RefId>> {
        let mut bases = Vec::new();
        for base in decl.heritage() {
            let simple = simple_name(&base.name);
            let declared = self.registry.class_declaration(simple).is_some()
                || self.registry.interface_declaration(simple).is_some();
            if !declared {
                return Err(ResolveError::UnresolvedType { name: base.name.clone() });
            }
            let args: Vec<TypeExpr> = base.args.iter().map(|arg| bindings.apply(arg)).collect();
            bases.extend(self.resolve_reference(&base.name, &args)?.as_reference());
        }
        Ok(bases)
    }
}

fn select_declaration<'g>(
    simple: &str,
    candidates: &[UsableDeclaration<'g>],
    arity: usize,
) -> Result<UsableDeclaration<'g>> {
    match candidates {
        [] => Err(ResolveError::UnresolvedType { name: simple.to_string() }),
        [only] => Ok(*only),
        _ => {
            let same_arity: Vec<_> = candidates
                .iter()
                .copied()
                .filter(|d| d.type_params().len() == arity)
                .collect();
            let pool = if same_arity.is_empty() { candidates.to_vec() } else { same_arity };
            match pool.as_slice() {
                [only] => Ok(*only),
                [first, ..] if first.is_generic() => {
                    tracing::debug!(name = simple, count = pool.len(), "several generic declarations, using the first");
                    Ok(*first)
                }
                many => Err(ambiguous(simple, many.len())),
            }
        }
    }
}

/// Members are the literal texts as written, quotes included.
fn literal_alias_enum(alias: &TypeAliasDecl) -> Result<SchemaType> {
    let TypeExpr::Union { types } = &alias.ty else {
        return Ok(SchemaType::Enum { members: Vec::new() });
    };
    let members = types
        .iter()
        .map(|t| match t {
            TypeExpr::Literal { text } => Ok(text.clone()),
            other => Err(ResolveError::InvalidEnum { name: alias.name.clone(), member: other.source_text() }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SchemaType::Enum { members })
}

fn ambiguous(name: &str, count: usize) -> ResolveError {
    ResolveError::AmbiguousType { name: name.to_string(), count }
}
