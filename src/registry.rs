//! Read-only index of the declaration graph, queryable by simple name.

use indexmap::IndexMap;

use crate::decl::{ClassDecl, Declaration, Documented, EnumDecl, InterfaceDecl, UsableDeclaration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DeclId(u32);

#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    declarations: Vec<Declaration>,
    by_name: IndexMap<String, Vec<DeclId>>,
}

/// Last segment of a possibly qualified name: `Ns.Inner.Model` → `Model`.
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

impl DeclarationRegistry {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        let mut by_name: IndexMap<String, Vec<DeclId>> = IndexMap::new();
        for (i, decl) in declarations.iter().enumerate() {
            by_name
                .entry(simple_name(decl.name()).to_string())
                .or_default()
                .push(DeclId(i as u32));
        }
        tracing::debug!(declarations = declarations.len(), names = by_name.len(), "indexed declaration graph");
        Self { declarations, by_name }
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    fn named(&self, simple: &str) -> impl Iterator<Item = &Declaration> {
        self.by_name
            .get(simple)
            .into_iter()
            .flatten()
            .map(|id| &self.declarations[id.0 as usize])
    }

    /// Interfaces, classes and type aliases with the given simple name, in
    /// graph order.
    pub fn lookup_by_name(&self, simple: &str) -> Vec<UsableDeclaration<'_>> {
        self.named(simple).filter_map(Declaration::as_usable).collect()
    }

    pub fn lookup_enum(&self, simple: &str) -> Vec<&EnumDecl> {
        self.named(simple)
            .filter_map(|d| match d {
                Declaration::Enum(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn class_declaration(&self, simple: &str) -> Option<&ClassDecl> {
        self.named(simple).find_map(|d| match d {
            Declaration::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn interface_declaration(&self, simple: &str) -> Option<&InterfaceDecl> {
        self.named(simple).find_map(|d| match d {
            Declaration::Interface(i) => Some(i),
            _ => None,
        })
    }

    /// Documentation text of a node, trimmed; empty when undocumented.
    pub fn documentation_of(&self, node: &impl Documented) -> String {
        node.raw_doc().trim().to_string()
    }
}
