//! Declarations of the graph: interfaces, classes, type aliases and enums.

use serde::{Deserialize, Serialize};

use crate::expr::{Member, PropertyDecl, TypeExpr};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    Interface(InterfaceDecl),
    Class(ClassDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub extends: Vec<HeritageRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub constructor_params: Vec<PropertyDecl>,
    /// `extends` and `implements` clauses, in source order.
    #[serde(default)]
    pub heritage: Vec<HeritageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub doc: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    pub members: Vec<String>,
}

/// A base type named in a heritage clause, e.g. `extends Page<T[]>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeritageRef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeExpr>,
}

/// Declarations a named reference may resolve to (enums are looked up apart).
#[derive(Debug, Clone, Copy)]
pub enum UsableDeclaration<'g> {
    Interface(&'g InterfaceDecl),
    Class(&'g ClassDecl),
    TypeAlias(&'g TypeAliasDecl),
}

/// Anything carrying a documentation comment.
pub trait Documented {
    fn raw_doc(&self) -> &str;
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Interface(d) => &d.name,
            Declaration::Class(d) => &d.name,
            Declaration::TypeAlias(d) => &d.name,
            Declaration::Enum(d) => &d.name,
        }
    }

    pub fn as_usable(&self) -> Option<UsableDeclaration<'_>> {
        match self {
            Declaration::Interface(d) => Some(UsableDeclaration::Interface(d)),
            Declaration::Class(d) => Some(UsableDeclaration::Class(d)),
            Declaration::TypeAlias(d) => Some(UsableDeclaration::TypeAlias(d)),
            Declaration::Enum(_) => None,
        }
    }
}

impl<'g> UsableDeclaration<'g> {
    pub fn name(&self) -> &'g str {
        match self {
            UsableDeclaration::Interface(d) => &d.name,
            UsableDeclaration::Class(d) => &d.name,
            UsableDeclaration::TypeAlias(d) => &d.name,
        }
    }

    pub fn type_params(&self) -> &'g [String] {
        match self {
            UsableDeclaration::Interface(d) => &d.type_params,
            UsableDeclaration::Class(d) => &d.type_params,
            UsableDeclaration::TypeAlias(d) => &d.type_params,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params().is_empty()
    }

    pub fn heritage(&self) -> &'g [HeritageRef] {
        match self {
            UsableDeclaration::Interface(d) => &d.extends,
            UsableDeclaration::Class(d) => &d.heritage,
            UsableDeclaration::TypeAlias(_) => &[],
        }
    }
}

impl Documented for UsableDeclaration<'_> {
    fn raw_doc(&self) -> &str {
        match self {
            UsableDeclaration::Interface(d) => &d.doc,
            UsableDeclaration::Class(d) => &d.doc,
            UsableDeclaration::TypeAlias(d) => &d.doc,
        }
    }
}

impl Documented for PropertyDecl {
    fn raw_doc(&self) -> &str {
        &self.doc
    }
}

impl Documented for EnumDecl {
    fn raw_doc(&self) -> &str {
        &self.doc
    }
}
