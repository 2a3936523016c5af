//! Type expressions: the usage sites handed to the resolver.
//!
//! A `TypeExpr` is a closed tagged union over the syntactic kinds that can
//! appear in a declaration graph. Kinds without a resolution rule still get a
//! variant so dispatch stays exhaustive and can fail with a precise message.

use std::fmt;

use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeExpr {
    Keyword { keyword: Keyword },
    /// Named reference, possibly qualified (`Ns.Model`), with generic arguments.
    Reference {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeExpr>,
    },
    Array { element: Box<TypeExpr> },
    /// Inline object literal `{ a: T; b?: U }`.
    Object {
        #[serde(default)]
        members: Vec<Member>,
    },
    Union { types: Vec<TypeExpr> },
    /// Literal type; `text` is the raw source text, quotes included.
    Literal { text: String },
    Function {
        #[serde(default)]
        text: String,
    },
    Tuple { elements: Vec<TypeExpr> },
    Optional { inner: Box<TypeExpr> },
    IndexedAccess { object: Box<TypeExpr>, index: Box<TypeExpr> },
    Mapped {
        #[serde(default)]
        text: String,
    },
    Intersection { types: Vec<TypeExpr> },
    TypeOperator { operator: String, target: Box<TypeExpr> },
    /// Anything the loader could not classify.
    Unsupported {
        syntax: String,
        #[serde(default)]
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Void,
    Any,
    Unknown,
    Object,
    Null,
    Undefined,
    Never,
    BigInt,
    Symbol,
}

/// Syntactic kind of a type expression. Keywords are distinct kinds per
/// keyword, so `string | number` is a mixed-kind union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Keyword(Keyword),
    Reference,
    Array,
    Object,
    Union,
    Literal,
    Function,
    Tuple,
    Optional,
    IndexedAccess,
    Mapped,
    Intersection,
    TypeOperator,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Member {
    Property(PropertyDecl),
    Method { name: String },
    Index(IndexSignature),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A property signature, class field or constructor parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeExpr>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub doc: String,
    /// Explicit modifier, if any. Class fields are public unless marked
    /// otherwise; constructor parameters only become properties when `public`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSignature {
    pub key: TypeExpr,
    pub value: TypeExpr,
}

/// Refinement markers found on the declaration enclosing a type usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hints<'a> {
    pub decorators: &'a [String],
    pub doc_tags: &'a [String],
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeExpr {
    pub fn keyword(keyword: Keyword) -> Self {
        TypeExpr::Keyword { keyword }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Reference { name: name.into(), args: Vec::new() }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Reference { name: name.into(), args }
    }

    pub fn array_of(element: TypeExpr) -> Self {
        TypeExpr::Array { element: Box::new(element) }
    }

    pub fn union_of(types: Vec<TypeExpr>) -> Self {
        TypeExpr::Union { types }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        TypeExpr::Literal { text: text.into() }
    }

    pub fn syntax_kind(&self) -> SyntaxKind {
        match self {
            TypeExpr::Keyword { keyword } => SyntaxKind::Keyword(*keyword),
            TypeExpr::Reference { .. } => SyntaxKind::Reference,
            TypeExpr::Array { .. } => SyntaxKind::Array,
            TypeExpr::Object { .. } => SyntaxKind::Object,
            TypeExpr::Union { .. } => SyntaxKind::Union,
            TypeExpr::Literal { .. } => SyntaxKind::Literal,
            TypeExpr::Function { .. } => SyntaxKind::Function,
            TypeExpr::Tuple { .. } => SyntaxKind::Tuple,
            TypeExpr::Optional { .. } => SyntaxKind::Optional,
            TypeExpr::IndexedAccess { .. } => SyntaxKind::IndexedAccess,
            TypeExpr::Mapped { .. } => SyntaxKind::Mapped,
            TypeExpr::Intersection { .. } => SyntaxKind::Intersection,
            TypeExpr::TypeOperator { .. } => SyntaxKind::TypeOperator,
            TypeExpr::Unsupported { .. } => SyntaxKind::Unsupported,
        }
    }

    /// Element type when this is `T[]` or `Array<T>`.
    pub fn array_element(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Array { element } => Some(element),
            TypeExpr::Reference { name, args } if name == "Array" && args.len() == 1 => args.first(),
            _ => None,
        }
    }

    /// Source-like rendering, used in error messages and enum members.
    pub fn source_text(&self) -> String {
        self.to_string()
    }
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::String => "string",
            Keyword::Number => "number",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::Any => "any",
            Keyword::Unknown => "unknown",
            Keyword::Object => "object",
            Keyword::Null => "null",
            Keyword::Undefined => "undefined",
            Keyword::Never => "never",
            Keyword::BigInt => "bigint",
            Keyword::Symbol => "symbol",
        }
    }
}

impl PropertyDecl {
    pub fn hints(&self) -> Hints<'_> {
        Hints { decorators: &self.decorators, doc_tags: &self.doc_tags }
    }

    pub fn is_function_typed(&self) -> bool {
        matches!(self.ty, Some(TypeExpr::Function { .. }))
    }
}

impl<'a> Hints<'a> {
    pub fn none() -> Self {
        Hints::default()
    }

    /// First decorator in `candidates` present on the site, else the first
    /// matching documentation tag.
    pub fn refinement(&self, candidates: &[&str]) -> Option<&'a str> {
        let decorator = self.decorators.iter().find(|d| candidates.contains(&d.as_str()));
        let tag = self.doc_tags.iter().find(|t| candidates.contains(&t.as_str()));
        decorator.or(tag).map(String::as_str)
    }

    pub fn decorator(&self, candidates: &[&str]) -> Option<&'a str> {
        self.decorators
            .iter()
            .find(|d| candidates.contains(&d.as_str()))
            .map(String::as_str)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntaxKind::Keyword(_) => "KeywordType",
            SyntaxKind::Reference => "TypeReference",
            SyntaxKind::Array => "ArrayType",
            SyntaxKind::Object => "TypeLiteral",
            SyntaxKind::Union => "UnionType",
            SyntaxKind::Literal => "LiteralType",
            SyntaxKind::Function => "FunctionType",
            SyntaxKind::Tuple => "TupleType",
            SyntaxKind::Optional => "OptionalType",
            SyntaxKind::IndexedAccess => "IndexedAccessType",
            SyntaxKind::Mapped => "MappedType",
            SyntaxKind::Intersection => "IntersectionType",
            SyntaxKind::TypeOperator => "TypeOperator",
            SyntaxKind::Unsupported => "Unknown",
        };
        f.write_str(name)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Keyword { keyword } => f.write_str(keyword.as_str()),
            TypeExpr::Reference { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    write_joined(f, args, ", ")?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeExpr::Array { element } => match element.as_ref() {
                TypeExpr::Union { .. } | TypeExpr::Intersection { .. } | TypeExpr::Function { .. } => {
                    write!(f, "({element})[]")
                }
                _ => write!(f, "{element}[]"),
            },
            TypeExpr::Object { members } => {
                if members.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    match member {
                        Member::Property(p) => {
                            let mark = if p.optional { "?" } else { "" };
                            match &p.ty {
                                Some(ty) => write!(f, "{}{mark}: {ty}", p.name)?,
                                None => write!(f, "{}{mark}", p.name)?,
                            }
                        }
                        Member::Method { name } => write!(f, "{name}()")?,
                        Member::Index(sig) => write!(f, "[key: {}]: {}", sig.key, sig.value)?,
                    }
                }
                f.write_str(" }")
            }
            TypeExpr::Union { types } => write_joined(f, types, " | "),
            TypeExpr::Intersection { types } => write_joined(f, types, " & "),
            TypeExpr::Literal { text }
            | TypeExpr::Function { text }
            | TypeExpr::Mapped { text }
            | TypeExpr::Unsupported { text, .. } => f.write_str(text),
            TypeExpr::Tuple { elements } => {
                f.write_str("[")?;
                write_joined(f, elements, ", ")?;
                f.write_str("]")
            }
            TypeExpr::Optional { inner } => write!(f, "{inner}?"),
            TypeExpr::IndexedAccess { object, index } => write!(f, "{object}[{index}]"),
            TypeExpr::TypeOperator { operator, target } => write!(f, "{operator} {target}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeExpr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_source_text() {
        let expr = TypeExpr::union_of(vec![
            TypeExpr::keyword(Keyword::String),
            TypeExpr::array_of(TypeExpr::generic("Box", vec![TypeExpr::keyword(Keyword::Number)])),
        ]);
        assert_eq!(expr.source_text(), "string | Box<number>[]");

        let tuple = TypeExpr::Tuple {
            elements: vec![TypeExpr::keyword(Keyword::String), TypeExpr::keyword(Keyword::Number)],
        };
        assert_eq!(tuple.source_text(), "[string, number]");
    }

    #[test]
    fn deserializes_tagged_expressions() {
        let v = json!({
            "kind": "object",
            "members": [
                { "kind": "property", "name": "x", "type": { "kind": "keyword", "keyword": "number" } },
                { "kind": "method", "name": "run" }
            ]
        });
        let expr: TypeExpr = serde_json::from_value(v).unwrap();
        let TypeExpr::Object { members } = &expr else { panic!("expected object literal") };
        assert_eq!(members.len(), 2);
        assert_eq!(expr.source_text(), "{ x: number; run() }");
    }

    #[test]
    fn array_element_covers_both_spellings() {
        let a = TypeExpr::array_of(TypeExpr::keyword(Keyword::String));
        let b = TypeExpr::generic("Array", vec![TypeExpr::keyword(Keyword::String)]);
        assert_eq!(a.array_element(), b.array_element());
        assert!(TypeExpr::named("Array").array_element().is_none());
    }

    #[test]
    fn decorator_wins_over_doc_tag() {
        let decorators = vec!["IsLong".to_string()];
        let doc_tags = vec!["IsInt".to_string()];
        let hints = Hints { decorators: &decorators, doc_tags: &doc_tags };
        assert_eq!(hints.refinement(&["IsInt", "IsLong"]), Some("IsLong"));
        assert_eq!(Hints::none().refinement(&["IsInt"]), None);
    }
}
