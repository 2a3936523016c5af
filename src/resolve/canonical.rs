//! Canonical names: the cache key of a (possibly generic) reference.
//!
//! `Page<User[]>` → `PageUserArray`, `Pair<string, Box<number>>` →
//! `PairstringBoxnumber`. Unions and anything without a stable name render as
//! `object`.

use crate::expr::{Keyword, TypeExpr};

pub fn canonical_name(base: &str, args: &[TypeExpr]) -> String {
    let mut name = base.to_string();
    for arg in args {
        name.push_str(&argument_name(arg));
    }
    name
}

pub fn argument_name(arg: &TypeExpr) -> String {
    if let Some(element) = arg.array_element() {
        return format!("{}Array", argument_name(element));
    }
    match arg {
        TypeExpr::Keyword { keyword: Keyword::Any | Keyword::Unknown | Keyword::Object } => "object".to_string(),
        TypeExpr::Keyword { keyword } => keyword.as_str().to_string(),
        TypeExpr::Reference { name, args } => canonical_name(name, args),
        _ => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(keyword: Keyword) -> TypeExpr {
        TypeExpr::keyword(keyword)
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(canonical_name("User", &[]), "User");
        assert_eq!(canonical_name("Api.User", &[]), "Api.User");
    }

    #[test]
    fn generic_arguments_are_appended() {
        assert_eq!(canonical_name("Box", &[kw(Keyword::String)]), "Boxstring");
        assert_eq!(canonical_name("Box", &[kw(Keyword::Number)]), "Boxnumber");
        assert_eq!(
            canonical_name("Page", &[TypeExpr::array_of(TypeExpr::named("User"))]),
            "PageUserArray"
        );
        assert_eq!(
            canonical_name("Page", &[TypeExpr::generic("Array", vec![kw(Keyword::String)])]),
            "PagestringArray"
        );
    }

    #[test]
    fn nested_generics_recurse() {
        let arg = TypeExpr::generic("Box", vec![kw(Keyword::Number)]);
        assert_eq!(canonical_name("Pair", &[kw(Keyword::String), arg]), "PairstringBoxnumber");
    }

    #[test]
    fn unnameable_arguments_render_object() {
        let union = TypeExpr::union_of(vec![kw(Keyword::String), kw(Keyword::Number)]);
        assert_eq!(canonical_name("Box", &[union]), "Boxobject");
        assert_eq!(canonical_name("Box", &[kw(Keyword::Any)]), "Boxobject");
        assert_eq!(canonical_name("Box", &[TypeExpr::Object { members: vec![] }]), "Boxobject");
    }
}
