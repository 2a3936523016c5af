//! Keyword and built-in name → primitive mapping.

use crate::expr::{Hints, Keyword, TypeExpr};
use crate::ir::{Primitive, SchemaType};

const NUMERIC_REFINEMENTS: [&str; 4] = ["IsInt", "IsLong", "IsFloat", "IsDouble"];
const DATE_REFINEMENTS: [&str; 2] = ["IsDate", "IsDateTime"];

/// `None` when `expr` is not a keyword with a primitive counterpart.
pub fn resolve_primitive(expr: &TypeExpr, hints: Hints<'_>) -> Option<SchemaType> {
    let TypeExpr::Keyword { keyword } = expr else {
        return None;
    };
    let name = match keyword {
        Keyword::String => Primitive::String,
        Keyword::Boolean => Primitive::Boolean,
        Keyword::Void => Primitive::Void,
        Keyword::Number => numeric(hints),
        _ => return None,
    };
    Some(SchemaType::primitive(name))
}

fn numeric(hints: Hints<'_>) -> Primitive {
    match hints.refinement(&NUMERIC_REFINEMENTS) {
        Some("IsInt") => Primitive::Integer,
        Some("IsLong") => Primitive::Long,
        Some("IsFloat") => Primitive::Float,
        _ => Primitive::Double,
    }
}

/// Named types that map straight to a primitive, regardless of the graph.
pub fn resolve_builtin(simple_name: &str, hints: Hints<'_>) -> Option<SchemaType> {
    let name = match simple_name {
        // only decorators refine dates; doc tags are ignored here
        "Date" => match hints.decorator(&DATE_REFINEMENTS) {
            Some("IsDate") => Primitive::Date,
            _ => Primitive::DateTime,
        },
        "Buffer" | "DownloadBinaryData" | "DownloadResource" => Primitive::Buffer,
        _ => return None,
    };
    Some(SchemaType::primitive(name))
}
