use once_cell::sync::Lazy;
use regex::Regex;

use super::{GenericBindings, Result, TypeResolver, primitive};
use crate::error::{ResolveError, Warning};
use crate::expr::{Hints, TypeExpr};
use crate::ir::SchemaType;

static SURROUNDING_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^["'`]|["'`]$"#).expect("quote pattern is valid"));

pub(crate) fn strip_quotes(text: &str) -> String {
    SURROUNDING_QUOTES.replace_all(text, "").into_owned()
}

impl TypeResolver<'_> {
    /// Arrays, object literals and unions. Every other unnamed kind fails fast.
    pub(crate) fn resolve_structural(
        &mut self,
        expr: &TypeExpr,
        bindings: Option<&GenericBindings>,
        hints: Hints<'_>,
    ) -> Result<SchemaType> {
        match expr {
            TypeExpr::Array { element } => Ok(SchemaType::array_of(self.resolve_type(element, bindings)?)),
            TypeExpr::Object { members } => Ok(SchemaType::Object {
                properties: self.member_properties("object literal", members, bindings)?,
            }),
            TypeExpr::Union { types } => self.resolve_union(expr, types, bindings, hints),
            TypeExpr::Keyword { .. }
            | TypeExpr::Reference { .. }
            | TypeExpr::Literal { .. }
            | TypeExpr::Function { .. }
            | TypeExpr::Tuple { .. }
            | TypeExpr::Optional { .. }
            | TypeExpr::IndexedAccess { .. }
            | TypeExpr::Mapped { .. }
            | TypeExpr::Intersection { .. }
            | TypeExpr::TypeOperator { .. }
            | TypeExpr::Unsupported { .. } => Err(ResolveError::unsupported(expr.syntax_kind(), expr.source_text())),
        }
    }

    fn resolve_union(
        &mut self,
        expr: &TypeExpr,
        types: &[TypeExpr],
        bindings: Option<&GenericBindings>,
        hints: Hints<'_>,
    ) -> Result<SchemaType> {
        if let Some(collapsed) = collapse_scalar_or_array(types, bindings, hints) {
            return Ok(collapsed);
        }

        let mixed = types
            .first()
            .map(|first| types.iter().any(|t| t.syntax_kind() != first.syntax_kind()))
            .unwrap_or(false);
        if mixed {
            let text = expr.source_text();
            tracing::warn!(union = %text, "union mixes kinds, rendering an empty object");
            self.cx.warnings.push(Warning::HeterogeneousUnion { text });
            return Ok(SchemaType::empty_object());
        }

        let members = types
            .iter()
            .enumerate()
            .map(|(i, t)| match t.source_text() {
                text if text.is_empty() => i.to_string(),
                text => strip_quotes(&text),
            })
            .collect();
        Ok(SchemaType::Enum { members })
    }
}

/// `P | P[]` (either order, either array spelling) → `P[]`, for primitive
/// `P` only. Neither branch is resolved beyond the primitive check.
fn collapse_scalar_or_array(
    types: &[TypeExpr],
    bindings: Option<&GenericBindings>,
    hints: Hints<'_>,
) -> Option<SchemaType> {
    let [a, b] = types else {
        return None;
    };
    let (element, scalar) = match (a.array_element(), b.array_element()) {
        (Some(element), None) => (element, b),
        (None, Some(element)) => (element, a),
        _ => return None,
    };
    let substitute = |t: &TypeExpr| bindings.map_or_else(|| t.clone(), |b| b.apply(t));
    let scalar = primitive::resolve_primitive(&substitute(scalar), hints)?;
    let element = primitive::resolve_primitive(&substitute(element), hints)?;
    (element == scalar).then(|| SchemaType::array_of(element))
}
