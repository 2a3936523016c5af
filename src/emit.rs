//! Swagger-2 style rendering of a finished run.
//!
//! ```text
//! { "definitions": { <canonical name>: <definition> }, "roots": { <label>: <schema> } }
//! ```
use serde_json::{Map, Value, json};

use crate::error::Warning;
use crate::generate::Metadata;
use crate::ir::{Primitive, Property, ReferenceType, SchemaType};
use crate::resolve::ResolvedGraph;

pub fn emit_document(metadata: &Metadata) -> Value {
    let graph = &metadata.graph;

    let mut definitions = Map::new();
    for (name, id) in &graph.reference_types {
        definitions.insert(name.clone(), definition_schema(graph, &graph[*id]));
    }
    // placeholders that never found their definition still need a target
    for warning in &graph.warnings {
        if let Warning::UnresolvedPlaceholder { name } = warning {
            definitions
                .entry(name.clone())
                .or_insert_with(|| obj_of(Vec::new(), Vec::new()));
        }
    }

    let roots: Map<String, Value> = metadata
        .roots
        .iter()
        .map(|(label, ty)| (label.clone(), type_schema(graph, ty)))
        .collect();

    json!({ "definitions": definitions, "roots": roots })
}

pub fn type_schema(graph: &ResolvedGraph, ty: &SchemaType) -> Value {
    match ty {
        SchemaType::Primitive { name } => primitive_schema(*name),
        SchemaType::Array { element } => json!({ "type": "array", "items": type_schema(graph, element) }),
        SchemaType::Object { properties } => properties_schema(graph, properties),
        SchemaType::Enum { members } => json!({ "type": "string", "enum": members }),
        SchemaType::Reference { id } => json!({ "$ref": format!("#/definitions/{}", graph[*id].name) }),
    }
}

pub fn definition_schema(graph: &ResolvedGraph, reference: &ReferenceType) -> Value {
    let mut schema = properties_schema(graph, &reference.properties);
    if !reference.description.is_empty() {
        schema["description"] = Value::from(reference.description.as_str());
    }
    if let Some(first) = reference.additional_properties.as_ref().and_then(|a| a.first()) {
        schema["additionalProperties"] = type_schema(graph, &first.ty);
    }
    schema
}

pub fn primitive_schema(primitive: Primitive) -> Value {
    match primitive {
        Primitive::String => json!({ "type": "string" }),
        Primitive::Boolean => json!({ "type": "boolean" }),
        Primitive::Integer => json!({ "type": "integer", "format": "int32" }),
        Primitive::Long => json!({ "type": "integer", "format": "int64" }),
        Primitive::Float => json!({ "type": "number", "format": "float" }),
        Primitive::Double => json!({ "type": "number", "format": "double" }),
        Primitive::Date => json!({ "type": "string", "format": "date" }),
        Primitive::DateTime => json!({ "type": "string", "format": "date-time" }),
        Primitive::Buffer => json!({ "type": "string", "format": "binary" }),
        Primitive::Void => json!({}),
    }
}

fn properties_schema(graph: &ResolvedGraph, properties: &[Property]) -> Value {
    let mut props = Vec::with_capacity(properties.len());
    let mut required = Vec::new();
    for property in properties {
        let mut schema = type_schema(graph, &property.ty);
        if !property.description.is_empty() {
            if let Value::Object(map) = &mut schema {
                map.insert("description".into(), Value::from(property.description.as_str()));
            }
        }
        if property.required {
            required.push(property.name.clone());
        }
        props.push((property.name.clone(), schema));
    }
    obj_of(props, required)
}

fn obj_of(props: Vec<(String, Value)>, required: Vec<String>) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::from("object"));
    let mut props_map = Map::new();
    for (k, v) in props {
        props_map.insert(k, v);
    }
    map.insert("properties".into(), Value::Object(props_map));
    if !required.is_empty() {
        map.insert(
            "required".into(),
            Value::Array(required.into_iter().map(Value::from).collect()),
        );
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{DeclarationGraph, generate_graph};
    use crate::ir::ReferenceStore;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn metadata(document: Value) -> Metadata {
        generate_graph(DeclarationGraph::from_value(document).unwrap()).unwrap()
    }

    #[test]
    fn primitives_carry_formats() {
        assert_eq!(primitive_schema(Primitive::Long), json!({ "type": "integer", "format": "int64" }));
        assert_eq!(primitive_schema(Primitive::DateTime), json!({ "type": "string", "format": "date-time" }));
        assert_eq!(primitive_schema(Primitive::Void), json!({}));
    }

    #[test]
    fn emits_definitions_and_roots() {
        let metadata = metadata(json!({
            "declarations": [
                { "kind": "enum", "name": "Role", "members": ["Admin", "Guest"] },
                { "kind": "interface", "name": "User", "doc": "A user.", "members": [
                    { "kind": "property", "name": "id", "doc": "Identifier.", "type": { "kind": "keyword", "keyword": "string" } },
                    { "kind": "property", "name": "role", "optional": true, "type": { "kind": "reference", "name": "Role" } },
                    { "kind": "property", "name": "friends", "type": { "kind": "array", "element": { "kind": "reference", "name": "User" } } }
                ] },
                { "kind": "interface", "name": "Labels", "members": [
                    { "kind": "index", "key": { "kind": "keyword", "keyword": "string" }, "value": { "kind": "keyword", "keyword": "boolean" } }
                ] }
            ],
            "roots": [
                { "label": "user", "type": { "kind": "reference", "name": "User" } },
                { "label": "labels", "type": { "kind": "reference", "name": "Labels" } }
            ]
        }));
        let document = emit_document(&metadata);
        assert_eq!(
            document,
            json!({
                "definitions": {
                    "User": {
                        "type": "object",
                        "description": "A user.",
                        "properties": {
                            "id": { "type": "string", "description": "Identifier." },
                            "role": { "type": "string", "enum": ["Admin", "Guest"] },
                            "friends": { "type": "array", "items": { "$ref": "#/definitions/User" } }
                        },
                        "required": ["id", "friends"]
                    },
                    "Labels": {
                        "type": "object",
                        "properties": {},
                        "additionalProperties": { "type": "boolean" }
                    }
                },
                "roots": {
                    "user": { "$ref": "#/definitions/User" },
                    "labels": { "$ref": "#/definitions/Labels" }
                }
            })
        );
    }

    #[test]
    fn unresolved_placeholders_get_empty_definitions() {
        let mut references = ReferenceStore::default();
        let ghost = references.alloc(ReferenceType::placeholder("Ghost"));
        let metadata = Metadata {
            roots: IndexMap::from([("ghost".to_string(), SchemaType::Reference { id: ghost })]),
            graph: ResolvedGraph {
                references,
                reference_types: IndexMap::new(),
                warnings: vec![Warning::UnresolvedPlaceholder { name: "Ghost".into() }],
            },
        };
        let document = emit_document(&metadata);
        assert_eq!(document["definitions"]["Ghost"], json!({ "type": "object", "properties": {} }));
        assert_eq!(document["roots"]["ghost"], json!({ "$ref": "#/definitions/Ghost" }));
    }
}
