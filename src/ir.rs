// Schema IR produced by resolution. Everything is value-like except
// references, which point into the `ReferenceStore` arena.

use std::ops::{Index, IndexMut};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    DateTime,
    Buffer,
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "typeName", rename_all = "camelCase")]
pub enum SchemaType {
    Primitive { name: Primitive },
    Array { element: Box<SchemaType> },
    /// Anonymous object; empty for heterogeneous unions.
    Object { properties: Vec<Property> },
    Enum { members: Vec<String> },
    Reference { id: RefId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub ty: SchemaType,
    pub required: bool,
}

/// Named, cached schema entry. Placeholders start empty and are patched in
/// place once the cycle they broke has been resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceType {
    pub name: String,
    pub description: String,
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Vec<Property>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RefId(u32);

/// Arena of reference slots for one generation run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ReferenceStore {
    slots: Vec<ReferenceType>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Boolean => "boolean",
            Primitive::Date => "date",
            Primitive::DateTime => "datetime",
            Primitive::Buffer => "buffer",
            Primitive::Void => "void",
        }
    }
}

impl SchemaType {
    pub fn primitive(name: Primitive) -> Self {
        SchemaType::Primitive { name }
    }

    pub fn array_of(element: SchemaType) -> Self {
        SchemaType::Array { element: Box::new(element) }
    }

    pub fn empty_object() -> Self {
        SchemaType::Object { properties: Vec::new() }
    }

    pub fn as_reference(&self) -> Option<RefId> {
        match self {
            SchemaType::Reference { id } => Some(*id),
            _ => None,
        }
    }

    /// Short label used in diagnostics: the primitive name or the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaType::Primitive { name } => name.as_str(),
            SchemaType::Array { .. } => "array",
            SchemaType::Object { .. } => "object",
            SchemaType::Enum { .. } => "enum",
            SchemaType::Reference { .. } => "reference",
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            SchemaType::Primitive { name } => Some(*name),
            _ => None,
        }
    }
}

impl Property {
    pub fn new(name: impl Into<String>, ty: SchemaType, required: bool) -> Self {
        Property { name: name.into(), description: String::new(), ty, required }
    }
}

impl ReferenceType {
    pub fn placeholder(name: impl Into<String>) -> Self {
        ReferenceType { name: name.into(), ..Default::default() }
    }

    pub fn is_unpopulated(&self) -> bool {
        self.description.is_empty() && self.properties.is_empty() && self.additional_properties.is_none()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Add the base properties this slot lacks and fill in missing
    /// descriptions. Own properties win. Returns whether anything changed.
    pub fn inherit(&mut self, inherited: &[Property]) -> bool {
        let mut changed = false;
        for property in inherited {
            match self.properties.iter_mut().find(|p| p.name == property.name) {
                Some(existing) => {
                    if existing.description.is_empty() && !property.description.is_empty() {
                        existing.description.clone_from(&property.description);
                        changed = true;
                    }
                }
                None => {
                    self.properties.push(property.clone());
                    changed = true;
                }
            }
        }
        changed
    }

    /// Overwrite this slot's content with `source`, keeping the slot itself.
    pub fn patch_from(&mut self, source: &ReferenceType) {
        self.name.clone_from(&source.name);
        self.description.clone_from(&source.description);
        self.properties.clone_from(&source.properties);
        self.additional_properties.clone_from(&source.additional_properties);
    }
}

impl ReferenceStore {
    pub fn alloc(&mut self, reference: ReferenceType) -> RefId {
        let id = RefId(self.slots.len() as u32);
        self.slots.push(reference);
        id
    }

    pub fn get(&self, id: RefId) -> Option<&ReferenceType> {
        self.slots.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Let slot `into` inherit the properties of slot `from`.
    pub fn merge_slot(&mut self, from: RefId, into: RefId) -> bool {
        if from == into {
            return false;
        }
        let inherited = self[from].properties.clone();
        self[into].inherit(&inherited)
    }

    /// Copy slot `from` into slot `into`. No-op when both are the same slot.
    pub fn copy_slot(&mut self, from: RefId, into: RefId) {
        if from == into {
            return;
        }
        let source = self[from].clone();
        self[into].patch_from(&source);
    }
}

impl Index<RefId> for ReferenceStore {
    type Output = ReferenceType;

    fn index(&self, id: RefId) -> &ReferenceType {
        &self.slots[id.0 as usize]
    }
}

impl IndexMut<RefId> for ReferenceStore {
    fn index_mut(&mut self, id: RefId) -> &mut ReferenceType {
        &mut self.slots[id.0 as usize]
    }
}
