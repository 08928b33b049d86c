use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Type token of a schema property. `Raw` carries documentation phrasings
/// that none of the classification rules recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Number,
    Array,
    Object,
    Boolean,
    Raw(String),
}

impl SchemaType {
    /// Map a verbatim type text onto a canonical token when it is one.
    pub fn from_token(raw: &str) -> Self {
        match raw.trim() {
            "string" => SchemaType::String,
            "number" => SchemaType::Number,
            "array" => SchemaType::Array,
            "object" => SchemaType::Object,
            "boolean" => SchemaType::Boolean,
            _ => SchemaType::Raw(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Boolean => "boolean",
            SchemaType::Raw(raw) => raw,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, SchemaType::Raw(_))
    }
}

impl Serialize for SchemaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Element type of an array property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Number,
    String,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Items {
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDescriptor {
    pub title: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AttributeDescriptor {
    /// Optional plain string, the shape of an attribute with no metadata block.
    pub fn new(title: &str) -> Self {
        AttributeDescriptor {
            title: title.to_string(),
            required: false,
            schema_type: SchemaType::String,
            items: None,
            enum_values: None,
            default: None,
            description: None,
        }
    }
}

/// Attribute descriptors keyed by title, kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<AttributeDescriptor>,
}

impl Properties {
    /// Insert under the descriptor's title. A repeated title replaces the
    /// earlier descriptor but keeps its position.
    pub fn insert(&mut self, descriptor: AttributeDescriptor) {
        match self.entries.iter_mut().find(|d| d.title == descriptor.title) {
            Some(existing) => *existing = descriptor,
            None => self.entries.push(descriptor),
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, title: &str) -> Option<&AttributeDescriptor> {
        self.entries.iter().find(|d| d.title == title)
    }

    #[allow(dead_code)]
    pub fn contains(&self, title: &str) -> bool {
        self.get(title).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for descriptor in &self.entries {
            map.serialize_entry(&descriptor.title, descriptor)?;
        }
        map.end()
    }
}

/// One documentation page turned into a JSON object schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub title: String,
    pub name: String,
    pub properties: Properties,
}

impl Schema {
    pub fn new(title: &str, name: &str) -> Self {
        Schema {
            title: title.to_string(),
            name: name.to_string(),
            properties: Properties::default(),
        }
    }

    /// Titles of required properties, in property order.
    pub fn required(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|d| d.required)
            .map(|d| d.title.as_str())
            .collect()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Schema", 5)?;
        s.serialize_field("type", "object")?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("properties", &self.properties)?;
        s.serialize_field("required", &self.required())?;
        s.end()
    }
}
