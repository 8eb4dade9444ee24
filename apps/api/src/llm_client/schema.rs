//! Response schemas for structured generative calls.
//!
//! Mirrors the subset of the API's OpenAPI-style schema object the pipeline needs:
//! scalar types, arrays of a single item type, and objects whose properties are all required.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Integer,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<&'static str, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<&'static str>>,
}

impl Schema {
    fn scalar(kind: SchemaType) -> Self {
        Self {
            kind,
            items: None,
            properties: None,
            required: None,
        }
    }

    pub fn string() -> Self {
        Self::scalar(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::scalar(SchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::scalar(SchemaType::Boolean)
    }

    pub fn array_of(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::scalar(SchemaType::Array)
        }
    }

    /// Object schema; every listed property is required, in the order given.
    pub fn object(fields: Vec<(&'static str, Schema)>) -> Self {
        let required = fields.iter().map(|(name, _)| *name).collect();
        Self {
            properties: Some(fields.into_iter().collect()),
            required: Some(required),
            ..Self::scalar(SchemaType::Object)
        }
    }
}
