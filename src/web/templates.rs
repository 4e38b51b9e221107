//! Askama HTML templates for the web UI

use askama::Template;
use serde_json::{Map, Value};

use crate::backend::FieldDescriptor;

// ============== Home ==============

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub collections: Vec<String>,
}

// ============== Create ==============

/// Schema field display for templates
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDisplay {
    pub name: String,
    pub field_type: String,
    /// Options rendered as compact JSON, empty when there are none
    pub options: String,
}

impl From<&FieldDescriptor> for FieldDisplay {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            options: options_json(&field.options),
        }
    }
}

impl FieldDisplay {
    /// Build from an untyped schema entry returned by the backend
    fn from_value(value: &Value) -> Option<Self> {
        let field = value.as_object()?;
        Some(Self {
            name: string_field(field, "name"),
            field_type: string_field(field, "type"),
            options: field
                .get("options")
                .and_then(Value::as_object)
                .map(options_json)
                .unwrap_or_default(),
        })
    }
}

fn options_json(options: &Map<String, Value>) -> String {
    if options.is_empty() {
        String::new()
    } else {
        Value::Object(options.clone()).to_string()
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[derive(Template)]
#[template(path = "create_collection.html")]
pub struct CreateCollectionTemplate {
    pub collection_type: String,
    pub fields: Vec<FieldDisplay>,
}

// ============== Collection detail ==============

#[derive(Template)]
#[template(path = "collection.html")]
pub struct CollectionTemplate {
    pub name: String,
    pub collection_type: String,
    pub fields: Vec<FieldDisplay>,
    pub raw_json: String,
}

impl CollectionTemplate {
    /// Build the detail view from the backend's untyped collection object.
    ///
    /// Older backends list fields under `schema`, newer ones under `fields`.
    pub fn from_collection(requested_name: &str, collection: Map<String, Value>) -> Self {
        let name = collection
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(requested_name)
            .to_string();

        let fields: Vec<FieldDisplay> = ["schema", "fields"]
            .iter()
            .find_map(|key| collection.get(*key).and_then(Value::as_array))
            .map(|entries| entries.iter().filter_map(FieldDisplay::from_value).collect())
            .unwrap_or_default();

        let collection_type = string_field(&collection, "type");
        let raw_json = serde_json::to_string_pretty(&Value::Object(collection)).unwrap_or_default();

        Self {
            name,
            collection_type,
            fields,
            raw_json,
        }
    }
}
