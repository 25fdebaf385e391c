//! # Records
//!
//! A [`Record`] is the untyped state behind every model instance: the attribute map,
//! the error collection and the per-instance association cache. Typed models
//! (see [`Model`](crate::framework::Model)) are thin wrappers around one.
//!
//! A record is **new** exactly when its `id` attribute is absent or `null`.

use crate::framework::resolver::AssociationCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON attribute map, keyed by attribute name.
pub type Attributes = serde_json::Map<String, Value>;

/// Attribute → messages collected from validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors(BTreeMap<String, Vec<String>>);

impl Errors {
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.0
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for `attribute` (empty when none).
    pub fn get(&self, attribute: &str) -> &[String] {
        self.0.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all attributes.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `"name can't be blank"` style messages; `base` messages are emitted bare.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(attribute, messages)| {
                messages.iter().map(move |message| {
                    if attribute == "base" {
                        message.clone()
                    } else {
                        format!("{attribute} {message}")
                    }
                })
            })
            .collect()
    }

    /// Folds a server error payload into the collection.
    ///
    /// Reads the body's `errors` field, which may be `{"name": ["can't be blank"]}`,
    /// `{"name": "can't be blank"}` or a bare list of messages (stored under `base`).
    /// Returns how many messages were added.
    pub fn absorb(&mut self, body: &Value) -> usize {
        let errors = match body.get("errors") {
            Some(errors) => errors,
            None => return 0,
        };
        self.absorb_errors(errors)
    }

    fn absorb_errors(&mut self, errors: &Value) -> usize {
        let before = self.len();
        match errors {
            Value::Object(fields) => {
                for (attribute, messages) in fields {
                    match messages {
                        Value::Array(list) => {
                            for message in list {
                                self.add(attribute.clone(), message_text(message));
                            }
                        }
                        Value::Null => {}
                        other => self.add(attribute.clone(), message_text(other)),
                    }
                }
            }
            Value::Array(list) => {
                for message in list {
                    self.add("base", message_text(message));
                }
            }
            Value::String(message) => self.add("base", message.clone()),
            _ => {}
        }
        self.len() - before
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text form of an attribute value used in URIs and cache keys.
///
/// `null` has no text form; strings are taken verbatim, everything else is its JSON text.
pub fn value_to_segment(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// State of one model instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Attributes,
    errors: Errors,
    associations: AssociationCache,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Value of `name`, treating `null` as absent.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|value| !value.is_null())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Merges `attributes` over the current set; incoming values win.
    pub fn merge_attributes(&mut self, attributes: Attributes) {
        for (name, value) in attributes {
            self.attributes.insert(name, value);
        }
    }

    /// Replaces the whole attribute set, keeping errors and association cache.
    pub fn replace_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    pub fn id(&self) -> Option<&Value> {
        self.attribute("id")
    }

    /// The id in URI form.
    pub fn id_segment(&self) -> Option<String> {
        self.id().and_then(value_to_segment)
    }

    pub fn is_new_record(&self) -> bool {
        self.id().is_none()
    }

    pub fn is_persisted(&self) -> bool {
        !self.is_new_record()
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    pub fn associations(&self) -> &AssociationCache {
        &self.associations
    }

    pub fn associations_mut(&mut self) -> &mut AssociationCache {
        &mut self.associations
    }

    /// Relation names implied by `{relation}_id` attributes, e.g. `brand` for `brand_id`.
    pub fn id_relations(&self) -> Vec<String> {
        self.attributes
            .keys()
            .filter_map(|key| key.strip_suffix("_id"))
            .filter(|relation| !relation.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<Attributes> for Record {
    fn from(attributes: Attributes) -> Self {
        Record::from_attributes(attributes)
    }
}
