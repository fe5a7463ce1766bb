//! Payload layout of one entity kind.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::FetchError;
use crate::config::Config;
use crate::models::{DetailRecord, EntityRecord};

/// Placeholder replaced with the entity id in detail path templates
pub const ID_PLACEHOLDER: &str = "{id}";

/// Where a kind's detail records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailSource {
    /// The bulk entry already is the full record (Meraki items).
    Bulk,
    /// One request per entity; `{id}` in the template is replaced.
    Endpoint { template: String },
}

/// Describes how one entity kind is laid out upstream.
#[derive(Debug, Clone)]
pub struct EntityKind {
    /// Short label used in logs and errors
    pub label: &'static str,
    pub bulk_path: String,
    /// Key wrapping the id map in bulk and detail payloads (`data` on Data Dragon)
    pub envelope: Option<String>,
    /// JSON pointer to the tag array inside a record
    pub tags_pointer: String,
    pub detail: DetailSource,
}

impl EntityKind {
    /// A flat `{id: {...}}` payload with top-level `tags` and bulk-sourced details
    pub fn new(label: &'static str, bulk_path: impl Into<String>) -> Self {
        Self {
            label,
            bulk_path: bulk_path.into(),
            envelope: None,
            tags_pointer: "/tags".to_string(),
            detail: DetailSource::Bulk,
        }
    }

    pub fn with_envelope(mut self, key: impl Into<String>) -> Self {
        self.envelope = Some(key.into());
        self
    }

    pub fn with_tags_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.tags_pointer = pointer.into();
        self
    }

    pub fn with_detail_endpoint(mut self, template: impl Into<String>) -> Self {
        self.detail = DetailSource::Endpoint {
            template: template.into(),
        };
        self
    }

    /// Data Dragon `champion.json` plus `champion/{id}.json`
    pub fn champions(config: &Config) -> Self {
        Self::new("champions", config.champions_url())
            .with_envelope("data")
            .with_detail_endpoint(config.champion_detail_template())
    }

    /// Meraki `items.json`; item tags live under `shop.tags`
    pub fn items(config: &Config) -> Self {
        Self::new("items", config.items_url.clone()).with_tags_pointer("/shop/tags")
    }

    pub fn detail_path(&self, id: &str) -> Option<String> {
        match self.detail {
            DetailSource::Bulk => None,
            DetailSource::Endpoint { ref template } => Some(template.replace(ID_PLACEHOLDER, id)),
        }
    }

    /// Parse and unwrap a payload down to its id → entry object.
    fn unwrap_payload(&self, body: &[u8]) -> Result<serde_json::Map<String, Value>, FetchError> {
        let value: Value = serde_json::from_slice(body)?;
        let inner = match self.envelope {
            Some(ref key) => match value {
                Value::Object(mut outer) => outer.remove(key).ok_or_else(|| {
                    FetchError::Parse(format!("{} payload has no '{}' object", self.label, key))
                })?,
                _ => {
                    return Err(FetchError::Parse(format!(
                        "{} payload is not a JSON object",
                        self.label
                    )))
                }
            },
            None => value,
        };

        match inner {
            Value::Object(entries) => Ok(entries),
            _ => Err(FetchError::Parse(format!(
                "{} entries are not a JSON object",
                self.label
            ))),
        }
    }

    /// Parse a bulk payload into id → record.
    pub fn parse_bulk(&self, body: &[u8]) -> Result<BTreeMap<String, EntityRecord>, FetchError> {
        let entries = self.unwrap_payload(body)?;
        entries
            .into_iter()
            .map(|(id, entry)| {
                EntityRecord::from_entry(&id, entry)
                    .map(|record| (id.clone(), record))
                    .ok_or_else(|| {
                        FetchError::Parse(format!("{} entry '{}' is not an object", self.label, id))
                    })
            })
            .collect()
    }

    /// Parse a detail payload and pick out the entry for `id`.
    pub fn parse_detail(&self, id: &str, body: &[u8]) -> Result<DetailRecord, FetchError> {
        let mut entries = self.unwrap_payload(body)?;
        let entry = entries
            .remove(id)
            .ok_or_else(|| FetchError::NotFound(format!("{} '{}'", self.label, id)))?;
        DetailRecord::from_entry(id, entry)
            .ok_or_else(|| FetchError::Parse(format!("{} detail '{}' is not an object", self.label, id)))
    }
}
