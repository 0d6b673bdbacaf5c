//! Identified items: the entries of a declarative snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open field map of an item (or of a nested sub-item).
pub type Fields = Map<String, Value>;

/// A record with a unique identifier plus open display fields.
///
/// The identifier is the source URL of the volume or mesh. Two items in
/// different snapshots are the same item iff their URLs are equal, whatever
/// their fields hold. Field values are JSON primitives, arrays (opaque), or
/// objects mapping sub-identifiers to sub-items (e.g. a mesh's `layers`).
///
/// Serialized flat, as the viewer expects: `{"url": "...", "opacity": 0.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub url: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Item {
    /// Create an item with no display fields
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: Fields::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a display field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A copy of this item with the named fields dropped
    pub fn without_fields(&self, keys: &[&str]) -> Item {
        let fields = self
            .fields
            .iter()
            .filter(|(k, _)| !keys.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Item {
            url: self.url.clone(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_serializes_flat() {
        let item = Item::new("https://example.com/brain.nii.gz").with_field("opacity", 0.5);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({"url": "https://example.com/brain.nii.gz", "opacity": 0.5})
        );
    }

    #[test]
    fn test_item_deserializes_nested_layers() {
        let item: Item = serde_json::from_value(json!({
            "url": "https://example.com/lh.wm.mz3",
            "layers": {"curv": {"url": "https://example.com/curv.mz3", "opacity": 0.0}}
        }))
        .unwrap();
        assert_eq!(item.url, "https://example.com/lh.wm.mz3");
        assert!(item.get("layers").map(Value::is_object).unwrap_or(false));
        assert!(item.get("url").is_none());
    }

    #[test]
    fn test_without_fields_keeps_url_and_others() {
        let item = Item::new("a")
            .with_field("modulationImageUrl", "b")
            .with_field("modulateAlpha", 1)
            .with_field("colormap", "winter");
        let stripped = item.without_fields(&["modulationImageUrl", "modulateAlpha"]);
        assert_eq!(stripped, Item::new("a").with_field("colormap", "winter"));
    }
}
