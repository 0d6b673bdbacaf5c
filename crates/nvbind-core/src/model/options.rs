//! Global viewer options.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Fields;

/// Global options of the viewer instance, e.g. `crosshairWidth` or `isOrientCube`.
///
/// Keys are routed by the mutator's routing table to a dedicated setter, the
/// viewer's options bag, or a top-level instance field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerOptions(Fields);

impl ViewerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style option assignment
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_fields(&self) -> &Fields {
        &self.0
    }
}

impl From<Fields> for ViewerOptions {
    fn from(fields: Fields) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_round_trip_as_plain_object() {
        let options = ViewerOptions::new()
            .with("isColorbar", true)
            .with("backColor", json!([0.2, 0.2, 0.3, 1]));
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({"isColorbar": true, "backColor": [0.2, 0.2, 0.3, 1]})
        );
        let back: ViewerOptions = serde_json::from_value(value).unwrap();
        assert_eq!(back, options);
    }
}
