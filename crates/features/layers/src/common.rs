//! Pieces shared by several protocol mappers.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Info-panel and time-slider fields carried through unchanged by most mappers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfoFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_title: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_text: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_url: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_url_text: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_owner: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_expand_arrow: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slider_start: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slider_end: Option<Value>,
}

impl InfoFields {
    /// `infoVisible` is always present in normalized output.
    pub(crate) fn normalized(self) -> Self {
        Self { info_visible: Some(self.info_visible.unwrap_or(false)), ..self }
    }
}

/// Zoom limits after the `0/0` "never set" sentinel is cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ZoomRange {
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
}

impl ZoomRange {
    pub(crate) fn new(min: Option<f64>, max: Option<f64>) -> Self {
        if min == Some(0.0) && max == Some(0.0) {
            return Self::default();
        }
        Self { min, max }
    }
}

/// Opacity with unset or non-positive values read as fully opaque.
pub(crate) fn opacity_or_opaque(opacity: Option<f64>) -> f64 {
    opacity.filter(|o| *o > 0.0).unwrap_or(1.0)
}

/// Accepts a JSON string, number or `null` and yields a string.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("expected a string, found {other}"))),
    }
}

/// Accepts either a JSON array of names or a single comma-separated string.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => {
            Ok(s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect())
        },
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(D::Error::custom(format!("expected a layer name, found {other}"))),
            })
            .collect(),
        other => Err(D::Error::custom(format!("expected a list of names, found {other}"))),
    }
}

/// Whether a pass-through value carries anything (`""`, `[]` and `null` do not).
pub(crate) fn has_content(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}
