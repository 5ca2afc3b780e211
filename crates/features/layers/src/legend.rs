use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description used when a protocol has nothing better to say.
pub const DEFAULT_LEGEND_DESCRIPTION: &str = "Legend";

/// One legend image. A normalized layer always carries a list of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub url: String,
    pub description: String,
}

impl LegendEntry {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self { url: url.into(), description: description.into() }
    }
}

/// The legend shapes found in catalog entries, read once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegendRef {
    /// A single image URL, `https://` added when no scheme was written.
    Absolute(String),
    /// Inline images: one or more `data:` URIs joined with `#`.
    DataUri(Vec<String>),
    /// A list of image URLs, used as written.
    Sequence(Vec<String>),
}

impl LegendRef {
    /// `None` for an empty string, an empty list, or a value of any other shape.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::from_text(text),
            Value::Array(items) => {
                let urls: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(url) => Some(url.as_str()),
                        Value::Object(entry) => entry.get("url").and_then(Value::as_str),
                        _ => None,
                    })
                    .filter(|url| !url.is_empty())
                    .map(str::to_owned)
                    .collect();
                (!urls.is_empty()).then_some(Self::Sequence(urls))
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        if text.starts_with("data") {
            let parts = text.split('#').filter(|p| !p.is_empty()).map(str::to_owned).collect();
            return Some(Self::DataUri(parts));
        }
        Some(Self::Absolute(with_scheme(text)))
    }

    /// Flattens into one entry per image.
    #[must_use]
    pub fn into_entries(self, description: &str) -> Vec<LegendEntry> {
        match self {
            Self::Absolute(url) => vec![LegendEntry::new(url, description)],
            Self::DataUri(urls) | Self::Sequence(urls) => {
                urls.into_iter().map(|url| LegendEntry::new(url, description)).collect()
            },
        }
    }
}

/// Prefixes `https://` onto anything that does not already start with `http`.
#[must_use]
pub fn with_scheme(url: &str) -> String {
    if url.starts_with("http") { url.to_owned() } else { format!("https://{url}") }
}

/// Legend entries for an optional raw legend value; empty when there is none.
pub(crate) fn entries_from(value: Option<&Value>, description: &str) -> Vec<LegendEntry> {
    value.and_then(LegendRef::from_value).map(|r| r.into_entries(description)).unwrap_or_default()
}
