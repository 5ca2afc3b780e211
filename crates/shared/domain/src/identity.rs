use serde::{Deserialize, Serialize};
use std::fmt;

/// The user a configuration is requested for.
///
/// The name comes from the surrounding transport (a trusted header) and is only ever
/// compared against the directory; an empty name is the anonymous identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_owned())
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Option<&str>> for Identity {
    fn from(value: Option<&str>) -> Self {
        value.map_or_else(Self::anonymous, Self::new)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() { f.write_str("<anonymous>") } else { f.write_str(&self.0) }
    }
}
