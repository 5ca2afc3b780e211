use serde::{Deserialize, Deserializer, Serialize};

/// The `visibleForGroups` restriction carried by tools, layers and groups.
///
/// Empty (or `null`, or absent) means unrestricted. Order is kept as written in the
/// document because membership checks short-circuit in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VisibleForGroups(Vec<String>);

impl VisibleForGroups {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(groups.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn unrestricted() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Groups in document order, each listed once.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .enumerate()
            .filter(|(i, g)| !self.0[..*i].contains(g))
            .map(|(_, g)| g.as_str())
    }
}

impl<'de> Deserialize<'de> for VisibleForGroups {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default()))
    }
}
