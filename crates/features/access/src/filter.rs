use crate::directory::DirectoryResolver;
use crate::error::DirectoryError;
use tracing::{debug, trace};
use vista_domain::identity::Identity;
use vista_domain::visibility::VisibleForGroups;

/// Decides whether one node is visible to an identity.
#[derive(Debug)]
pub struct VisibilityFilter<'a, D> {
    directory: &'a D,
}

impl<'a, D: DirectoryResolver> VisibilityFilter<'a, D> {
    #[must_use]
    pub const fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// `true` if `visible_for_groups` is unrestricted or the identity belongs to one of its
    /// groups. Groups are checked in document order, one directory call at a time, and the
    /// first match wins. `label` only feeds the logs.
    ///
    /// # Errors
    /// Propagates the first [`DirectoryError`]; a failed lookup is never read as a yes or no.
    pub async fn is_visible(
        &self,
        visible_for_groups: &VisibleForGroups,
        identity: &Identity,
        label: &str,
    ) -> Result<bool, DirectoryError> {
        if visible_for_groups.is_unrestricted() {
            trace!(node = label, "Access unrestricted");
            return Ok(true);
        }

        trace!(node = label, groups = ?visible_for_groups, "Access limited to groups");

        for group in visible_for_groups.groups() {
            if self.directory.is_member_of(identity, group).await? {
                trace!(node = label, %identity, group, "Access granted");
                return Ok(true);
            }
        }

        debug!(node = label, %identity, "Access not allowed");
        Ok(false)
    }
}
