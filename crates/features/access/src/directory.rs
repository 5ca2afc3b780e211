use crate::error::DirectoryError;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use vista_domain::config::DirectoryConfig;
use vista_domain::identity::Identity;

/// Port to the user directory (Active Directory or similar).
///
/// Every call may be slow or fail; callers await them one at a time and treat an error as
/// "the directory is unavailable" rather than as a negative answer.
pub trait DirectoryResolver: Send + Sync {
    /// Whether the directory knows `user`.
    fn is_user_valid(
        &self,
        user: &Identity,
    ) -> impl Future<Output = Result<bool, DirectoryError>> + Send;

    /// Whether `user` is a member of `group`.
    fn is_member_of(
        &self,
        user: &Identity,
        group: &str,
    ) -> impl Future<Output = Result<bool, DirectoryError>> + Send;

    /// Every group known to the directory, for the admin UI's pickers.
    fn available_groups(&self) -> impl Future<Output = Result<Vec<String>, DirectoryError>> + Send;

    /// Groups shared by all of `users`.
    fn common_groups(
        &self,
        users: &[Identity],
    ) -> impl Future<Output = Result<Vec<String>, DirectoryError>> + Send;
}

/// Directory backed by the membership table in the service settings.
///
/// Group names compare case-insensitively, like directory group names do.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    members: BTreeMap<String, Vec<String>>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new(members: BTreeMap<String, Vec<String>>) -> Self {
        Self { members }
    }

    fn groups_of(&self, user: &Identity) -> Option<&[String]> {
        if user.is_anonymous() {
            return None;
        }
        self.members.get(user.as_str()).map(Vec::as_slice)
    }
}

impl From<&DirectoryConfig> for StaticDirectory {
    fn from(config: &DirectoryConfig) -> Self {
        Self::new(config.members.clone())
    }
}

impl DirectoryResolver for StaticDirectory {
    async fn is_user_valid(&self, user: &Identity) -> Result<bool, DirectoryError> {
        Ok(self.groups_of(user).is_some())
    }

    async fn is_member_of(&self, user: &Identity, group: &str) -> Result<bool, DirectoryError> {
        Ok(self
            .groups_of(user)
            .is_some_and(|groups| groups.iter().any(|g| g.eq_ignore_ascii_case(group))))
    }

    async fn available_groups(&self) -> Result<Vec<String>, DirectoryError> {
        let groups: BTreeSet<&str> =
            self.members.values().flatten().map(String::as_str).collect();
        Ok(groups.into_iter().map(str::to_owned).collect())
    }

    async fn common_groups(&self, users: &[Identity]) -> Result<Vec<String>, DirectoryError> {
        let Some((first, rest)) = users.split_first() else {
            return Ok(Vec::new());
        };

        let mut common: BTreeSet<String> =
            self.groups_of(first).unwrap_or_default().iter().cloned().collect();

        for user in rest {
            let groups = self.groups_of(user).unwrap_or_default();
            common.retain(|c| groups.iter().any(|g| g.eq_ignore_ascii_case(c)));
        }

        Ok(common.into_iter().collect())
    }
}
