use crate::directory::DirectoryResolver;
use crate::error::DirectoryError;
use moka::future::Cache;
use std::sync::Arc;
use vista_domain::identity::Identity;

/// Upper bound on distinct (identity, group) answers kept for one wash.
const MEMO_CAPACITY: u64 = 10_000;

/// Membership decorator scoped to a single wash.
///
/// Answers are cached per (identity, group), and concurrent lookups of the same pair share
/// one directory call. Failures are not cached. Everything else is forwarded unchanged.
#[derive(Debug)]
pub struct MemoizedDirectory<'a, D> {
    inner: &'a D,
    memberships: Cache<(Identity, String), bool>,
}

impl<'a, D: DirectoryResolver> MemoizedDirectory<'a, D> {
    #[must_use]
    pub fn new(inner: &'a D) -> Self {
        Self { inner, memberships: Cache::builder().max_capacity(MEMO_CAPACITY).build() }
    }
}

impl<D: DirectoryResolver> DirectoryResolver for MemoizedDirectory<'_, D> {
    async fn is_user_valid(&self, user: &Identity) -> Result<bool, DirectoryError> {
        self.inner.is_user_valid(user).await
    }

    async fn is_member_of(&self, user: &Identity, group: &str) -> Result<bool, DirectoryError> {
        self.memberships
            .try_get_with((user.clone(), group.to_owned()), self.inner.is_member_of(user, group))
            .await
            .map_err(Arc::unwrap_or_clone)
    }

    async fn available_groups(&self) -> Result<Vec<String>, DirectoryError> {
        self.inner.available_groups().await
    }

    async fn common_groups(&self, users: &[Identity]) -> Result<Vec<String>, DirectoryError> {
        self.inner.common_groups(users).await
    }
}
