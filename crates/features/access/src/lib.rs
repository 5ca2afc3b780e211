//! Group-based visibility for map configurations.
//!
//! A [`DirectoryResolver`] answers membership questions. [`VisibilityFilter`] turns one
//! `visibleForGroups` list into a yes/no, and [`ConfigWasher`] applies it over the tool list,
//! the baselayers and the recursive group tree of a configuration. Each wash wraps the
//! resolver in a [`MemoizedDirectory`] so a (user, group) pair is looked up at most once.

mod directory;
mod error;
mod filter;
mod memo;
mod washer;

pub use directory::{DirectoryResolver, StaticDirectory};
pub use error::{DirectoryError, DirectoryErrorExt};
pub use filter::VisibilityFilter;
pub use memo::MemoizedDirectory;
pub use washer::ConfigWasher;
