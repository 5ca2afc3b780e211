//! HTTP plumbing shared by Vista binaries.

mod health;
mod identity;
mod router;

pub use identity::identity_from_headers;
pub use router::system_router;
