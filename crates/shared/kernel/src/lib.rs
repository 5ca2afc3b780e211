//! Kernel utilities shared by the feature slices and the server.
//! Keep this crate lightweight: configuration loading and the small HTTP helpers every
//! binary needs.
//!
//! ## Config loading
//! ```rust,no_run
//! use vista_kernel::config::load_config;
//! use vista_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap();
//! assert!(cfg.server.port > 0);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use vista_domain as domain;
