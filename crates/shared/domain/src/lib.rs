//! # Domain Models
//!
//! Pure types shared by every Vista crate: service settings, requesting identities, the
//! persisted map-configuration documents and the shared layer catalog.
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod document;
pub mod identity;
pub mod visibility;
