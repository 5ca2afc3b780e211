#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the Vista crates.
//!
//! Only one macro lives here today: [`macro@vista_error`], which turns a plain enum of
//! named-field variants into the error type every crate in the workspace exposes.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # What it generates
///
/// * `#[derive(Debug, thiserror::Error)]` unless the enum already derives them.
/// * A `<Name>Ext` trait with `.context(..)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant that wraps a `source` error.
/// * `From<Source>` for every variant that wraps a `source` error.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper used inside `#[error(..)]` strings.
///
/// # Rules
///
/// 1. Only enums are accepted, and every variant must use named fields.
/// 2. A `context` field must be typed `Option<Cow<'static, str>>`.
/// 3. A variant carrying `source` (or a field marked `#[source]`/`#[from]`) must also
///    carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[vista_derive::vista_error]
/// pub enum StoreError {
///     #[error("Document not found{}: {message}", format_context(.context))]
///     NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
///
/// fn open() -> Result<Vec<u8>, StoreError> {
///     std::fs::read("layers.json").context("Reading the layer catalog")
/// }
/// ```
#[proc_macro_attribute]
pub fn vista_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
