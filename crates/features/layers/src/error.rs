use std::borrow::Cow;

#[vista_derive::vista_error]
pub enum LayerError {
    /// The catalog section does not belong to any supported protocol.
    #[error("Unsupported layer type{}: {message}", format_context(.context))]
    UnsupportedProtocol { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed layer definition{}: {source}", format_context(.context))]
    Malformed { source: serde_json::Error, context: Option<Cow<'static, str>> },
}
