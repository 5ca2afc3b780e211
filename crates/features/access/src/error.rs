use std::borrow::Cow;

#[vista_derive::vista_error]
#[derive(Clone)]
pub enum DirectoryError {
    /// The directory could not answer. Any in-progress wash is abandoned.
    #[error("Directory unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal directory error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
