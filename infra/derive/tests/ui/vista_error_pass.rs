use std::borrow::Cow;
use vista_derive::vista_error;

#[vista_error]
pub enum CatalogError {
    #[error("Catalog unreadable{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_catalog() -> Result<Vec<u8>, CatalogError> {
    std::fs::read("layers.json").context("Reading layers.json")
}

fn main() {
    let err: CatalogError = "layer index exhausted".into();
    let _ = err.to_string();
    let _ = read_catalog();
}
