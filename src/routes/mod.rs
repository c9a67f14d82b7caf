pub mod api;
pub mod public;

use rocket::http::Header;

/// Plain-text response with a one-hour public cache directive.
#[derive(rocket::Responder)]
#[response(status = 200, content_type = "plain")]
pub struct CachedText {
    pub body: String,
    pub cache: Header<'static>,
}

impl CachedText {
    pub fn hour(body: String) -> Self {
        CachedText {
            body,
            cache: Header::new("Cache-Control", "public, max-age=3600"),
        }
    }
}
