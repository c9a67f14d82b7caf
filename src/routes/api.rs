use std::sync::Arc;

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::email;
use crate::lang::Lang;
use crate::llms;
use crate::models::message::MessageForm;
use crate::models::post::PostSubmission;
use crate::rate_limit::{hash_client, RateLimiter};
use crate::seo::ping;
use crate::store::Store;

use super::CachedText;

// ── Request guards ─────────────────────────────────────

/// Raw `x-api-key` header value; comparison happens in the handler so a
/// mismatch can answer with a JSON envelope.
pub struct ApiKey(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiKey {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(ApiKey(
            req.headers().get_one("x-api-key").map(|v| v.to_string()),
        ))
    }
}

/// Client address for rate limiting; "unknown" when the socket address is
/// not available.
pub struct ClientAddr(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientAddr {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let addr = req
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientAddr(addr))
    }
}

// ── CORS preflight ─────────────────────────────────────

#[options("/<_..>")]
pub fn preflight() -> Status {
    // Headers come from the Cors fairing
    Status::NoContent
}

// ── Post publishing ────────────────────────────────────

#[post("/create-post", format = "json", data = "<body>")]
pub fn create_post(
    key: ApiKey,
    store: &State<Arc<dyn Store>>,
    body: Json<PostSubmission>,
) -> Custom<Json<Value>> {
    let configured = store.setting_get_or("api_post_key", "");
    let presented = key.0.as_deref().unwrap_or("");
    if configured.is_empty() || presented != configured {
        return Custom(
            Status::Unauthorized,
            Json(json!({"error": "Invalid or missing API key"})),
        );
    }

    let form = match body.into_inner().validate() {
        Ok(form) => form,
        Err(e) => return Custom(Status::BadRequest, Json(json!({"error": e}))),
    };

    match store.post_create(&form) {
        Ok(id) => {
            let site_url = store.setting_get_or("site_url", "http://localhost:8000");
            let blog_slug = store.setting_get_or("blog_slug", "blog");
            let lang = Lang::from_code(&store.setting_get_or("default_language", "uz"))
                .unwrap_or_default();
            let url = format!(
                "{}/{}/{}/{}",
                site_url.trim_end_matches('/'),
                lang.code(),
                blog_slug,
                form.slug
            );
            log::info!("Post created via API: {} (id {})", form.slug, id);
            Custom(
                Status::Created,
                Json(json!({
                    "success": true,
                    "message": "Post created",
                    "post": {
                        "id": id,
                        "slug": form.slug,
                        "published": form.published,
                        "url": url,
                    },
                })),
            )
        }
        Err(e) => Custom(
            Status::InternalServerError,
            Json(json!({"error": "Database error", "details": e})),
        ),
    }
}

#[get("/create-post")]
pub fn create_post_get() -> Custom<Json<Value>> {
    Custom(
        Status::MethodNotAllowed,
        Json(json!({"error": "Method not allowed"})),
    )
}

// ── Search engine pings ────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PingRequest {
    pub url: Option<String>,
    pub urls: Option<Vec<String>>,
}

/// Flatten `url`/`urls` into one list, dropping blanks.
pub fn collect_urls(req: &PingRequest) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(ref url) = req.url {
        if !url.trim().is_empty() {
            out.push(url.trim().to_string());
        }
    }
    if let Some(ref urls) = req.urls {
        for url in urls {
            if !url.trim().is_empty() {
                out.push(url.trim().to_string());
            }
        }
    }
    out
}

#[post("/ping-search-engines", format = "json", data = "<body>")]
pub fn ping_search_engines(
    store: &State<Arc<dyn Store>>,
    body: Json<PingRequest>,
) -> Custom<Json<Value>> {
    let urls = collect_urls(&body);
    if urls.is_empty() {
        return Custom(
            Status::BadRequest,
            Json(json!({"error": "No URLs provided"})),
        );
    }

    let results = ping::notify_search_engines(store.inner().as_ref(), &urls);
    let ok = results
        .iter()
        .filter(|r| r.status == ping::PingStatus::Success)
        .count();

    Custom(
        Status::Ok,
        Json(json!({
            "success": true,
            "results": results,
            "submittedUrls": urls,
            "message": format!("{}/{} engines notified", ok, results.len()),
        })),
    )
}

#[get("/ping-search-engines")]
pub fn ping_search_engines_get() -> Custom<Json<Value>> {
    Custom(
        Status::MethodNotAllowed,
        Json(json!({"error": "Method not allowed"})),
    )
}

// ── llms.txt ───────────────────────────────────────────

#[get("/llms.txt")]
pub fn llms_txt(store: &State<Arc<dyn Store>>) -> CachedText {
    CachedText::hour(llms::generate(store.inner().as_ref()))
}

// ── Contact reply mailer ───────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ReplyRequest {
    pub to: Option<String>,
    #[serde(rename = "toName")]
    pub to_name: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "originalMessage")]
    pub original_message: Option<String>,
    #[serde(rename = "messageId")]
    pub message_id: Option<i64>,
}

impl ReplyRequest {
    /// The recipient, subject and body are mandatory.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("to", &self.to),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            match value {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(format!("Missing required field: {}", name)),
            }
        }
        Ok(())
    }
}

#[post("/reply-message", format = "json", data = "<body>")]
pub fn reply_message(
    store: &State<Arc<dyn Store>>,
    body: Json<ReplyRequest>,
) -> Custom<Json<Value>> {
    let req = body.into_inner();
    if let Err(e) = req.validate() {
        return Custom(Status::BadRequest, Json(json!({"error": e})));
    }

    let result = email::send_reply(
        store.inner().as_ref(),
        req.to.as_deref().unwrap_or(""),
        req.to_name.as_deref().unwrap_or(""),
        req.subject.as_deref().unwrap_or(""),
        req.message.as_deref().unwrap_or(""),
        req.original_message.as_deref().unwrap_or(""),
    );

    match result {
        Ok(()) => {
            if let Some(id) = req.message_id {
                if let Err(e) = store.message_mark_replied(id) {
                    log::warn!("Reply sent but message {} not marked replied: {}", id, e);
                }
            }
            Custom(
                Status::Ok,
                Json(json!({"success": true, "message": "Reply sent"})),
            )
        }
        Err(e) => Custom(Status::InternalServerError, Json(json!({"error": e}))),
    }
}

#[get("/reply-message")]
pub fn reply_message_get() -> Custom<Json<Value>> {
    Custom(
        Status::MethodNotAllowed,
        Json(json!({"error": "Method not allowed"})),
    )
}

// ── Contact form intake ────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn validate(&self) -> Result<MessageForm, String> {
        for (name, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            match value {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(format!("Missing required field: {}", name)),
            }
        }
        Ok(MessageForm {
            name: self.name.clone().unwrap(),
            email: self.email.clone().unwrap(),
            body: self.message.clone().unwrap(),
        })
    }
}

#[post("/contact-message", format = "json", data = "<body>")]
pub fn contact_message(
    store: &State<Arc<dyn Store>>,
    limiter: &State<RateLimiter>,
    client: ClientAddr,
    body: Json<ContactRequest>,
) -> Custom<Json<Value>> {
    let form = match body.into_inner().validate() {
        Ok(form) => form,
        Err(e) => return Custom(Status::BadRequest, Json(json!({"error": e}))),
    };

    let max_attempts = store.setting_get_i64("contact_rate_limit").max(1) as u64;
    let key = format!("contact:{}", hash_client(&client.0));
    let window = std::time::Duration::from_secs(15 * 60);
    if !limiter.check_and_record(&key, max_attempts, window) {
        return Custom(
            Status::TooManyRequests,
            Json(json!({"error": "Too many messages. Please wait before sending again."})),
        );
    }

    match store.message_create(&form) {
        Ok(id) => Custom(Status::Created, Json(json!({"success": true, "id": id}))),
        Err(e) => Custom(
            Status::InternalServerError,
            Json(json!({"error": "Database error", "details": e})),
        ),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        preflight,
        create_post,
        create_post_get,
        ping_search_engines,
        ping_search_engines_get,
        llms_txt,
        reply_message,
        reply_message_get,
        contact_message,
    ]
}
