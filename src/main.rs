#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use serde_json::{json, Value};

mod cors;
mod db;
mod email;
mod lang;
mod llms;
mod models;
mod rate_limit;
mod render;
mod routes;
mod rss;
mod seo;
mod store;

#[cfg(test)]
mod tests;

use rate_limit::RateLimiter;
use store::sqlite::SqliteStore;
use store::Store;

// ── Site catchers ──────────────────────────────────────

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

// ── API catchers (JSON envelopes) ──────────────────────

#[catch(400)]
fn api_bad_request() -> Json<Value> {
    Json(json!({"error": "Bad request"}))
}

#[catch(401)]
fn api_unauthorized() -> Json<Value> {
    Json(json!({"error": "Unauthorized"}))
}

#[catch(404)]
fn api_not_found() -> Json<Value> {
    Json(json!({"error": "Not found"}))
}

#[catch(405)]
fn api_method_not_allowed() -> Json<Value> {
    Json(json!({"error": "Method not allowed"}))
}

#[catch(422)]
fn api_unprocessable() -> Json<Value> {
    Json(json!({"error": "Malformed request body"}))
}

#[catch(500)]
fn api_server_error() -> Json<Value> {
    Json(json!({"error": "Internal server error"}))
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let pool = db::init_pool().expect("Failed to initialize database pool");
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
    store.run_migrations().expect("Failed to run database migrations");
    store.seed_defaults().expect("Failed to seed default settings");

    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    eprintln!("Serving {}", site_url);

    rocket::build()
        .manage(store)
        .manage(RateLimiter::new())
        .attach(cors::Cors)
        .mount("/", routes::public::routes())
        .mount("/api", routes::api::routes())
        .register(
            "/api",
            catchers![
                api_bad_request,
                api_unauthorized,
                api_not_found,
                api_method_not_allowed,
                api_unprocessable,
                api_server_error,
            ],
        )
        .register("/", catchers![not_found, server_error])
}
