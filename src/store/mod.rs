use std::collections::HashMap;

use crate::lang::Lang;
use crate::models::category::{Category, CategoryForm};
use crate::models::keyword::SeoKeyword;
use crate::models::message::{ContactMessage, MessageForm};
use crate::models::post::{Post, PostForm};

pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here.
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;
    fn seed_defaults(&self) -> Result<(), String>;

    // ── Settings ────────────────────────────────────────────────────
    fn setting_get(&self, key: &str) -> Option<String>;
    fn setting_get_or(&self, key: &str, default: &str) -> String {
        self.setting_get(key).unwrap_or_else(|| default.to_string())
    }
    fn setting_get_bool(&self, key: &str) -> bool {
        self.setting_get(key)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }
    fn setting_get_i64(&self, key: &str) -> i64 {
        self.setting_get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
    fn setting_set(&self, key: &str, value: &str) -> Result<(), String>;
    fn setting_set_many(&self, settings: &HashMap<String, String>) -> Result<(), String>;
    fn setting_all(&self) -> HashMap<String, String>;

    // ── Posts ───────────────────────────────────────────────────────
    fn post_find_by_id(&self, id: i64) -> Option<Post>;
    fn post_find_by_slug(&self, slug: &str) -> Option<Post>;
    /// Published posts, newest first by `published_at`.
    fn post_list_published(&self, limit: i64, offset: i64) -> Vec<Post>;
    fn post_list_all(&self, limit: i64, offset: i64) -> Vec<Post>;
    fn post_count(&self, published_only: bool) -> i64;
    fn post_by_category(&self, category_id: i64, limit: i64, offset: i64) -> Vec<Post>;
    fn post_create(&self, form: &PostForm) -> Result<i64, String>;
    /// Flip the published flag. `published_at` is stamped exactly when the
    /// flag transitions to true and cleared never.
    fn post_set_published(&self, id: i64, published: bool) -> Result<(), String>;
    fn post_delete(&self, id: i64) -> Result<(), String>;

    // ── Categories ──────────────────────────────────────────────────
    fn category_find_by_id(&self, id: i64) -> Option<Category>;
    fn category_find_by_slug(&self, slug: &str) -> Option<Category>;
    fn category_list(&self) -> Vec<Category>;
    fn category_create(&self, form: &CategoryForm) -> Result<i64, String>;
    fn category_delete(&self, id: i64) -> Result<(), String>;

    // ── SEO keywords ────────────────────────────────────────────────
    /// Top keywords for a language, highest priority first.
    fn keyword_top(&self, lang: Lang, limit: i64) -> Vec<SeoKeyword>;
    fn keyword_add(&self, keyword: &str, lang: Lang, priority: i64) -> Result<i64, String>;

    // ── Contact messages ────────────────────────────────────────────
    fn message_create(&self, form: &MessageForm) -> Result<i64, String>;
    fn message_find_by_id(&self, id: i64) -> Option<ContactMessage>;
    fn message_list(&self, limit: i64, offset: i64) -> Vec<ContactMessage>;
    fn message_mark_replied(&self, id: i64) -> Result<(), String>;
}
