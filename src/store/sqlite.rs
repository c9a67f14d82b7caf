use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::DbPool;
use crate::lang::Lang;
use crate::models::category::{Category, CategoryForm};
use crate::models::keyword::SeoKeyword;
use crate::models::message::{ContactMessage, MessageForm};
use crate::models::post::{Post, PostForm};

use super::Store;

/// SQLite-backed implementation of the Store trait.
/// Wraps an r2d2 connection pool; one connection per call.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn json_list(raw: String) -> Vec<String> {
    serde_json::from_str(&raw).unwrap_or_default()
}

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get("id")?,
        slug: row.get("slug")?,
        title_uz: row.get("title_uz")?,
        title_ru: row.get("title_ru")?,
        title_en: row.get("title_en")?,
        content_uz: row.get("content_uz")?,
        content_ru: row.get("content_ru")?,
        content_en: row.get("content_en")?,
        excerpt_uz: row.get("excerpt_uz")?,
        excerpt_ru: row.get("excerpt_ru")?,
        excerpt_en: row.get("excerpt_en")?,
        featured_image: row.get("featured_image")?,
        category_id: row.get("category_id")?,
        tags: json_list(row.get("tags")?),
        seo_title_uz: row.get("seo_title_uz")?,
        seo_title_ru: row.get("seo_title_ru")?,
        seo_title_en: row.get("seo_title_en")?,
        seo_description_uz: row.get("seo_description_uz")?,
        seo_description_ru: row.get("seo_description_ru")?,
        seo_description_en: row.get("seo_description_en")?,
        focus_keywords: json_list(row.get("focus_keywords")?),
        reading_time: row.get("reading_time")?,
        published: row.get::<_, i64>("published")? != 0,
        published_at: row.get("published_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        slug: row.get("slug")?,
        name_uz: row.get("name_uz")?,
        name_ru: row.get("name_ru")?,
        name_en: row.get("name_en")?,
        description_uz: row.get("description_uz")?,
        description_ru: row.get("description_ru")?,
        description_en: row.get("description_en")?,
    })
}

fn keyword_from_row(row: &Row) -> rusqlite::Result<SeoKeyword> {
    Ok(SeoKeyword {
        id: row.get("id")?,
        keyword: row.get("keyword")?,
        language: row.get("language")?,
        priority: row.get("priority")?,
    })
}

fn message_from_row(row: &Row) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        body: row.get("body")?,
        replied: row.get::<_, i64>("replied")? != 0,
        created_at: row.get("created_at")?,
    })
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    fn seed_defaults(&self) -> Result<(), String> {
        crate::db::seed_defaults(&self.pool).map_err(|e| e.to_string())
    }

    // ── Settings ────────────────────────────────────────────────────

    fn setting_get(&self, key: &str) -> Option<String> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .ok()
    }

    fn setting_set(&self, key: &str, value: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn setting_set_many(&self, settings: &HashMap<String, String>) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        for (key, value) in settings {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = ?2",
                params![key, value],
            )
            .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn setting_all(&self) -> HashMap<String, String> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };

        let mut stmt = match conn.prepare("SELECT key, value FROM settings") {
            Ok(s) => s,
            Err(_) => return HashMap::new(),
        };

        stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map(|rows| rows.filter_map(|r| r.ok()).collect())
        .unwrap_or_default()
    }

    // ── Posts ───────────────────────────────────────────────────────

    fn post_find_by_id(&self, id: i64) -> Option<Post> {
        let conn = self.pool.get().ok()?;
        conn.query_row("SELECT * FROM posts WHERE id = ?1", params![id], post_from_row)
            .ok()
    }

    fn post_find_by_slug(&self, slug: &str) -> Option<Post> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM posts WHERE slug = ?1",
            params![slug],
            post_from_row,
        )
        .ok()
    }

    fn post_list_published(&self, limit: i64, offset: i64) -> Vec<Post> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT * FROM posts WHERE published = 1
             ORDER BY published_at DESC LIMIT ?1 OFFSET ?2",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![limit, offset], post_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn post_list_all(&self, limit: i64, offset: i64) -> Vec<Post> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT * FROM posts ORDER BY created_at DESC LIMIT ?1 OFFSET ?2")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![limit, offset], post_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn post_count(&self, published_only: bool) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        let sql = if published_only {
            "SELECT COUNT(*) FROM posts WHERE published = 1"
        } else {
            "SELECT COUNT(*) FROM posts"
        };
        conn.query_row(sql, [], |row| row.get(0)).unwrap_or(0)
    }

    fn post_by_category(&self, category_id: i64, limit: i64, offset: i64) -> Vec<Post> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT * FROM posts WHERE category_id = ?1 AND published = 1
             ORDER BY published_at DESC LIMIT ?2 OFFSET ?3",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![category_id, limit, offset], post_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn post_create(&self, form: &PostForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;

        let published_at = if form.published {
            Some(Utc::now().naive_utc())
        } else {
            None
        };
        let tags = serde_json::to_string(&form.tags).map_err(|e| e.to_string())?;
        let focus_keywords =
            serde_json::to_string(&form.focus_keywords).map_err(|e| e.to_string())?;

        conn.execute(
            "INSERT INTO posts (slug, title_uz, title_ru, title_en,
                content_uz, content_ru, content_en,
                excerpt_uz, excerpt_ru, excerpt_en,
                featured_image, category_id, tags,
                seo_title_uz, seo_title_ru, seo_title_en,
                seo_description_uz, seo_description_ru, seo_description_en,
                focus_keywords, reading_time, published, published_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
            params![
                form.slug,
                form.title_uz,
                form.title_ru,
                form.title_en,
                form.content_uz,
                form.content_ru,
                form.content_en,
                form.excerpt_uz,
                form.excerpt_ru,
                form.excerpt_en,
                form.featured_image,
                form.category_id,
                tags,
                form.seo_title_uz,
                form.seo_title_ru,
                form.seo_title_en,
                form.seo_description_uz,
                form.seo_description_ru,
                form.seo_description_en,
                focus_keywords,
                form.reading_time,
                form.published as i64,
                published_at,
            ],
        )
        .map_err(|e| e.to_string())?;

        Ok(conn.last_insert_rowid())
    }

    fn post_set_published(&self, id: i64, published: bool) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;

        if published {
            // Stamp published_at only on the first transition to published
            conn.execute(
                "UPDATE posts SET published = 1,
                    published_at = COALESCE(published_at, ?1),
                    updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?2",
                params![Utc::now().naive_utc(), id],
            )
            .map_err(|e| e.to_string())?;
        } else {
            conn.execute(
                "UPDATE posts SET published = 0, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![id],
            )
            .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn post_delete(&self, id: i64) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM posts WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    // ── Categories ──────────────────────────────────────────────────

    fn category_find_by_id(&self, id: i64) -> Option<Category> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM categories WHERE id = ?1",
            params![id],
            category_from_row,
        )
        .ok()
    }

    fn category_find_by_slug(&self, slug: &str) -> Option<Category> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM categories WHERE slug = ?1",
            params![slug],
            category_from_row,
        )
        .ok()
    }

    fn category_list(&self) -> Vec<Category> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare("SELECT * FROM categories ORDER BY slug") {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], category_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn category_create(&self, form: &CategoryForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO categories (slug, name_uz, name_ru, name_en,
                description_uz, description_ru, description_en)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                form.slug,
                form.name_uz,
                form.name_ru,
                form.name_en,
                form.description_uz,
                form.description_ru,
                form.description_en,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    fn category_delete(&self, id: i64) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE posts SET category_id = NULL WHERE category_id = ?1",
            params![id],
        )
        .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM categories WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    // ── SEO keywords ────────────────────────────────────────────────

    fn keyword_top(&self, lang: Lang, limit: i64) -> Vec<SeoKeyword> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT * FROM seo_keywords WHERE language = ?1
             ORDER BY priority DESC, id ASC LIMIT ?2",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![lang.code(), limit], keyword_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn keyword_add(&self, keyword: &str, lang: Lang, priority: i64) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO seo_keywords (keyword, language, priority) VALUES (?1, ?2, ?3)
             ON CONFLICT(keyword, language) DO UPDATE SET priority = ?3",
            params![keyword, lang.code(), priority],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    // ── Contact messages ────────────────────────────────────────────

    fn message_create(&self, form: &MessageForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO contact_messages (name, email, body) VALUES (?1, ?2, ?3)",
            params![form.name, form.email, form.body],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    fn message_find_by_id(&self, id: i64) -> Option<ContactMessage> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM contact_messages WHERE id = ?1",
            params![id],
            message_from_row,
        )
        .ok()
    }

    fn message_list(&self, limit: i64, offset: i64) -> Vec<ContactMessage> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT * FROM contact_messages ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![limit, offset], message_from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn message_mark_replied(&self, id: i64) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE contact_messages SET replied = 1 WHERE id = ?1",
            params![id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}
