use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rand::RngCore;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

const DB_PATH: &str = "data/maqola.db";

pub fn init_pool() -> Result<DbPool, Box<dyn std::error::Error>> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let manager = SqliteConnectionManager::file(DB_PATH);
    let pool = Pool::builder().max_size(10).build(manager)?;

    // WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Blog posts, trilingual
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            slug TEXT UNIQUE NOT NULL,
            title_uz TEXT NOT NULL,
            title_ru TEXT NOT NULL,
            title_en TEXT NOT NULL,
            content_uz TEXT NOT NULL,
            content_ru TEXT NOT NULL,
            content_en TEXT NOT NULL,
            excerpt_uz TEXT,
            excerpt_ru TEXT,
            excerpt_en TEXT,
            featured_image TEXT,
            category_id INTEGER REFERENCES categories(id),
            tags TEXT NOT NULL DEFAULT '[]',
            seo_title_uz TEXT,
            seo_title_ru TEXT,
            seo_title_en TEXT,
            seo_description_uz TEXT,
            seo_description_ru TEXT,
            seo_description_en TEXT,
            focus_keywords TEXT NOT NULL DEFAULT '[]',
            reading_time INTEGER NOT NULL DEFAULT 5,
            published INTEGER NOT NULL DEFAULT 0,
            published_at DATETIME,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_posts_published
            ON posts(published, published_at);

        -- Categories, trilingual
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            slug TEXT UNIQUE NOT NULL,
            name_uz TEXT NOT NULL,
            name_ru TEXT NOT NULL,
            name_en TEXT NOT NULL,
            description_uz TEXT,
            description_ru TEXT,
            description_en TEXT
        );

        -- Site-wide SEO keywords, merged into page meta by priority
        CREATE TABLE IF NOT EXISTS seo_keywords (
            id INTEGER PRIMARY KEY,
            keyword TEXT NOT NULL,
            language TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 0,
            UNIQUE(keyword, language)
        );

        -- Contact form inbox
        CREATE TABLE IF NOT EXISTS contact_messages (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            body TEXT NOT NULL,
            replied INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );
        ",
    )?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        // General
        ("site_name", "Maqola"),
        ("site_tagline", ""),
        ("site_url", "http://localhost:8000"),
        ("site_description_uz", ""),
        ("site_description_ru", ""),
        ("site_description_en", ""),
        ("default_language", "uz"),
        ("blog_slug", "blog"),
        ("date_format", "%Y-%m-%d"),
        // Author
        ("author_name", ""),
        ("author_bio", ""),
        // Services, one per line (rendered in llms.txt)
        ("services", ""),
        // Social
        ("social_instagram", ""),
        ("social_telegram", ""),
        ("social_facebook", ""),
        ("social_youtube", ""),
        ("social_linkedin", ""),
        // Analytics tag IDs
        ("analytics_ga4_id", ""),
        ("analytics_gtm_id", ""),
        ("analytics_pixel_id", ""),
        // SEO
        ("seo_title_template", "{{title}} — {{site_name}}"),
        ("seo_default_description", ""),
        ("seo_default_image", ""),
        ("seo_open_graph", "true"),
        ("seo_twitter_cards", "true"),
        ("seo_structured_data", "true"),
        ("seo_sitemap_enabled", "true"),
        ("seo_robots_txt", "User-agent: *\nAllow: /"),
        // Publishing API
        ("api_post_key", ""),
        // Email (SMTP)
        ("email_smtp_host", ""),
        ("email_smtp_port", "587"),
        ("email_smtp_username", ""),
        ("email_smtp_password", ""),
        ("email_from_address", ""),
        ("email_from_name", ""),
        // Contact form
        ("contact_rate_limit", "5"),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    // Seed an IndexNow key if none exists. The key must be stable across
    // restarts because search engines fetch it back for verification.
    let has_key: i64 = conn.query_row(
        "SELECT COUNT(*) FROM settings WHERE key = 'indexnow_key' AND value != ''",
        [],
        |row| row.get(0),
    )?;
    if has_key == 0 {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        conn.execute(
            "INSERT INTO settings (key, value) VALUES ('indexnow_key', ?1)
             ON CONFLICT(key) DO UPDATE SET value = ?1",
            params![hex::encode(bytes)],
        )?;
    }

    Ok(())
}
