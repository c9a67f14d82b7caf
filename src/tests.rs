#![cfg(test)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::collections::HashMap;

use crate::email;
use crate::lang::{localize_path, Lang};
use crate::llms;
use crate::models::category::CategoryForm;
use crate::models::message::MessageForm;
use crate::models::post::{slug_is_valid, PostForm, PostSubmission};
use crate::routes::api::{collect_urls, ContactRequest, PingRequest, ReplyRequest};
use crate::rss;
use crate::seo::analytics::{self, GA4_INIT_MARKER, GA4_LOADER_MARKER, GTM_MARKER, PIXEL_MARKER};
use crate::seo::head::{diff, HeadOp, HeadState, HeadTag, TagId};
use crate::seo::jsonld::{self, ARTICLE_MARKER, BREADCRUMB_MARKER};
use crate::seo::meta::{build_head, merge_keywords, PageKind, PageMeta};
use crate::seo::ping::{google_ping_url, indexnow_payload, yandex_ping_url};
use crate::seo::sitemap;
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Create a fresh in-memory store with migrations + seed defaults applied.
/// Uses a named shared-cache in-memory DB so multiple pool connections see
/// the same data.
fn test_store() -> SqliteStore {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    let store = SqliteStore::new(pool);
    store.run_migrations().expect("Failed to run migrations");
    store.seed_defaults().expect("Failed to seed defaults");
    store
}

fn make_post_form(slug: &str, published: bool) -> PostForm {
    PostForm {
        slug: slug.to_string(),
        title_uz: format!("{} uz", slug),
        title_ru: format!("{} ru", slug),
        title_en: format!("{} en", slug),
        content_uz: "<p>uz</p>".to_string(),
        content_ru: "<p>ru</p>".to_string(),
        content_en: "<p>en</p>".to_string(),
        excerpt_uz: Some("qisqacha".to_string()),
        excerpt_ru: Some("кратко".to_string()),
        excerpt_en: Some("summary".to_string()),
        featured_image: None,
        category_id: None,
        tags: vec!["smm".to_string(), "kontent".to_string()],
        seo_title_uz: None,
        seo_title_ru: None,
        seo_title_en: None,
        seo_description_uz: None,
        seo_description_ru: None,
        seo_description_en: None,
        focus_keywords: vec!["marketing".to_string()],
        reading_time: 5,
        published,
    }
}

fn full_submission() -> PostSubmission {
    PostSubmission {
        slug: Some("yangi-post".to_string()),
        title_uz: Some("Sarlavha".to_string()),
        title_ru: Some("Заголовок".to_string()),
        title_en: Some("Title".to_string()),
        content_uz: Some("<p>Matn</p>".to_string()),
        content_ru: Some("<p>Текст</p>".to_string()),
        content_en: Some("<p>Body</p>".to_string()),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════

#[test]
fn settings_set_and_get() {
    let store = test_store();
    store.setting_set("test_key", "hello").unwrap();
    assert_eq!(store.setting_get("test_key"), Some("hello".to_string()));
}

#[test]
fn settings_get_or_default() {
    let store = test_store();
    assert_eq!(store.setting_get_or("nonexistent", "fallback"), "fallback");
    store.setting_set("exists", "val").unwrap();
    assert_eq!(store.setting_get_or("exists", "fallback"), "val");
}

#[test]
fn settings_missing_keys_yield_empty_defaults() {
    let store = test_store();
    // Seeded keys exist with empty-string values, never absent
    for key in [
        "social_instagram",
        "social_telegram",
        "analytics_ga4_id",
        "analytics_gtm_id",
        "analytics_pixel_id",
    ] {
        assert_eq!(store.setting_get(key), Some(String::new()), "key {}", key);
    }
}

#[test]
fn settings_get_bool() {
    let store = test_store();
    store.setting_set("flag_true", "true").unwrap();
    store.setting_set("flag_one", "1").unwrap();
    store.setting_set("flag_false", "false").unwrap();
    assert!(store.setting_get_bool("flag_true"));
    assert!(store.setting_get_bool("flag_one"));
    assert!(!store.setting_get_bool("flag_false"));
    assert!(!store.setting_get_bool("missing_flag"));
}

#[test]
fn settings_set_many() {
    let store = test_store();
    let mut map = HashMap::new();
    map.insert("k1".to_string(), "v1".to_string());
    map.insert("k2".to_string(), "v2".to_string());
    store.setting_set_many(&map).unwrap();
    assert_eq!(store.setting_get("k1"), Some("v1".to_string()));
    assert_eq!(store.setting_get("k2"), Some("v2".to_string()));
}

#[test]
fn settings_upsert() {
    let store = test_store();
    store.setting_set("key", "first").unwrap();
    store.setting_set("key", "second").unwrap();
    assert_eq!(store.setting_get("key"), Some("second".to_string()));
}

#[test]
fn settings_all_includes_seeds() {
    let store = test_store();
    let all = store.setting_all();
    assert!(all.len() > 10);
    assert!(all.contains_key("site_name"));
    assert!(!all.get("indexnow_key").unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════
// Posts
// ═══════════════════════════════════════════════════════════

#[test]
fn post_create_and_find() {
    let store = test_store();
    let id = store.post_create(&make_post_form("birinchi", true)).unwrap();
    assert!(id > 0);

    let post = store.post_find_by_id(id).unwrap();
    assert_eq!(post.slug, "birinchi");
    assert_eq!(post.title(Lang::Uz), "birinchi uz");
    assert_eq!(post.title(Lang::Ru), "birinchi ru");
    assert_eq!(post.tags, vec!["smm", "kontent"]);
    assert_eq!(post.focus_keywords, vec!["marketing"]);
    assert_eq!(post.reading_time, 5);

    let by_slug = store.post_find_by_slug("birinchi").unwrap();
    assert_eq!(by_slug.id, id);
}

#[test]
fn post_duplicate_slug_rejected() {
    let store = test_store();
    store.post_create(&make_post_form("takror", false)).unwrap();
    assert!(store.post_create(&make_post_form("takror", false)).is_err());
}

#[test]
fn post_published_at_set_exactly_on_publish() {
    let store = test_store();

    // Draft: no timestamp
    let draft_id = store.post_create(&make_post_form("qoralama", false)).unwrap();
    assert!(store.post_find_by_id(draft_id).unwrap().published_at.is_none());

    // Published at creation: stamped
    let pub_id = store.post_create(&make_post_form("tayyor", true)).unwrap();
    assert!(store.post_find_by_id(pub_id).unwrap().published_at.is_some());

    // Transition draft -> published stamps once
    store.post_set_published(draft_id, true).unwrap();
    let first = store.post_find_by_id(draft_id).unwrap().published_at.unwrap();

    // Unpublish keeps the stamp, republish does not move it
    store.post_set_published(draft_id, false).unwrap();
    assert_eq!(
        store.post_find_by_id(draft_id).unwrap().published_at,
        Some(first)
    );
    store.post_set_published(draft_id, true).unwrap();
    assert_eq!(
        store.post_find_by_id(draft_id).unwrap().published_at,
        Some(first)
    );
}

#[test]
fn post_listing_is_newest_first() {
    let store = test_store();
    for slug in ["a-post", "b-post", "c-post"] {
        store.post_create(&make_post_form(slug, true)).unwrap();
    }
    // Spread the publish dates out explicitly
    let conn = store.pool.get().unwrap();
    conn.execute_batch(
        "UPDATE posts SET published_at = '2026-01-01 10:00:00' WHERE slug = 'a-post';
         UPDATE posts SET published_at = '2026-03-01 10:00:00' WHERE slug = 'b-post';
         UPDATE posts SET published_at = '2026-02-01 10:00:00' WHERE slug = 'c-post';",
    )
    .unwrap();
    drop(conn);

    let posts = store.post_list_published(10, 0);
    let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["b-post", "c-post", "a-post"]);
}

#[test]
fn post_listing_excludes_drafts() {
    let store = test_store();
    store.post_create(&make_post_form("korinadigan", true)).unwrap();
    store.post_create(&make_post_form("qoralama", false)).unwrap();

    assert_eq!(store.post_list_published(10, 0).len(), 1);
    assert_eq!(store.post_count(true), 1);
    assert_eq!(store.post_count(false), 2);
}

#[test]
fn post_by_category() {
    let store = test_store();
    let cat_id = store
        .category_create(&CategoryForm {
            slug: "smm".to_string(),
            name_uz: "SMM".to_string(),
            name_ru: "SMM".to_string(),
            name_en: "SMM".to_string(),
            description_uz: None,
            description_ru: None,
            description_en: None,
        })
        .unwrap();

    let mut form = make_post_form("smm-post", true);
    form.category_id = Some(cat_id);
    store.post_create(&form).unwrap();
    store.post_create(&make_post_form("boshqa", true)).unwrap();

    let posts = store.post_by_category(cat_id, 10, 0);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].slug, "smm-post");
}

#[test]
fn post_seo_fallbacks() {
    let store = test_store();
    let mut form = make_post_form("seo-post", true);
    form.seo_title_uz = Some("Maxsus sarlavha".to_string());
    let id = store.post_create(&form).unwrap();
    let post = store.post_find_by_id(id).unwrap();

    // Explicit SEO title wins, others fall back to the post title
    assert_eq!(post.seo_title(Lang::Uz), "Maxsus sarlavha");
    assert_eq!(post.seo_title(Lang::En), "seo-post en");
    // Description falls back to the excerpt
    assert_eq!(post.seo_description(Lang::Ru), Some("кратко"));
}

#[test]
fn post_delete() {
    let store = test_store();
    let id = store.post_create(&make_post_form("ochirish", false)).unwrap();
    store.post_delete(id).unwrap();
    assert!(store.post_find_by_id(id).is_none());
}

// ═══════════════════════════════════════════════════════════
// Post submission validation
// ═══════════════════════════════════════════════════════════

#[test]
fn submission_with_all_required_fields_passes() {
    let form = full_submission().validate().unwrap();
    assert_eq!(form.slug, "yangi-post");
    assert!(!form.published);
    assert_eq!(form.reading_time, 5);
}

#[test]
fn submission_missing_fields_named_individually() {
    let cases: [(&str, fn(&mut PostSubmission)); 7] = [
        ("title_uz", |s| s.title_uz = None),
        ("title_ru", |s| s.title_ru = None),
        ("title_en", |s| s.title_en = Some("  ".to_string())),
        ("content_uz", |s| s.content_uz = None),
        ("content_ru", |s| s.content_ru = Some(String::new())),
        ("content_en", |s| s.content_en = None),
        ("slug", |s| s.slug = None),
    ];

    for (field, mutate) in cases {
        let mut submission = full_submission();
        mutate(&mut submission);
        let err = submission.validate().unwrap_err();
        assert_eq!(err, format!("Missing required field: {}", field));
    }
}

#[test]
fn submission_rejects_bad_slug() {
    let mut submission = full_submission();
    submission.slug = Some("Noto'g'ri Slug".to_string());
    let err = submission.validate().unwrap_err();
    assert!(err.contains("Invalid slug"));
}

#[test]
fn slug_validation() {
    assert!(slug_is_valid("oddiy-slug-123"));
    assert!(slug_is_valid("a"));
    assert!(!slug_is_valid(""));
    assert!(!slug_is_valid("-boshi"));
    assert!(!slug_is_valid("oxiri-"));
    assert!(!slug_is_valid("Katta-Harf"));
    assert!(!slug_is_valid("bo sh"));
    assert!(!slug_is_valid("kirill-ҳарф"));
}

// ═══════════════════════════════════════════════════════════
// Categories
// ═══════════════════════════════════════════════════════════

#[test]
fn category_crud() {
    let store = test_store();
    let form = CategoryForm {
        slug: "marketing".to_string(),
        name_uz: "Marketing".to_string(),
        name_ru: "Маркетинг".to_string(),
        name_en: "Marketing".to_string(),
        description_uz: Some("Tavsif".to_string()),
        description_ru: None,
        description_en: None,
    };
    let id = store.category_create(&form).unwrap();
    assert!(id > 0);

    let cat = store.category_find_by_slug("marketing").unwrap();
    assert_eq!(cat.id, id);
    assert_eq!(cat.name(Lang::Ru), "Маркетинг");
    assert_eq!(cat.description(Lang::Uz), Some("Tavsif"));
    assert_eq!(cat.path(Lang::En), "/en/category/marketing");

    assert_eq!(store.category_list().len(), 1);

    store.category_delete(id).unwrap();
    assert!(store.category_find_by_id(id).is_none());
}

#[test]
fn category_delete_detaches_posts() {
    let store = test_store();
    let cat_id = store
        .category_create(&CategoryForm {
            slug: "vaqtinchalik".to_string(),
            name_uz: "V".to_string(),
            name_ru: "В".to_string(),
            name_en: "T".to_string(),
            description_uz: None,
            description_ru: None,
            description_en: None,
        })
        .unwrap();
    let mut form = make_post_form("bogliq", true);
    form.category_id = Some(cat_id);
    let post_id = store.post_create(&form).unwrap();

    store.category_delete(cat_id).unwrap();
    assert_eq!(store.post_find_by_id(post_id).unwrap().category_id, None);
}

// ═══════════════════════════════════════════════════════════
// SEO keywords
// ═══════════════════════════════════════════════════════════

#[test]
fn keyword_top_orders_by_priority() {
    let store = test_store();
    store.keyword_add("smm xizmatlari", Lang::Uz, 5).unwrap();
    store.keyword_add("kontent marketing", Lang::Uz, 10).unwrap();
    store.keyword_add("brending", Lang::Uz, 1).unwrap();
    store.keyword_add("продвижение", Lang::Ru, 99).unwrap();

    let top = store.keyword_top(Lang::Uz, 20);
    let words: Vec<&str> = top.iter().map(|k| k.keyword.as_str()).collect();
    assert_eq!(words, vec!["kontent marketing", "smm xizmatlari", "brending"]);

    // Limit applies
    assert_eq!(store.keyword_top(Lang::Uz, 2).len(), 2);
    // Language filter applies
    assert_eq!(store.keyword_top(Lang::Ru, 20).len(), 1);
}

#[test]
fn keyword_upsert_updates_priority() {
    let store = test_store();
    store.keyword_add("seo", Lang::En, 1).unwrap();
    store.keyword_add("seo", Lang::En, 7).unwrap();
    let top = store.keyword_top(Lang::En, 10);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].priority, 7);
}

// ═══════════════════════════════════════════════════════════
// Contact messages
// ═══════════════════════════════════════════════════════════

#[test]
fn message_lifecycle() {
    let store = test_store();
    let id = store
        .message_create(&MessageForm {
            name: "Aziz".to_string(),
            email: "aziz@example.com".to_string(),
            body: "Salom!".to_string(),
        })
        .unwrap();

    let msg = store.message_find_by_id(id).unwrap();
    assert_eq!(msg.name, "Aziz");
    assert!(!msg.replied);

    store.message_mark_replied(id).unwrap();
    assert!(store.message_find_by_id(id).unwrap().replied);

    assert_eq!(store.message_list(10, 0).len(), 1);
}

// ═══════════════════════════════════════════════════════════
// Language handling
// ═══════════════════════════════════════════════════════════

#[test]
fn lang_codes() {
    assert_eq!(Lang::from_code("uz"), Some(Lang::Uz));
    assert_eq!(Lang::from_code("ru"), Some(Lang::Ru));
    assert_eq!(Lang::from_code("en"), Some(Lang::En));
    assert_eq!(Lang::from_code("de"), None);
    assert_eq!(Lang::default(), Lang::Uz);
}

#[test]
fn localize_path_swaps_prefix() {
    assert_eq!(localize_path("/uz/blog/post", Lang::Ru), "/ru/blog/post");
    assert_eq!(localize_path("/en", Lang::Uz), "/uz");
    assert_eq!(localize_path("/blog/post", Lang::En), "/en/blog/post");
    assert_eq!(localize_path("/", Lang::Ru), "/ru");
}

// ═══════════════════════════════════════════════════════════
// Head state
// ═══════════════════════════════════════════════════════════

#[test]
fn head_upsert_never_duplicates() {
    let mut head = HeadState::new();
    head.upsert(HeadTag::new(TagId::MetaName("description".into()), "first"));
    head.upsert(HeadTag::new(TagId::MetaName("description".into()), "second"));
    assert_eq!(head.len(), 1);
    assert_eq!(
        head.get(&TagId::MetaName("description".into())).unwrap().content,
        "second"
    );
}

#[test]
fn head_remove() {
    let mut head = HeadState::new();
    head.upsert(HeadTag::new(TagId::Title, "t"));
    assert!(head.remove(&TagId::Title));
    assert!(!head.remove(&TagId::Title));
    assert!(head.is_empty());
}

#[test]
fn head_diff_identical_states_is_empty() {
    let mut a = HeadState::new();
    a.upsert(HeadTag::new(TagId::Title, "Sahifa"));
    a.upsert(HeadTag::new(TagId::MetaName("description".into()), "d"));
    let b = a.clone();
    assert!(diff(&a, &b).is_empty());
}

#[test]
fn head_diff_detects_insert_update_remove() {
    let mut current = HeadState::new();
    current.upsert(HeadTag::new(TagId::Title, "Eski"));
    current.upsert(HeadTag::new(TagId::MetaName("robots".into()), "noindex"));

    let mut desired = HeadState::new();
    desired.upsert(HeadTag::new(TagId::Title, "Yangi"));
    desired.upsert(HeadTag::new(TagId::MetaName("description".into()), "d"));

    let ops = diff(&current, &desired);
    assert_eq!(ops.len(), 3);
    assert!(ops.iter().any(|op| matches!(op, HeadOp::Update(t) if t.id == TagId::Title)));
    assert!(ops.iter().any(
        |op| matches!(op, HeadOp::Insert(t) if t.id == TagId::MetaName("description".into()))
    ));
    assert!(ops.iter().any(
        |op| matches!(op, HeadOp::Remove(id) if *id == TagId::MetaName("robots".into()))
    ));
}

#[test]
fn head_apply_converges_to_desired() {
    let mut current = HeadState::new();
    current.upsert(HeadTag::new(TagId::Title, "Eski"));
    current.upsert(HeadTag::new(TagId::MetaName("robots".into()), "noindex"));

    let mut desired = HeadState::new();
    desired.upsert(HeadTag::new(TagId::Title, "Yangi"));

    let ops = diff(&current, &desired);
    current.apply(ops);
    assert!(diff(&current, &desired).is_empty());
}

#[test]
fn head_render_escapes_content() {
    let mut head = HeadState::new();
    head.upsert(HeadTag::new(
        TagId::MetaName("description".into()),
        "a \"b\" <c>",
    ));
    let html = head.render();
    assert!(html.contains("content=\"a &quot;b&quot; &lt;c&gt;\""));
}

#[test]
fn head_render_script_attrs() {
    let mut head = HeadState::new();
    head.upsert(
        HeadTag::new(TagId::Script("x".into()), "console.log(1)")
            .with_attr("id", "x")
            .with_attr("async", ""),
    );
    let html = head.render();
    assert!(html.contains("<script id=\"x\" async>console.log(1)</script>"));
}

// ═══════════════════════════════════════════════════════════
// SEO meta writer
// ═══════════════════════════════════════════════════════════

#[test]
fn meta_repeated_builds_are_identical() {
    let store = test_store();
    let page = PageMeta::website("/uz/blog", Lang::Uz);
    let first = build_head(&store, &page);
    let second = build_head(&store, &page);
    assert_eq!(first, second);
    assert!(diff(&first, &second).is_empty());
}

#[test]
fn meta_title_change_touches_only_title_tags() {
    let store = test_store();
    let mut page = PageMeta::website("/uz/blog", Lang::Uz);
    page.title = Some("Birinchi".to_string());
    let before = build_head(&store, &page);

    page.title = Some("Ikkinchi".to_string());
    let after = build_head(&store, &page);

    let ops = diff(&before, &after);
    assert!(!ops.is_empty());
    for op in &ops {
        let id = match op {
            HeadOp::Insert(t) | HeadOp::Update(t) => t.id.clone(),
            HeadOp::Remove(id) => id.clone(),
        };
        let title_related = id == TagId::Title
            || id == TagId::MetaProperty("og:title".into())
            || id == TagId::MetaName("twitter:title".into());
        assert!(title_related, "unexpected op on {:?}", id);
    }
}

#[test]
fn meta_emits_canonical_and_all_hreflang_alternates() {
    let store = test_store();
    store.setting_set("site_url", "https://example.uz").unwrap();
    let page = PageMeta::website("/uz/blog", Lang::Uz);
    let head = build_head(&store, &page);

    assert_eq!(
        head.get(&TagId::LinkRel("canonical".into())).unwrap().content,
        "https://example.uz/uz/blog"
    );
    assert_eq!(
        head.get(&TagId::LinkAlternate("ru".into())).unwrap().content,
        "https://example.uz/ru/blog"
    );
    assert_eq!(
        head.get(&TagId::LinkAlternate("en".into())).unwrap().content,
        "https://example.uz/en/blog"
    );
    assert_eq!(
        head.get(&TagId::LinkAlternate("uz".into())).unwrap().content,
        "https://example.uz/uz/blog"
    );
}

#[test]
fn meta_merges_site_keywords_by_language() {
    let store = test_store();
    store.keyword_add("kontent marketing", Lang::Uz, 10).unwrap();
    store.keyword_add("smm", Lang::Uz, 5).unwrap();
    store.keyword_add("продвижение", Lang::Ru, 99).unwrap();

    let mut page = PageMeta::website("/uz", Lang::Uz);
    page.keywords = vec!["SMM".to_string(), "reklama".to_string()];
    let head = build_head(&store, &page);

    // Page keywords first, site keywords appended, case-insensitive dedup
    assert_eq!(
        head.get(&TagId::MetaName("keywords".into())).unwrap().content,
        "SMM, reklama, kontent marketing"
    );
}

#[test]
fn meta_article_kind_emits_article_tags() {
    let store = test_store();
    let page = PageMeta {
        title: Some("Maqola".to_string()),
        description: Some("Tavsif".to_string()),
        keywords: vec![],
        image: Some("https://example.uz/img.jpg".to_string()),
        path: "/uz/blog/maqola".to_string(),
        lang: Lang::Uz,
        kind: PageKind::Article {
            published_time: Some("2026-05-01T09:00:00".to_string()),
            author: Some("Dilnoza".to_string()),
            section: Some("SMM".to_string()),
            tags: vec!["smm".to_string(), "reklama".to_string()],
        },
    };
    let head = build_head(&store, &page);

    assert_eq!(
        head.get(&TagId::MetaProperty("og:type".into())).unwrap().content,
        "article"
    );
    assert_eq!(
        head.get(&TagId::MetaProperty("article:published_time".into()))
            .unwrap()
            .content,
        "2026-05-01T09:00:00"
    );
    assert_eq!(
        head.get(&TagId::MetaProperty("article:author".into())).unwrap().content,
        "Dilnoza"
    );
    assert_eq!(
        head.get(&TagId::MetaProperty("article:tag".into())).unwrap().content,
        "smm, reklama"
    );
    assert_eq!(
        head.get(&TagId::MetaProperty("og:image".into())).unwrap().content,
        "https://example.uz/img.jpg"
    );
}

#[test]
fn merge_keywords_dedups_case_insensitively() {
    let merged = merge_keywords(
        &["SMM".to_string(), " reklama ".to_string(), "".to_string()],
        &["smm".to_string(), "brending".to_string()],
    );
    assert_eq!(merged, vec!["SMM", "reklama", "brending"]);
}

// ═══════════════════════════════════════════════════════════
// Analytics injector
// ═══════════════════════════════════════════════════════════

fn analytics_settings(ga4: &str, gtm: &str, pixel: &str) -> HashMap<String, String> {
    let mut settings = HashMap::new();
    settings.insert("analytics_ga4_id".to_string(), ga4.to_string());
    settings.insert("analytics_gtm_id".to_string(), gtm.to_string());
    settings.insert("analytics_pixel_id".to_string(), pixel.to_string());
    settings
}

#[test]
fn analytics_injection_is_idempotent() {
    let settings = analytics_settings("G-ABC123", "GTM-XYZ", "1234567890");
    let mut head = HeadState::new();

    analytics::inject_analytics(&mut head, &settings);
    let after_first = head.len();
    analytics::inject_analytics(&mut head, &settings);

    assert_eq!(head.len(), after_first);
    for marker in [GA4_LOADER_MARKER, GA4_INIT_MARKER, GTM_MARKER, PIXEL_MARKER] {
        let count = head
            .iter()
            .filter(|t| t.id == TagId::Script(marker.into()))
            .count();
        assert_eq!(count, 1, "marker {}", marker);
    }
}

#[test]
fn analytics_empty_ids_inject_nothing() {
    let settings = analytics_settings("", "", "");
    let mut head = HeadState::new();
    analytics::inject_analytics(&mut head, &settings);
    assert!(head.is_empty());
}

#[test]
fn analytics_snippets_embed_the_ids() {
    let settings = analytics_settings("G-ABC123", "GTM-XYZ", "1234567890");
    let mut head = HeadState::new();
    analytics::inject_analytics(&mut head, &settings);
    let html = head.render();
    assert!(html.contains("gtag/js?id=G-ABC123"));
    assert!(html.contains("gtm.js?id="));
    assert!(html.contains("fbq('init','1234567890')"));
}

#[test]
fn analytics_noscript_fragments() {
    let settings = analytics_settings("", "GTM-XYZ", "1234567890");
    let html = analytics::build_noscript_fragments(&settings);
    assert!(html.contains("ns.html?id=GTM-XYZ"));
    assert!(html.contains("facebook.com/tr?id=1234567890"));

    let none = analytics::build_noscript_fragments(&analytics_settings("", "", ""));
    assert!(none.is_empty());
}

// ═══════════════════════════════════════════════════════════
// Structured data writer
// ═══════════════════════════════════════════════════════════

#[test]
fn structured_data_insert_and_clear() {
    let store = test_store();
    let id = store.post_create(&make_post_form("jsonld-post", true)).unwrap();
    let post = store.post_find_by_id(id).unwrap();

    let mut head = HeadState::new();
    jsonld::insert_structured_data(&mut head, &store, &post, None, Lang::Uz);
    assert!(head.get(&TagId::Script(ARTICLE_MARKER.into())).is_some());
    assert!(head.get(&TagId::Script(BREADCRUMB_MARKER.into())).is_some());

    // Re-render replaces, never duplicates
    jsonld::insert_structured_data(&mut head, &store, &post, None, Lang::Uz);
    assert_eq!(head.len(), 2);

    jsonld::clear_structured_data(&mut head);
    assert_eq!(
        head.iter()
            .filter(|t| matches!(t.id, TagId::Script(_)))
            .count(),
        0
    );
}

#[test]
fn breadcrumb_positions_shift_with_category() {
    let store = test_store();
    let cat_id = store
        .category_create(&CategoryForm {
            slug: "smm".to_string(),
            name_uz: "SMM".to_string(),
            name_ru: "SMM".to_string(),
            name_en: "SMM".to_string(),
            description_uz: None,
            description_ru: None,
            description_en: None,
        })
        .unwrap();
    let category = store.category_find_by_id(cat_id).unwrap();

    let post_id = store.post_create(&make_post_form("breadcrumb", true)).unwrap();
    let post = store.post_find_by_id(post_id).unwrap();

    let without = jsonld::breadcrumb_tag(&store, &post, None, Lang::Uz);
    let parsed: serde_json::Value = serde_json::from_str(&without.content).unwrap();
    let items = parsed["itemListElement"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2]["position"], 3);
    assert_eq!(items[2]["name"], "breadcrumb uz");

    let with = jsonld::breadcrumb_tag(&store, &post, Some(&category), Lang::Uz);
    let parsed: serde_json::Value = serde_json::from_str(&with.content).unwrap();
    let items = parsed["itemListElement"].as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[2]["name"], "SMM");
    assert_eq!(items[2]["position"], 3);
    assert_eq!(items[3]["position"], 4);
}

#[test]
fn article_jsonld_carries_language_and_dates() {
    let store = test_store();
    store.setting_set("author_name", "Dilnoza").unwrap();
    let id = store.post_create(&make_post_form("maqola", true)).unwrap();
    let post = store.post_find_by_id(id).unwrap();

    let tag = jsonld::article_tag(&store, &post, Lang::Ru);
    let parsed: serde_json::Value = serde_json::from_str(&tag.content).unwrap();
    assert_eq!(parsed["@type"], "Article");
    assert_eq!(parsed["headline"], "maqola ru");
    assert_eq!(parsed["inLanguage"], "ru");
    assert_eq!(parsed["author"]["name"], "Dilnoza");
    assert!(parsed["datePublished"].as_str().unwrap().contains('T'));
}

// ═══════════════════════════════════════════════════════════
// Search engine pings
// ═══════════════════════════════════════════════════════════

#[test]
fn ping_urls_are_percent_encoded() {
    let url = google_ping_url("https://example.uz/sitemap.xml");
    assert_eq!(
        url,
        "https://www.google.com/ping?sitemap=https%3A%2F%2Fexample.uz%2Fsitemap.xml"
    );
    let yandex = yandex_ping_url("https://example.uz/sitemap.xml");
    assert!(yandex.starts_with("https://webmaster.yandex.com/ping?sitemap="));
    assert!(!yandex.contains("://example"));
}

#[test]
fn indexnow_payload_shape() {
    let urls = vec![
        "https://example.uz/uz/blog/a".to_string(),
        "https://example.uz/uz/blog/b".to_string(),
    ];
    let payload = indexnow_payload("example.uz", "abc123", &urls);
    assert_eq!(payload["host"], "example.uz");
    assert_eq!(payload["key"], "abc123");
    assert_eq!(payload["urlList"].as_array().unwrap().len(), 2);
}

#[test]
fn ping_request_url_collection() {
    let single = PingRequest {
        url: Some("https://example.uz/uz/blog/a".to_string()),
        urls: None,
    };
    assert_eq!(collect_urls(&single).len(), 1);

    let many = PingRequest {
        url: None,
        urls: Some(vec![
            "https://example.uz/a".to_string(),
            " ".to_string(),
            "https://example.uz/b".to_string(),
        ]),
    };
    assert_eq!(collect_urls(&many).len(), 2);

    let both = PingRequest {
        url: Some("https://example.uz/a".to_string()),
        urls: Some(vec!["https://example.uz/b".to_string()]),
    };
    assert_eq!(collect_urls(&both).len(), 2);

    assert!(collect_urls(&PingRequest::default()).is_empty());
}

// ═══════════════════════════════════════════════════════════
// llms.txt generator
// ═══════════════════════════════════════════════════════════

#[test]
fn llms_without_posts_keeps_static_sections() {
    let store = test_store();
    store.setting_set("site_name", "Example Agency").unwrap();
    store.setting_set("site_tagline", "Kontent marketing").unwrap();
    store.setting_set("author_bio", "10 yillik tajriba").unwrap();
    store
        .setting_set("services", "SMM\nKontent strategiya\n")
        .unwrap();

    let doc = llms::generate(&store);
    assert!(doc.starts_with("# Example Agency"));
    assert!(doc.contains("> Kontent marketing"));
    assert!(doc.contains("## About"));
    assert!(doc.contains("- SMM"));
    assert!(doc.contains("## Key Pages"));
    assert!(!doc.contains("## Recent Posts"));
}

#[test]
fn llms_lists_recent_posts_newest_first_capped_at_30() {
    let store = test_store();
    for i in 0..35 {
        store
            .post_create(&make_post_form(&format!("post-{}", i), true))
            .unwrap();
    }
    // Deterministic, strictly increasing publish dates
    let conn = store.pool.get().unwrap();
    conn.execute(
        "UPDATE posts SET published_at = datetime('2026-01-01', '+' || id || ' days')",
        [],
    )
    .unwrap();
    drop(conn);

    let doc = llms::generate(&store);
    let entries = doc.matches("### ").count();
    assert_eq!(entries, 30);

    // Newest (highest id) first
    let newest = doc.find("post-34 uz").unwrap();
    let older = doc.find("post-10 uz").unwrap();
    assert!(newest < older);
    // The five oldest fell off the end
    assert!(!doc.contains("post-0 uz\n"));
}

#[test]
fn llms_entries_carry_date_tags_and_excerpt() {
    let store = test_store();
    store.post_create(&make_post_form("tola-post", true)).unwrap();
    let doc = llms::generate(&store);
    assert!(doc.contains("### tola-post uz"));
    assert!(doc.contains("Date: "));
    assert!(doc.contains("Tags: smm, kontent"));
    assert!(doc.contains("qisqacha"));
}

#[test]
fn llms_truncates_long_excerpts() {
    let store = test_store();
    let mut form = make_post_form("uzun", true);
    form.excerpt_uz = Some("a".repeat(500));
    store.post_create(&form).unwrap();

    let doc = llms::generate(&store);
    assert!(doc.contains(&format!("{}...", "a".repeat(200))));
    assert!(!doc.contains(&"a".repeat(201)));
}

#[test]
fn llms_falls_back_on_bad_site_url() {
    let store = test_store();
    store.setting_set("site_name", "Example Agency").unwrap();
    store.setting_set("site_url", "not a url").unwrap();
    let doc = llms::generate(&store);
    assert!(doc.starts_with("# Example Agency"));
    assert_eq!(doc.lines().count(), 3);
    assert!(!doc.contains("## Key Pages"));
}

// ═══════════════════════════════════════════════════════════
// Sitemap / robots / feed
// ═══════════════════════════════════════════════════════════

#[test]
fn sitemap_covers_all_language_variants() {
    let store = test_store();
    store.setting_set("site_url", "https://example.uz").unwrap();
    store.post_create(&make_post_form("sayt-xarita", true)).unwrap();

    let xml = sitemap::generate_sitemap(&store).unwrap();
    for lang in ["uz", "ru", "en"] {
        assert!(xml.contains(&format!("https://example.uz/{}/blog/sayt-xarita", lang)));
        assert!(xml.contains(&format!("<loc>https://example.uz/{}</loc>", lang)));
    }
}

#[test]
fn sitemap_disabled_returns_none() {
    let store = test_store();
    store.setting_set("seo_sitemap_enabled", "false").unwrap();
    assert!(sitemap::generate_sitemap(&store).is_none());
}

#[test]
fn robots_appends_sitemap_pointer() {
    let store = test_store();
    store.setting_set("site_url", "https://example.uz").unwrap();
    let robots = sitemap::generate_robots(&store);
    assert!(robots.contains("User-agent: *"));
    assert!(robots.ends_with("Sitemap: https://example.uz/sitemap.xml"));
}

#[test]
fn feed_lists_published_posts() {
    let store = test_store();
    store.setting_set("site_url", "https://example.uz").unwrap();
    store.post_create(&make_post_form("rss-post", true)).unwrap();
    store.post_create(&make_post_form("qoralama", false)).unwrap();

    let xml = rss::generate_feed(&store);
    assert!(xml.contains("<language>uz</language>"));
    assert!(xml.contains("https://example.uz/uz/blog/rss-post"));
    assert!(!xml.contains("qoralama"));
}

// ═══════════════════════════════════════════════════════════
// Reply mailer
// ═══════════════════════════════════════════════════════════

#[test]
fn reply_fails_fast_without_smtp_credentials() {
    let store = test_store();
    // Seeded defaults leave SMTP unconfigured
    let err = email::send_reply(
        &store,
        "mijoz@example.com",
        "Aziz",
        "Javob",
        "Rahmat!",
        "Narxlar qanday?",
    )
    .unwrap_err();
    assert!(err.contains("SMTP is not configured"));
}

#[test]
fn reply_template_quotes_the_original() {
    let html = email::render_reply_html(
        "Example Agency",
        "Aziz",
        "Rahmat!\nTez orada bog'lanamiz.",
        "Narxlar <qanday>?",
    );
    assert!(html.contains("Assalomu alaykum, Aziz,"));
    assert!(html.contains("Rahmat!<br>Tez orada bog'lanamiz."));
    // Original is quoted and escaped
    assert!(html.contains("Sizning xabaringiz"));
    assert!(html.contains("Narxlar &lt;qanday&gt;?"));
    assert!(html.contains("Example Agency"));
}

// ═══════════════════════════════════════════════════════════
// API request validation
// ═══════════════════════════════════════════════════════════

#[test]
fn reply_request_requires_recipient_subject_and_body() {
    let full = ReplyRequest {
        to: Some("mijoz@example.com".to_string()),
        to_name: Some("Aziz".to_string()),
        subject: Some("Javob".to_string()),
        message: Some("Rahmat".to_string()),
        original_message: Some("Salom".to_string()),
        message_id: None,
    };
    assert!(full.validate().is_ok());

    let missing = ReplyRequest {
        subject: Some("Javob".to_string()),
        message: Some("Rahmat".to_string()),
        ..Default::default()
    };
    assert_eq!(
        missing.validate().unwrap_err(),
        "Missing required field: to"
    );
}

#[test]
fn contact_request_validation() {
    let ok = ContactRequest {
        name: Some("Aziz".to_string()),
        email: Some("aziz@example.com".to_string()),
        message: Some("Salom".to_string()),
    };
    let form = ok.validate().unwrap();
    assert_eq!(form.name, "Aziz");

    let missing = ContactRequest {
        name: Some("Aziz".to_string()),
        email: None,
        message: Some("Salom".to_string()),
    };
    assert_eq!(
        missing.validate().unwrap_err(),
        "Missing required field: email"
    );
}

// ═══════════════════════════════════════════════════════════
// Rate limiter
// ═══════════════════════════════════════════════════════════

#[test]
fn rate_limiter_blocks_over_limit() {
    use std::time::Duration;
    let limiter = crate::rate_limit::RateLimiter::new();
    let window = Duration::from_secs(60);
    assert!(limiter.check_and_record("contact:x", 2, window));
    assert!(limiter.check_and_record("contact:x", 2, window));
    assert!(!limiter.check_and_record("contact:x", 2, window));
    // Other keys are unaffected
    assert!(limiter.check_and_record("contact:y", 2, window));
}

#[test]
fn hash_client_is_stable() {
    let a = crate::rate_limit::hash_client("203.0.113.7");
    let b = crate::rate_limit::hash_client("203.0.113.7");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
}
