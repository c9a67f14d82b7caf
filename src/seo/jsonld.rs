use serde_json::json;

use crate::lang::Lang;
use crate::models::category::Category;
use crate::models::post::Post;
use crate::store::Store;

use super::head::{HeadState, HeadTag, TagId};

pub const ARTICLE_MARKER: &str = "article-jsonld";
pub const BREADCRUMB_MARKER: &str = "breadcrumb-jsonld";

fn script_tag(marker: &str, body: String) -> HeadTag {
    HeadTag::new(TagId::Script(marker.into()), body)
        .with_attr("type", "application/ld+json")
        .with_attr("data-type", marker)
}

/// Article structured data for a post detail page.
pub fn article_tag(store: &dyn Store, post: &Post, lang: Lang) -> HeadTag {
    let site_name = store.setting_get_or("site_name", "Maqola");
    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    let blog_slug = store.setting_get_or("blog_slug", "blog");
    let author_name = store.setting_get_or("author_name", "");

    let published = post
        .published_at
        .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_default();
    let modified = post.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string();

    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": post.title(lang),
        "description": post.seo_description(lang).unwrap_or(""),
        "url": post.url(&site_url, &blog_slug, lang),
        "inLanguage": lang.code(),
        "datePublished": published,
        "dateModified": modified,
        "publisher": {
            "@type": "Organization",
            "name": site_name,
        },
    });

    if !author_name.is_empty() {
        ld["author"] = json!({ "@type": "Person", "name": author_name });
    }
    if let Some(ref img) = post.featured_image {
        if !img.is_empty() {
            ld["image"] = json!(img);
        }
    }
    if !post.tags.is_empty() {
        ld["keywords"] = json!(post.tags.join(", "));
    }

    script_tag(ARTICLE_MARKER, ld.to_string())
}

/// BreadcrumbList structured data. Position numbering shifts by one when a
/// category is present: Home=1, Blog=2, [Category=3], Title=last.
pub fn breadcrumb_tag(
    store: &dyn Store,
    post: &Post,
    category: Option<&Category>,
    lang: Lang,
) -> HeadTag {
    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    let site_url = site_url.trim_end_matches('/').to_string();
    let blog_slug = store.setting_get_or("blog_slug", "blog");

    let mut items = vec![
        json!({
            "@type": "ListItem",
            "position": 1,
            "name": "Home",
            "item": format!("{}/{}", site_url, lang.code()),
        }),
        json!({
            "@type": "ListItem",
            "position": 2,
            "name": "Blog",
            "item": format!("{}/{}/{}", site_url, lang.code(), blog_slug),
        }),
    ];

    if let Some(cat) = category {
        items.push(json!({
            "@type": "ListItem",
            "position": 3,
            "name": cat.name(lang),
            "item": cat.url(&site_url, lang),
        }));
    }

    items.push(json!({
        "@type": "ListItem",
        "position": items.len() + 1,
        "name": post.title(lang),
        "item": post.url(&site_url, &blog_slug, lang),
    }));

    let ld = json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": items,
    });

    script_tag(BREADCRUMB_MARKER, ld.to_string())
}

/// Replace any previous structured data on the page with fresh blocks.
pub fn insert_structured_data(
    head: &mut HeadState,
    store: &dyn Store,
    post: &Post,
    category: Option<&Category>,
    lang: Lang,
) {
    clear_structured_data(head);
    head.upsert(article_tag(store, post, lang));
    head.upsert(breadcrumb_tag(store, post, category, lang));
}

/// Drop both JSON-LD blocks so no stale structured data survives into the
/// next page's head.
pub fn clear_structured_data(head: &mut HeadState) {
    head.remove(&TagId::Script(ARTICLE_MARKER.into()));
    head.remove(&TagId::Script(BREADCRUMB_MARKER.into()));
}
