use std::sync::Arc;

use rocket::response::content::{RawHtml, RawXml};
use rocket::response::Redirect;
use rocket::State;

use crate::lang::Lang;
use crate::llms;
use crate::render;
use crate::rss;
use crate::seo::{self, analytics, jsonld, PageKind, PageMeta};
use crate::store::Store;

use super::CachedText;

// ── Home ───────────────────────────────────────────────

#[get("/")]
pub fn root(store: &State<Arc<dyn Store>>) -> Redirect {
    let lang = store.setting_get_or("default_language", "uz");
    Redirect::to(format!("/{}", lang))
}

#[get("/<lang>")]
pub fn home(store: &State<Arc<dyn Store>>, lang: Lang) -> RawHtml<String> {
    let settings = store.setting_all();
    let blog_slug = store.setting_get_or("blog_slug", "blog");
    let posts = store.post_list_published(6, 0);

    let page = PageMeta {
        description: Some(store.setting_get_or(
            &format!("site_description_{}", lang.code()),
            "",
        ))
        .filter(|d| !d.is_empty()),
        ..PageMeta::website(&format!("/{}", lang.code()), lang)
    };
    let mut head = seo::build_head(store.inner().as_ref(), &page);
    analytics::inject_analytics(&mut head, &settings);

    let mut body = render::hero_section(&settings, lang);
    body.push_str(&format!(
        "<section class=\"recent-posts\">\n<h2>{}</h2>\n",
        render::ui(lang, "recent_posts")
    ));
    for post in &posts {
        body.push_str(&render::post_card(post, &blog_slug, lang));
    }
    body.push_str("</section>\n");
    body.push_str(&render::cta_banner(lang));

    RawHtml(render::render_page(&settings, &head, lang, &body))
}

// ── Blog ───────────────────────────────────────────────

#[get("/<lang>/blog?<page>")]
pub fn blog_index(store: &State<Arc<dyn Store>>, lang: Lang, page: Option<i64>) -> RawHtml<String> {
    let settings = store.setting_all();
    let blog_slug = store.setting_get_or("blog_slug", "blog");
    let per_page = 10;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    let posts = store.post_list_published(per_page, offset);

    let page_meta = PageMeta {
        title: Some(render::ui(lang, "blog").to_string()),
        ..PageMeta::website(&format!("/{}/blog", lang.code()), lang)
    };
    let mut head = seo::build_head(store.inner().as_ref(), &page_meta);
    analytics::inject_analytics(&mut head, &settings);

    let mut body = format!("<h1>{}</h1>\n", render::ui(lang, "blog"));
    for post in &posts {
        body.push_str(&render::post_card(post, &blog_slug, lang));
    }
    body.push_str(&render::cta_banner(lang));

    RawHtml(render::render_page(&settings, &head, lang, &body))
}

#[get("/<lang>/blog/<slug>")]
pub fn post_detail(
    store: &State<Arc<dyn Store>>,
    lang: Lang,
    slug: &str,
) -> Option<RawHtml<String>> {
    let post = store.post_find_by_slug(slug)?;
    if !post.published {
        return None;
    }

    let settings = store.setting_all();
    let category = post.category_id.and_then(|id| store.category_find_by_id(id));

    let page_meta = PageMeta {
        title: Some(post.seo_title(lang).to_string()),
        description: post.seo_description(lang).map(|d| d.to_string()),
        keywords: post.focus_keywords.clone(),
        image: post.featured_image.clone(),
        path: format!("/{}/blog/{}", lang.code(), post.slug),
        lang,
        kind: PageKind::Article {
            published_time: post
                .published_at
                .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
            author: Some(store.setting_get_or("author_name", ""))
                .filter(|a| !a.is_empty()),
            section: category.as_ref().map(|c| c.name(lang).to_string()),
            tags: post.tags.clone(),
        },
    };
    let mut head = seo::build_head(store.inner().as_ref(), &page_meta);
    if store.setting_get_bool("seo_structured_data") {
        jsonld::insert_structured_data(
            &mut head,
            store.inner().as_ref(),
            &post,
            category.as_ref(),
            lang,
        );
    }
    analytics::inject_analytics(&mut head, &settings);

    let date = post
        .published_at
        .map(|d| render::format_date(&d, "%Y-%m-%d"))
        .unwrap_or_default();
    let mut body = format!(
        "<article class=\"post\">\n<h1>{}</h1>\n<p class=\"post-meta\"><time datetime=\"{date}\">{date}</time> · {} {}</p>\n{}\n",
        crate::seo::html_escape(post.title(lang)),
        post.reading_time,
        render::ui(lang, "reading_time"),
        post.content(lang),
        date = date,
    );
    if !post.tags.is_empty() {
        body.push_str("<ul class=\"post-tags\">");
        for tag in &post.tags {
            body.push_str(&format!("<li>{}</li>", crate::seo::html_escape(tag)));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</article>\n");
    body.push_str(&render::cta_banner(lang));

    Some(RawHtml(render::render_page(&settings, &head, lang, &body)))
}

// ── Categories ─────────────────────────────────────────

#[get("/<lang>/category/<slug>?<page>")]
pub fn category_page(
    store: &State<Arc<dyn Store>>,
    lang: Lang,
    slug: &str,
    page: Option<i64>,
) -> Option<RawHtml<String>> {
    let category = store.category_find_by_slug(slug)?;
    let settings = store.setting_all();
    let blog_slug = store.setting_get_or("blog_slug", "blog");
    let per_page = 10;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    let posts = store.post_by_category(category.id, per_page, offset);

    let page_meta = PageMeta {
        title: Some(category.name(lang).to_string()),
        description: category.description(lang).map(|d| d.to_string()),
        ..PageMeta::website(&category.path(lang), lang)
    };
    let mut head = seo::build_head(store.inner().as_ref(), &page_meta);
    analytics::inject_analytics(&mut head, &settings);

    let mut body = format!(
        "<h1>{}</h1>\n",
        crate::seo::html_escape(category.name(lang))
    );
    if let Some(desc) = category.description(lang) {
        body.push_str(&format!("<p>{}</p>\n", crate::seo::html_escape(desc)));
    }
    for post in &posts {
        body.push_str(&render::post_card(post, &blog_slug, lang));
    }
    body.push_str(&render::cta_banner(lang));

    Some(RawHtml(render::render_page(&settings, &head, lang, &body)))
}

// ── Contact ────────────────────────────────────────────

#[get("/<lang>/contact")]
pub fn contact_page(store: &State<Arc<dyn Store>>, lang: Lang) -> RawHtml<String> {
    let settings = store.setting_all();

    let page_meta = PageMeta {
        title: Some(render::ui(lang, "cta_button").to_string()),
        ..PageMeta::website(&format!("/{}/contact", lang.code()), lang)
    };
    let mut head = seo::build_head(store.inner().as_ref(), &page_meta);
    analytics::inject_analytics(&mut head, &settings);

    let body = format!(
        r#"<section class="contact">
<h1>{title}</h1>
<form id="contact-form" method="post" action="/api/contact-message">
    <input type="text" name="name" required>
    <input type="email" name="email" required>
    <textarea name="message" required></textarea>
    <button type="submit">{button}</button>
</form>
<script>
document.getElementById('contact-form').addEventListener('submit', async function (e) {{
    e.preventDefault();
    const data = Object.fromEntries(new FormData(this));
    await fetch('/api/contact-message', {{
        method: 'POST',
        headers: {{'Content-Type': 'application/json'}},
        body: JSON.stringify(data),
    }});
    this.reset();
}});
</script>
</section>
"#,
        title = render::ui(lang, "cta_text"),
        button = render::ui(lang, "cta_button"),
    );

    RawHtml(render::render_page(&settings, &head, lang, &body))
}

// ── Crawler endpoints ──────────────────────────────────

#[get("/sitemap.xml")]
pub fn sitemap(store: &State<Arc<dyn Store>>) -> Option<RawXml<String>> {
    seo::sitemap::generate_sitemap(store.inner().as_ref()).map(RawXml)
}

#[get("/robots.txt")]
pub fn robots(store: &State<Arc<dyn Store>>) -> String {
    seo::sitemap::generate_robots(store.inner().as_ref())
}

#[get("/feed")]
pub fn feed(store: &State<Arc<dyn Store>>) -> RawXml<String> {
    RawXml(rss::generate_feed(store.inner().as_ref()))
}

#[get("/llms.txt")]
pub fn llms_txt(store: &State<Arc<dyn Store>>) -> CachedText {
    CachedText::hour(llms::generate(store.inner().as_ref()))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        root,
        home,
        blog_index,
        post_detail,
        category_page,
        contact_page,
        sitemap,
        robots,
        feed,
        llms_txt,
    ]
}
