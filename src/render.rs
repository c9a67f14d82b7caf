//! HTML assembly for the public pages. The head comes in as a rendered
//! [`HeadState`]; this module only wraps it with the document shell and
//! the shared body sections.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::lang::Lang;
use crate::models::post::Post;
use crate::seo::html_escape;
use crate::seo::{analytics, HeadState};

pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    date.format(format).to_string()
}

/// Small trilingual UI dictionary for the shared chrome.
pub fn ui(lang: Lang, key: &str) -> &'static str {
    match (key, lang) {
        ("blog", Lang::Uz) => "Blog",
        ("blog", Lang::Ru) => "Блог",
        ("blog", Lang::En) => "Blog",
        ("read_more", Lang::Uz) => "Batafsil",
        ("read_more", Lang::Ru) => "Подробнее",
        ("read_more", Lang::En) => "Read more",
        ("recent_posts", Lang::Uz) => "So'nggi maqolalar",
        ("recent_posts", Lang::Ru) => "Последние статьи",
        ("recent_posts", Lang::En) => "Recent posts",
        ("reading_time", Lang::Uz) => "daqiqa o'qish",
        ("reading_time", Lang::Ru) => "мин чтения",
        ("reading_time", Lang::En) => "min read",
        ("cta_text", Lang::Uz) => "Loyihangiz haqida gaplashamizmi?",
        ("cta_text", Lang::Ru) => "Обсудим ваш проект?",
        ("cta_text", Lang::En) => "Let's talk about your project",
        ("cta_button", Lang::Uz) => "Bog'lanish",
        ("cta_button", Lang::Ru) => "Связаться",
        ("cta_button", Lang::En) => "Get in touch",
        _ => "",
    }
}

/// Wrap a rendered head and a body fragment into the full document.
pub fn render_page(
    settings: &HashMap<String, String>,
    head: &HeadState,
    lang: Lang,
    body: &str,
) -> String {
    let site_name = settings
        .get("site_name")
        .cloned()
        .unwrap_or_else(|| "Maqola".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{head}</head>
<body>
{noscript}<header class="site-header">
    <a class="site-logo" href="/{lang}">{site_name}</a>
    <nav class="site-nav">{nav}</nav>
</header>
<main>
{body}
</main>
{footer}</body>
</html>"#,
        lang = lang.code(),
        head = head.render(),
        noscript = analytics::build_noscript_fragments(settings),
        site_name = html_escape(&site_name),
        nav = nav_links(lang),
        body = body,
        footer = footer(settings),
    )
}

fn nav_links(lang: Lang) -> String {
    let mut html = format!(
        "<a href=\"/{}/blog\">{}</a>",
        lang.code(),
        ui(lang, "blog")
    );
    for other in Lang::ALL {
        if other != lang {
            html.push_str(&format!(
                " <a class=\"lang-switch\" href=\"/{code}\">{code}</a>",
                code = other.code()
            ));
        }
    }
    html
}

/// Hero banner on the home page: site tagline and description.
pub fn hero_section(settings: &HashMap<String, String>, lang: Lang) -> String {
    let tagline = settings.get("site_tagline").cloned().unwrap_or_default();
    let description = settings
        .get(&format!("site_description_{}", lang.code()))
        .cloned()
        .unwrap_or_default();

    format!(
        r#"<section class="hero">
    <h1>{}</h1>
    <p>{}</p>
</section>
"#,
        html_escape(&tagline),
        html_escape(&description),
    )
}

/// One post card in a listing.
pub fn post_card(post: &Post, blog_slug: &str, lang: Lang) -> String {
    let excerpt = post.excerpt(lang).unwrap_or("");
    let date = post
        .published_at
        .map(|d| format_date(&d, "%Y-%m-%d"))
        .unwrap_or_default();

    format!(
        r#"<article class="post-card">
    <h2><a href="{path}">{title}</a></h2>
    <p class="post-meta"><time datetime="{date}">{date}</time> · {minutes} {rt}</p>
    <p>{excerpt}</p>
    <a class="read-more" href="{path}">{read_more}</a>
</article>
"#,
        path = post.path(blog_slug, lang),
        title = html_escape(post.title(lang)),
        date = date,
        minutes = post.reading_time,
        rt = ui(lang, "reading_time"),
        excerpt = html_escape(excerpt),
        read_more = ui(lang, "read_more"),
    )
}

/// Call-to-action banner shown under listings and posts.
pub fn cta_banner(lang: Lang) -> String {
    format!(
        r#"<section class="cta-banner">
    <h2>{}</h2>
    <a class="cta-button" href="/{}/contact">{}</a>
</section>
"#,
        ui(lang, "cta_text"),
        lang.code(),
        ui(lang, "cta_button"),
    )
}

fn footer(settings: &HashMap<String, String>) -> String {
    let socials = [
        ("social_instagram", "Instagram"),
        ("social_telegram", "Telegram"),
        ("social_facebook", "Facebook"),
        ("social_youtube", "YouTube"),
        ("social_linkedin", "LinkedIn"),
    ];

    let mut links = String::new();
    for (key, label) in socials {
        if let Some(url) = settings.get(key).filter(|v| !v.is_empty()) {
            links.push_str(&format!(
                "<a href=\"{}\" rel=\"noopener\">{}</a> ",
                html_escape(url),
                label
            ));
        }
    }

    let site_name = settings
        .get("site_name")
        .cloned()
        .unwrap_or_else(|| "Maqola".to_string());

    format!(
        "<footer class=\"site-footer\">\n    <div class=\"social-links\">{}</div>\n    <p>© {}</p>\n</footer>\n",
        links.trim_end(),
        html_escape(&site_name),
    )
}
