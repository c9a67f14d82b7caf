use chrono::{DateTime, Utc};

use crate::lang::Lang;
use crate::store::Store;

/// Generate RSS 2.0 XML feed for published posts in the default language.
pub fn generate_feed(store: &dyn Store) -> String {
    let site_name = store.setting_get_or("site_name", "Maqola");
    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    let site_url = site_url.trim_end_matches('/').to_string();
    let site_tagline = store.setting_get_or("site_tagline", "");
    let blog_slug = store.setting_get_or("blog_slug", "blog");
    let lang = Lang::from_code(&store.setting_get_or("default_language", "uz"))
        .unwrap_or_default();

    let posts = store.post_list_published(25, 0);

    // RFC 2822 dates as required by the RSS spec
    let format_rfc2822 = |ndt: chrono::NaiveDateTime| -> String {
        let utc: DateTime<Utc> = DateTime::from_naive_utc_and_offset(ndt, Utc);
        utc.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
    };

    let last_build = posts
        .first()
        .and_then(|p| p.published_at)
        .map(|d| format!("    <lastBuildDate>{}</lastBuildDate>\n", format_rfc2822(d)))
        .unwrap_or_default();

    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
<channel>
    <title>{title}</title>
    <link>{url}</link>
    <description>{desc}</description>
    <atom:link href="{url}/feed" rel="self" type="application/rss+xml"/>
    <language>{lang}</language>
{last_build}"#,
        title = xml_escape(&site_name),
        url = xml_escape(&site_url),
        desc = xml_escape(&site_tagline),
        lang = lang.code(),
        last_build = last_build,
    );

    for post in &posts {
        let pub_date = post.published_at.map(&format_rfc2822).unwrap_or_default();
        let link = post.url(&site_url, &blog_slug, lang);

        xml.push_str(&format!(
            r#"    <item>
        <title>{title}</title>
        <link>{link}</link>
        <guid isPermaLink="true">{link}</guid>
        <pubDate>{date}</pubDate>
        <description>{desc}</description>
    </item>
"#,
            title = xml_escape(post.title(lang)),
            link = xml_escape(&link),
            date = pub_date,
            desc = xml_escape(post.excerpt(lang).unwrap_or("")),
        ));
    }

    xml.push_str("</channel>\n</rss>");
    xml
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
