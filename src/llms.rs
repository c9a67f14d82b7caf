//! `llms.txt` document generator.
//!
//! A fixed plain-text digest of the site for language-model crawlers:
//! identity, author, services, key pages, categories and the most recent
//! published posts. Served with a one-hour cache directive.

use url::Url;

use crate::lang::Lang;
use crate::store::Store;

/// Recent posts included in the digest.
const RECENT_POST_LIMIT: i64 = 30;
/// Excerpts are cut to this many characters.
const EXCERPT_CHAR_LIMIT: usize = 200;

/// Generate the digest, or the minimal fallback document when the full
/// render fails.
pub fn generate(store: &dyn Store) -> String {
    match build(store) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("llms.txt generation failed, serving fallback: {}", e);
            fallback(store)
        }
    }
}

/// Two-line minimal document used when the full digest cannot be built.
pub fn fallback(store: &dyn Store) -> String {
    let site_name = store.setting_get_or("site_name", "Maqola");
    let tagline = store.setting_get_or("site_tagline", "");
    format!("# {}\n\n> {}\n", site_name, tagline)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

fn build(store: &dyn Store) -> Result<String, String> {
    let site_name = store.setting_get_or("site_name", "Maqola");
    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    let site_url = site_url.trim_end_matches('/').to_string();
    Url::parse(&site_url).map_err(|e| format!("Invalid site URL '{}': {}", site_url, e))?;

    let lang = Lang::from_code(&store.setting_get_or("default_language", "uz"))
        .unwrap_or_default();
    let blog_slug = store.setting_get_or("blog_slug", "blog");
    let description = store.setting_get_or(&format!("site_description_{}", lang.code()), "");
    let tagline = store.setting_get_or("site_tagline", "");
    let author_name = store.setting_get_or("author_name", "");
    let author_bio = store.setting_get_or("author_bio", "");
    let services = store.setting_get_or("services", "");

    let mut doc = format!("# {}\n\n> {}\n", site_name, tagline);

    if !description.is_empty() {
        doc.push_str(&format!("\n{}\n", description));
    }

    if !author_name.is_empty() || !author_bio.is_empty() {
        doc.push_str("\n## About\n\n");
        if !author_name.is_empty() {
            doc.push_str(&format!("{}\n", author_name));
        }
        if !author_bio.is_empty() {
            doc.push_str(&format!("{}\n", author_bio));
        }
    }

    let service_lines: Vec<&str> = services
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if !service_lines.is_empty() {
        doc.push_str("\n## Services\n\n");
        for service in service_lines {
            doc.push_str(&format!("- {}\n", service));
        }
    }

    doc.push_str(&format!(
        "\n## Key Pages\n\n- Home: {site}/{lang}\n- Blog: {site}/{lang}/{blog}\n- Contact: {site}/{lang}/contact\n",
        site = site_url,
        lang = lang.code(),
        blog = blog_slug,
    ));

    let categories = store.category_list();
    if !categories.is_empty() {
        doc.push_str("\n## Categories\n\n");
        for category in &categories {
            doc.push_str(&format!(
                "- {}: {}\n",
                category.name(lang),
                category.url(&site_url, lang)
            ));
        }
    }

    let posts = store.post_list_published(RECENT_POST_LIMIT, 0);
    if !posts.is_empty() {
        doc.push_str("\n## Recent Posts\n");
        for post in &posts {
            doc.push_str(&format!(
                "\n### {}\nURL: {}\n",
                post.title(lang),
                post.url(&site_url, &blog_slug, lang)
            ));
            if let Some(date) = post.published_at {
                doc.push_str(&format!("Date: {}\n", date.format("%Y-%m-%d")));
            }
            if !post.tags.is_empty() {
                doc.push_str(&format!("Tags: {}\n", post.tags.join(", ")));
            }
            if let Some(excerpt) = post.excerpt(lang) {
                if !excerpt.is_empty() {
                    doc.push_str(&format!(
                        "{}\n",
                        truncate_chars(excerpt, EXCERPT_CHAR_LIMIT)
                    ));
                }
            }
        }
    }

    Ok(doc)
}
