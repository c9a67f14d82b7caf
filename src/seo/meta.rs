use crate::lang::{localize_path, Lang};
use crate::store::Store;

use super::head::{HeadState, HeadTag, TagId};

/// How many stored keywords are merged into a page's keyword set.
const SITE_KEYWORD_LIMIT: i64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum PageKind {
    Website,
    Article {
        published_time: Option<String>,
        author: Option<String>,
        section: Option<String>,
        tags: Vec<String>,
    },
}

/// Route-level inputs for one page's head.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub image: Option<String>,
    /// Language-prefixed site path, e.g. `/uz/blog/my-post`.
    pub path: String,
    pub lang: Lang,
    pub kind: PageKind,
}

impl PageMeta {
    pub fn website(path: &str, lang: Lang) -> Self {
        PageMeta {
            title: None,
            description: None,
            keywords: Vec::new(),
            image: None,
            path: path.to_string(),
            lang,
            kind: PageKind::Website,
        }
    }
}

/// Merge page keywords with the stored site-wide set, de-duplicated
/// case-insensitively, first occurrence wins.
pub fn merge_keywords(page: &[String], site: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for kw in page.iter().chain(site.iter()) {
        let trimmed = kw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = trimmed.to_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Build the desired head state for a page. Deterministic in its inputs:
/// calling twice with the same store contents and props yields an equal
/// state, so reconciliation against a previous render is a no-op.
pub fn build_head(store: &dyn Store, page: &PageMeta) -> HeadState {
    let site_name = store.setting_get_or("site_name", "Maqola");
    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    let site_url = site_url.trim_end_matches('/').to_string();
    let title_template = store.setting_get_or("seo_title_template", "{{title}} — {{site_name}}");
    let default_desc = store.setting_get_or("seo_default_description", "");
    let default_image = store.setting_get_or("seo_default_image", "");
    let og_enabled = store.setting_get_bool("seo_open_graph");
    let twitter_enabled = store.setting_get_bool("seo_twitter_cards");

    let page_title = match &page.title {
        Some(t) => title_template
            .replace("{{title}}", t)
            .replace("{{site_name}}", &site_name),
        None => site_name.clone(),
    };
    let page_desc = page
        .description
        .clone()
        .unwrap_or_else(|| default_desc.clone());
    let canonical = format!("{}{}", site_url, page.path);
    let image = page
        .image
        .clone()
        .filter(|i| !i.is_empty())
        .or_else(|| Some(default_image.clone()).filter(|i| !i.is_empty()));

    let mut head = HeadState::new();

    // Basic meta
    head.upsert(HeadTag::new(TagId::Title, &page_title));
    head.upsert(HeadTag::new(TagId::MetaName("description".into()), &page_desc));

    let site_keywords: Vec<String> = store
        .keyword_top(page.lang, SITE_KEYWORD_LIMIT)
        .into_iter()
        .map(|k| k.keyword)
        .collect();
    let keywords = merge_keywords(&page.keywords, &site_keywords);
    if !keywords.is_empty() {
        head.upsert(HeadTag::new(
            TagId::MetaName("keywords".into()),
            keywords.join(", "),
        ));
    }

    // Canonical + one alternate per supported language
    head.upsert(HeadTag::new(TagId::LinkRel("canonical".into()), &canonical));
    for lang in Lang::ALL {
        head.upsert(HeadTag::new(
            TagId::LinkAlternate(lang.hreflang().to_string()),
            format!("{}{}", site_url, localize_path(&page.path, lang)),
        ));
    }

    // Open Graph
    if og_enabled {
        let og_type = match page.kind {
            PageKind::Website => "website",
            PageKind::Article { .. } => "article",
        };
        head.upsert(HeadTag::new(TagId::MetaProperty("og:title".into()), &page_title));
        head.upsert(HeadTag::new(
            TagId::MetaProperty("og:description".into()),
            &page_desc,
        ));
        head.upsert(HeadTag::new(TagId::MetaProperty("og:url".into()), &canonical));
        head.upsert(HeadTag::new(
            TagId::MetaProperty("og:site_name".into()),
            &site_name,
        ));
        head.upsert(HeadTag::new(TagId::MetaProperty("og:type".into()), og_type));
        if let Some(ref img) = image {
            head.upsert(HeadTag::new(TagId::MetaProperty("og:image".into()), img));
        }

        if let PageKind::Article {
            published_time,
            author,
            section,
            tags,
        } = &page.kind
        {
            if let Some(published) = published_time {
                head.upsert(HeadTag::new(
                    TagId::MetaProperty("article:published_time".into()),
                    published,
                ));
            }
            if let Some(author) = author {
                head.upsert(HeadTag::new(
                    TagId::MetaProperty("article:author".into()),
                    author,
                ));
            }
            if let Some(section) = section {
                head.upsert(HeadTag::new(
                    TagId::MetaProperty("article:section".into()),
                    section,
                ));
            }
            if !tags.is_empty() {
                head.upsert(HeadTag::new(
                    TagId::MetaProperty("article:tag".into()),
                    tags.join(", "),
                ));
            }
        }
    }

    // Twitter Cards
    if twitter_enabled {
        head.upsert(HeadTag::new(
            TagId::MetaName("twitter:card".into()),
            "summary_large_image",
        ));
        head.upsert(HeadTag::new(
            TagId::MetaName("twitter:title".into()),
            &page_title,
        ));
        head.upsert(HeadTag::new(
            TagId::MetaName("twitter:description".into()),
            &page_desc,
        ));
        if let Some(ref img) = image {
            head.upsert(HeadTag::new(TagId::MetaName("twitter:image".into()), img));
        }
    }

    head
}
