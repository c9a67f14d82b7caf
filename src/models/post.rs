use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lang::Lang;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: i64,
    pub slug: String,
    pub title_uz: String,
    pub title_ru: String,
    pub title_en: String,
    pub content_uz: String,
    pub content_ru: String,
    pub content_en: String,
    pub excerpt_uz: Option<String>,
    pub excerpt_ru: Option<String>,
    pub excerpt_en: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub seo_title_uz: Option<String>,
    pub seo_title_ru: Option<String>,
    pub seo_title_en: Option<String>,
    pub seo_description_uz: Option<String>,
    pub seo_description_ru: Option<String>,
    pub seo_description_en: Option<String>,
    pub focus_keywords: Vec<String>,
    pub reading_time: i64,
    pub published: bool,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Post {
    pub fn title(&self, lang: Lang) -> &str {
        match lang {
            Lang::Uz => &self.title_uz,
            Lang::Ru => &self.title_ru,
            Lang::En => &self.title_en,
        }
    }

    pub fn content(&self, lang: Lang) -> &str {
        match lang {
            Lang::Uz => &self.content_uz,
            Lang::Ru => &self.content_ru,
            Lang::En => &self.content_en,
        }
    }

    pub fn excerpt(&self, lang: Lang) -> Option<&str> {
        match lang {
            Lang::Uz => self.excerpt_uz.as_deref(),
            Lang::Ru => self.excerpt_ru.as_deref(),
            Lang::En => self.excerpt_en.as_deref(),
        }
    }

    /// SEO title for a language, falling back to the post title.
    pub fn seo_title(&self, lang: Lang) -> &str {
        let explicit = match lang {
            Lang::Uz => self.seo_title_uz.as_deref(),
            Lang::Ru => self.seo_title_ru.as_deref(),
            Lang::En => self.seo_title_en.as_deref(),
        };
        explicit.filter(|s| !s.is_empty()).unwrap_or(self.title(lang))
    }

    pub fn seo_description(&self, lang: Lang) -> Option<&str> {
        let explicit = match lang {
            Lang::Uz => self.seo_description_uz.as_deref(),
            Lang::Ru => self.seo_description_ru.as_deref(),
            Lang::En => self.seo_description_en.as_deref(),
        };
        explicit.filter(|s| !s.is_empty()).or_else(|| self.excerpt(lang))
    }

    /// Site-relative path of the post for a language, e.g. `/uz/blog/slug`.
    pub fn path(&self, blog_slug: &str, lang: Lang) -> String {
        format!("/{}/{}/{}", lang.code(), blog_slug, self.slug)
    }

    /// Canonical URL of the post for a language.
    pub fn url(&self, site_url: &str, blog_slug: &str, lang: Lang) -> String {
        format!("{}{}", site_url.trim_end_matches('/'), self.path(blog_slug, lang))
    }
}

/// Validated form used for inserts. All mandatory fields are plain strings.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub slug: String,
    pub title_uz: String,
    pub title_ru: String,
    pub title_en: String,
    pub content_uz: String,
    pub content_ru: String,
    pub content_en: String,
    pub excerpt_uz: Option<String>,
    pub excerpt_ru: Option<String>,
    pub excerpt_en: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub seo_title_uz: Option<String>,
    pub seo_title_ru: Option<String>,
    pub seo_title_en: Option<String>,
    pub seo_description_uz: Option<String>,
    pub seo_description_ru: Option<String>,
    pub seo_description_en: Option<String>,
    pub focus_keywords: Vec<String>,
    pub reading_time: i64,
    pub published: bool,
}

/// Raw API submission. Every field is optional so that validation can name
/// the first missing one instead of failing wholesale at deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct PostSubmission {
    pub slug: Option<String>,
    pub title_uz: Option<String>,
    pub title_ru: Option<String>,
    pub title_en: Option<String>,
    pub content_uz: Option<String>,
    pub content_ru: Option<String>,
    pub content_en: Option<String>,
    pub excerpt_uz: Option<String>,
    pub excerpt_ru: Option<String>,
    pub excerpt_en: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub seo_title_uz: Option<String>,
    pub seo_title_ru: Option<String>,
    pub seo_title_en: Option<String>,
    pub seo_description_uz: Option<String>,
    pub seo_description_ru: Option<String>,
    pub seo_description_en: Option<String>,
    pub focus_keywords: Option<Vec<String>>,
    pub reading_time: Option<i64>,
    pub published: Option<bool>,
}

const REQUIRED_FIELDS: [&str; 7] = [
    "title_uz",
    "title_ru",
    "title_en",
    "content_uz",
    "content_ru",
    "content_en",
    "slug",
];

pub fn slug_is_valid(slug: &str) -> bool {
    static SLUG_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());
    re.is_match(slug)
}

impl PostSubmission {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title_uz" => self.title_uz.as_deref(),
            "title_ru" => self.title_ru.as_deref(),
            "title_en" => self.title_en.as_deref(),
            "content_uz" => self.content_uz.as_deref(),
            "content_ru" => self.content_ru.as_deref(),
            "content_en" => self.content_en.as_deref(),
            "slug" => self.slug.as_deref(),
            _ => None,
        }
    }

    /// Check mandatory fields and produce a storage form.
    /// The error names the first missing field.
    pub fn validate(self) -> Result<PostForm, String> {
        for name in REQUIRED_FIELDS {
            match self.field(name) {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(format!("Missing required field: {}", name)),
            }
        }

        let slug = self.slug.unwrap();
        if !slug_is_valid(&slug) {
            return Err(format!(
                "Invalid slug '{}': use lowercase letters, digits and hyphens",
                slug
            ));
        }

        Ok(PostForm {
            slug,
            title_uz: self.title_uz.unwrap(),
            title_ru: self.title_ru.unwrap(),
            title_en: self.title_en.unwrap(),
            content_uz: self.content_uz.unwrap(),
            content_ru: self.content_ru.unwrap(),
            content_en: self.content_en.unwrap(),
            excerpt_uz: self.excerpt_uz,
            excerpt_ru: self.excerpt_ru,
            excerpt_en: self.excerpt_en,
            featured_image: self.featured_image,
            category_id: self.category_id,
            tags: self.tags.unwrap_or_default(),
            seo_title_uz: self.seo_title_uz,
            seo_title_ru: self.seo_title_ru,
            seo_title_en: self.seo_title_en,
            seo_description_uz: self.seo_description_uz,
            seo_description_ru: self.seo_description_ru,
            seo_description_en: self.seo_description_en,
            focus_keywords: self.focus_keywords.unwrap_or_default(),
            reading_time: self.reading_time.unwrap_or(5),
            published: self.published.unwrap_or(false),
        })
    }
}
