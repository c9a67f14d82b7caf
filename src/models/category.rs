use serde::{Deserialize, Serialize};

use crate::lang::Lang;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    pub id: i64,
    pub slug: String,
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    pub description_uz: Option<String>,
    pub description_ru: Option<String>,
    pub description_en: Option<String>,
}

impl Category {
    pub fn name(&self, lang: Lang) -> &str {
        match lang {
            Lang::Uz => &self.name_uz,
            Lang::Ru => &self.name_ru,
            Lang::En => &self.name_en,
        }
    }

    pub fn description(&self, lang: Lang) -> Option<&str> {
        match lang {
            Lang::Uz => self.description_uz.as_deref(),
            Lang::Ru => self.description_ru.as_deref(),
            Lang::En => self.description_en.as_deref(),
        }
    }

    pub fn path(&self, lang: Lang) -> String {
        format!("/{}/category/{}", lang.code(), self.slug)
    }

    pub fn url(&self, site_url: &str, lang: Lang) -> String {
        format!("{}{}", site_url.trim_end_matches('/'), self.path(lang))
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub slug: String,
    pub name_uz: String,
    pub name_ru: String,
    pub name_en: String,
    pub description_uz: Option<String>,
    pub description_ru: Option<String>,
    pub description_en: Option<String>,
}
