use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// Content languages served by the site. Uzbek is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Uz,
    Ru,
    En,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Uz, Lang::Ru, Lang::En];

    pub fn code(&self) -> &'static str {
        match self {
            Lang::Uz => "uz",
            Lang::Ru => "ru",
            Lang::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "uz" => Some(Lang::Uz),
            "ru" => Some(Lang::Ru),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    /// HTML lang / hreflang attribute value.
    pub fn hreflang(&self) -> &'static str {
        self.code()
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::Uz
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl<'a> FromParam<'a> for Lang {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Lang::from_code(param).ok_or(param)
    }
}

/// Rewrite the language segment of a site path.
/// `/uz/blog/post` becomes `/ru/blog/post`; a path with no language
/// prefix gets one prepended.
pub fn localize_path(path: &str, lang: Lang) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut segments = trimmed.splitn(2, '/');
    let first = segments.next().unwrap_or("");
    let rest = segments.next().unwrap_or("");

    if Lang::from_code(first).is_some() {
        if rest.is_empty() {
            format!("/{}", lang.code())
        } else {
            format!("/{}/{}", lang.code(), rest)
        }
    } else if trimmed.is_empty() {
        format!("/{}", lang.code())
    } else {
        format!("/{}/{}", lang.code(), trimmed)
    }
}
