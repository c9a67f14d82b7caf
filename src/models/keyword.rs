use serde::{Deserialize, Serialize};

/// Site-wide SEO keyword, merged into page keyword sets by priority.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeoKeyword {
    pub id: i64,
    pub keyword: String,
    pub language: String,
    pub priority: i64,
}
