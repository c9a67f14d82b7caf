use crate::lang::Lang;
use crate::store::Store;

/// Generate sitemap.xml content covering every language variant.
/// Returns None if seo_sitemap_enabled is false.
pub fn generate_sitemap(store: &dyn Store) -> Option<String> {
    if !store.setting_get_bool("seo_sitemap_enabled") {
        return None;
    }

    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    let site_url = site_url.trim_end_matches('/').to_string();
    let blog_slug = store.setting_get_or("blog_slug", "blog");

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );

    for lang in Lang::ALL {
        // Home and blog index per language
        xml.push_str(&format!(
            "  <url><loc>{}/{}</loc><changefreq>daily</changefreq><priority>1.0</priority></url>\n",
            site_url,
            lang.code()
        ));
        xml.push_str(&format!(
            "  <url><loc>{}/{}/{}</loc><changefreq>daily</changefreq><priority>0.8</priority></url>\n",
            site_url,
            lang.code(),
            blog_slug
        ));
    }

    for category in store.category_list() {
        for lang in Lang::ALL {
            xml.push_str(&format!(
                "  <url><loc>{}</loc><changefreq>weekly</changefreq><priority>0.7</priority></url>\n",
                category.url(&site_url, lang)
            ));
        }
    }

    let posts = store.post_list_published(1000, 0);
    for post in &posts {
        let lastmod = post.updated_at.format("%Y-%m-%d").to_string();
        for lang in Lang::ALL {
            xml.push_str(&format!(
                "  <url><loc>{}</loc><lastmod>{}</lastmod><priority>0.6</priority></url>\n",
                post.url(&site_url, &blog_slug, lang),
                lastmod
            ));
        }
    }

    xml.push_str("</urlset>");
    Some(xml)
}

/// Generate robots.txt content with dynamic sitemap URL.
pub fn generate_robots(store: &dyn Store) -> String {
    let mut content = store.setting_get_or("seo_robots_txt", "User-agent: *\nAllow: /");
    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    if store.setting_get_bool("seo_sitemap_enabled") {
        content.push_str(&format!(
            "\nSitemap: {}/sitemap.xml",
            site_url.trim_end_matches('/')
        ));
    }
    content
}
