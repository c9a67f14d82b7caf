use std::collections::HashMap;

use super::head::{HeadState, HeadTag, TagId};
use super::html_escape;

// Fixed markers; one head entry each, ever.
pub const GA4_LOADER_MARKER: &str = "ga4-gtag";
pub const GA4_INIT_MARKER: &str = "ga4-init";
pub const GTM_MARKER: &str = "gtm-script";
pub const PIXEL_MARKER: &str = "meta-pixel";

fn get<'a>(settings: &'a HashMap<String, String>, key: &str) -> &'a str {
    settings.get(key).map(|v| v.as_str()).unwrap_or("")
}

/// Add third-party analytics snippets to the head state for every tag with
/// a configured ID. Guarded by a marker-existence check, so injecting twice
/// with the same settings leaves exactly one entry per marker.
pub fn inject_analytics(head: &mut HeadState, settings: &HashMap<String, String>) {
    // Google Analytics 4
    let ga4_id = get(settings, "analytics_ga4_id");
    if !ga4_id.is_empty() {
        let loader_id = TagId::Script(GA4_LOADER_MARKER.into());
        if head.get(&loader_id).is_none() {
            head.upsert(
                HeadTag::new(loader_id, "")
                    .with_attr("id", GA4_LOADER_MARKER)
                    .with_attr("async", "")
                    .with_attr(
                        "src",
                        &format!("https://www.googletagmanager.com/gtag/js?id={}", ga4_id),
                    ),
            );
        }
        let init_id = TagId::Script(GA4_INIT_MARKER.into());
        if head.get(&init_id).is_none() {
            head.upsert(
                HeadTag::new(
                    init_id,
                    format!(
                        "window.dataLayer=window.dataLayer||[];function gtag(){{dataLayer.push(arguments);}}gtag('js',new Date());gtag('config','{}');",
                        ga4_id
                    ),
                )
                .with_attr("id", GA4_INIT_MARKER),
            );
        }
    }

    // Google Tag Manager
    let gtm_id = get(settings, "analytics_gtm_id");
    if !gtm_id.is_empty() {
        let tag_id = TagId::Script(GTM_MARKER.into());
        if head.get(&tag_id).is_none() {
            head.upsert(
                HeadTag::new(
                    tag_id,
                    format!(
                        "(function(w,d,s,l,i){{w[l]=w[l]||[];w[l].push({{'gtm.start':new Date().getTime(),event:'gtm.js'}});var f=d.getElementsByTagName(s)[0],j=d.createElement(s),dl=l!='dataLayer'?'&l='+l:'';j.async=true;j.src='https://www.googletagmanager.com/gtm.js?id='+i+dl;f.parentNode.insertBefore(j,f);}})(window,document,'script','dataLayer','{}');",
                        gtm_id
                    ),
                )
                .with_attr("id", GTM_MARKER),
            );
        }
    }

    // Meta Pixel
    let pixel_id = get(settings, "analytics_pixel_id");
    if !pixel_id.is_empty() {
        let tag_id = TagId::Script(PIXEL_MARKER.into());
        if head.get(&tag_id).is_none() {
            head.upsert(
                HeadTag::new(
                    tag_id,
                    format!(
                        "!function(f,b,e,v,n,t,s){{if(f.fbq)return;n=f.fbq=function(){{n.callMethod?n.callMethod.apply(n,arguments):n.queue.push(arguments)}};if(!f._fbq)f._fbq=n;n.push=n;n.loaded=!0;n.version='2.0';n.queue=[];t=b.createElement(e);t.async=!0;t.src=v;s=b.getElementsByTagName(e)[0];s.parentNode.insertBefore(t,s)}}(window,document,'script','https://connect.facebook.net/en_US/fbevents.js');fbq('init','{}');fbq('track','PageView');",
                        pixel_id
                    ),
                )
                .with_attr("id", PIXEL_MARKER),
            );
        }
    }
}

/// `<noscript>` fallbacks mounted at the top of the body (GTM iframe,
/// pixel image). Stringly because noscript bodies never participate in
/// head reconciliation.
pub fn build_noscript_fragments(settings: &HashMap<String, String>) -> String {
    let mut html = String::new();

    let gtm_id = get(settings, "analytics_gtm_id");
    if !gtm_id.is_empty() {
        html.push_str(&format!(
            "<noscript><iframe src=\"https://www.googletagmanager.com/ns.html?id={}\" height=\"0\" width=\"0\" style=\"display:none;visibility:hidden\"></iframe></noscript>\n",
            html_escape(gtm_id)
        ));
    }

    let pixel_id = get(settings, "analytics_pixel_id");
    if !pixel_id.is_empty() {
        html.push_str(&format!(
            "<noscript><img height=\"1\" width=\"1\" style=\"display:none\" src=\"https://www.facebook.com/tr?id={}&ev=PageView&noscript=1\"></noscript>\n",
            html_escape(pixel_id)
        ));
    }

    html
}
