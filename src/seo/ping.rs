//! Best-effort search engine notification.
//!
//! Three engines per invocation: the Google sitemap ping, an IndexNow
//! submission carrying the whole URL list, and the Yandex sitemap ping.
//! Every failure is caught locally and recorded; no engine blocks another
//! and nothing is retried. Treat a `success` as telemetry, not as proof
//! of indexing.

use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::store::Store;

const PING_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PingStatus {
    Success,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct PingResult {
    pub engine: String,
    pub status: PingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PingResult {
    fn success(engine: &str) -> Self {
        PingResult {
            engine: engine.to_string(),
            status: PingStatus::Success,
            message: None,
        }
    }

    fn failed(engine: &str, message: impl Into<String>) -> Self {
        PingResult {
            engine: engine.to_string(),
            status: PingStatus::Failed,
            message: Some(message.into()),
        }
    }
}

/// Minimal query-component percent encoding for ping URLs.
pub(crate) fn percent_encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                format!("{}", b as char)
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

pub fn google_ping_url(sitemap_url: &str) -> String {
    format!(
        "https://www.google.com/ping?sitemap={}",
        percent_encode(sitemap_url)
    )
}

pub fn yandex_ping_url(sitemap_url: &str) -> String {
    format!(
        "https://webmaster.yandex.com/ping?sitemap={}",
        percent_encode(sitemap_url)
    )
}

pub fn indexnow_payload(host: &str, key: &str, urls: &[String]) -> Value {
    json!({
        "host": host,
        "key": key,
        "urlList": urls,
    })
}

fn ping_get(client: &reqwest::blocking::Client, engine: &str, url: &str) -> PingResult {
    match client.get(url).send() {
        Ok(resp) if resp.status().is_success() => PingResult::success(engine),
        Ok(resp) => PingResult::failed(engine, format!("HTTP {}", resp.status().as_u16())),
        Err(e) => PingResult::failed(engine, e.to_string()),
    }
}

fn ping_indexnow(
    client: &reqwest::blocking::Client,
    store: &dyn Store,
    site_url: &str,
    urls: &[String],
) -> PingResult {
    let key = store.setting_get_or("indexnow_key", "");
    if key.is_empty() {
        return PingResult::failed("indexnow", "IndexNow key not configured");
    }

    let host = match Url::parse(site_url).ok().and_then(|u| u.host_str().map(String::from)) {
        Some(h) => h,
        None => return PingResult::failed("indexnow", format!("Invalid site URL: {}", site_url)),
    };

    let payload = indexnow_payload(&host, &key, urls);
    match client
        .post("https://api.indexnow.org/indexnow")
        .json(&payload)
        .send()
    {
        Ok(resp) if resp.status().is_success() => PingResult::success("indexnow"),
        Ok(resp) => PingResult::failed("indexnow", format!("HTTP {}", resp.status().as_u16())),
        Err(e) => PingResult::failed("indexnow", e.to_string()),
    }
}

/// Notify all engines about changed URLs. Always returns exactly one result
/// per engine, in a fixed order, regardless of how many fail.
pub fn notify_search_engines(store: &dyn Store, urls: &[String]) -> Vec<PingResult> {
    let site_url = store.setting_get_or("site_url", "http://localhost:8000");
    let site_url = site_url.trim_end_matches('/').to_string();
    let sitemap_url = format!("{}/sitemap.xml", site_url);

    let client = match reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(PING_TIMEOUT_SECS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            let msg = format!("HTTP client error: {}", e);
            return vec![
                PingResult::failed("google", msg.clone()),
                PingResult::failed("indexnow", msg.clone()),
                PingResult::failed("yandex", msg),
            ];
        }
    };

    let mut results = Vec::with_capacity(3);

    let google = ping_get(&client, "google", &google_ping_url(&sitemap_url));
    if google.status == PingStatus::Failed {
        log::warn!("Google ping failed: {:?}", google.message);
    }
    results.push(google);

    let indexnow = ping_indexnow(&client, store, &site_url, urls);
    if indexnow.status == PingStatus::Failed {
        log::warn!("IndexNow submission failed: {:?}", indexnow.message);
    }
    results.push(indexnow);

    let yandex = ping_get(&client, "yandex", &yandex_ping_url(&sitemap_url));
    if yandex.status == PingStatus::Failed {
        log::warn!("Yandex ping failed: {:?}", yandex.message);
    }
    results.push(yandex);

    results
}
