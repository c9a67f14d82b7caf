pub mod smtp;

use crate::seo::html_escape;
use crate::store::Store;

/// Send one HTML reply to a contact-form message over SMTP.
/// Fails before any network I/O when the SMTP credential is not configured.
pub fn send_reply(
    store: &dyn Store,
    to: &str,
    to_name: &str,
    subject: &str,
    message: &str,
    original_message: &str,
) -> Result<(), String> {
    let host = store.setting_get_or("email_smtp_host", "");
    let port: u16 = store
        .setting_get_or("email_smtp_port", "587")
        .parse()
        .unwrap_or(587);
    let username = store.setting_get_or("email_smtp_username", "");
    let password = store.setting_get_or("email_smtp_password", "");

    if host.is_empty() || username.is_empty() || password.is_empty() {
        return Err("SMTP is not configured (host, username or password missing)".into());
    }

    let site_name = store.setting_get_or("site_name", "Maqola");
    let from_address = {
        let addr = store.setting_get_or("email_from_address", "");
        if addr.is_empty() { username.clone() } else { addr }
    };
    let from_name = {
        let name = store.setting_get_or("email_from_name", "");
        if name.is_empty() { site_name.clone() } else { name }
    };
    let from = format!("{} <{}>", from_name, from_address);

    let html = render_reply_html(&site_name, to_name, message, original_message);

    smtp::send_html(&host, port, &username, &password, &from, to, subject, &html)
}

/// Fixed HTML reply template: the reply body followed by the quoted
/// original message.
pub fn render_reply_html(
    site_name: &str,
    to_name: &str,
    message: &str,
    original_message: &str,
) -> String {
    let greeting = if to_name.is_empty() {
        "Assalomu alaykum,".to_string()
    } else {
        format!("Assalomu alaykum, {},", html_escape(to_name))
    };

    let reply = html_escape(message).replace('\n', "<br>");
    let quoted = html_escape(original_message).replace('\n', "<br>");

    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family:Arial,sans-serif;color:#222;max-width:600px;margin:0 auto;padding:24px">
    <p>{greeting}</p>
    <p>{reply}</p>
    <div style="margin-top:32px;padding:16px;border-left:3px solid #ccc;color:#666;font-size:14px">
        <p style="margin:0 0 8px 0"><strong>Sizning xabaringiz:</strong></p>
        <p style="margin:0">{quoted}</p>
    </div>
    <p style="margin-top:32px;color:#999;font-size:13px">— {site_name}</p>
</body>
</html>"#,
        greeting = greeting,
        reply = reply,
        quoted = quoted,
        site_name = html_escape(site_name),
    )
}
