use std::fmt::Write;

use crate::models::Record;
use crate::sheets::headers::key_to_header;

pub const SUBJECT_PREFIX: &str = "[Alephic Labs]";
pub const SENDER_NAME: &str = "Alephic Labs Website";
pub const PLAIN_TEXT_FALLBACK: &str =
    "New form submission from Alephic Labs website. View in HTML-enabled email client.";

/// Human label for the known form types.
pub fn form_label(form_type: &str) -> Option<&'static str> {
    match form_type {
        "agency-application" => Some("Agency Project Application"),
        "growlytics-early-access" => Some("Growlytics AI Early Access Request"),
        "contact" => Some("Contact Form Message"),
        _ => None,
    }
}

pub fn subject(form_type: &str) -> String {
    format!(
        "{SUBJECT_PREFIX} New {}",
        form_label(form_type).unwrap_or("Form Submission")
    )
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_submission(form_type: &str, timestamp: &str, record: &Record) -> String {
    let heading = form_label(form_type).unwrap_or("New Submission");

    let mut fields = String::new();
    for (key, value) in record.fields() {
        if value.is_empty() {
            continue;
        }
        let _ = write!(
            fields,
            r#"
        <div style="margin-bottom:16px;padding-bottom:16px;border-bottom:1px solid #e2e8f0;">
            <div style="font-size:12px;font-weight:600;color:#64748b;text-transform:uppercase;letter-spacing:0.05em;margin-bottom:4px;">{label}</div>
            <div style="font-size:15px;color:#1e293b;">{value}</div>
        </div>"#,
            label = escape_html(&key_to_header(key)),
            value = escape_html(&value.render()),
        );
    }

    format!(
        r#"<div style="font-family:Arial,sans-serif;max-width:600px;margin:0 auto;">
    <div style="background:#0a0a1f;padding:24px 32px;border-radius:12px 12px 0 0;">
        <h1 style="color:#00d4ff;margin:0;font-size:20px;">Alephic Labs</h1>
    </div>
    <div style="background:#f8fafc;padding:32px;border:1px solid #e2e8f0;border-radius:0 0 12px 12px;">
        <h2 style="color:#1e293b;margin:0 0 8px;">{heading}</h2>
        <p style="color:#64748b;margin:0 0 24px;font-size:14px;">Received: {timestamp}</p>{fields}
    </div>
</div>"#,
        timestamp = escape_html(timestamp),
    )
}
