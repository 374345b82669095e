use melib::email::attachment_types::{ContentType, Text};
use melib::Mail;

use crate::error::{Error, Result};

/// Render an email body to plain text.
///
/// Prefers text/plain when available; falls back to sanitized HTML conversion.
pub fn render_body(text_plain: Option<&str>, text_html: Option<&str>) -> String {
    html_safe_md::render_email_plain(text_plain, text_html)
}

/// Parse a raw RFC 5322 message and return its searchable body text.
///
/// Messages with no text parts yield an empty string.
pub fn body_text(raw: Vec<u8>) -> Result<String> {
    let mail = Mail::new(raw, None).map_err(|e| Error::Mail(format!("Failed to parse message: {e}")))?;
    let (text_plain, text_html) = extract_text(&mail.body());
    if text_plain.is_none() && text_html.is_none() {
        return Ok(String::new());
    }
    Ok(render_body(text_plain.as_deref(), text_html.as_deref()))
}

/// Walk the MIME tree and collect inline text/plain and text/html.
fn extract_text(att: &melib::email::attachments::Attachment) -> (Option<String>, Option<String>) {
    let mut plain = None;
    let mut html = None;
    extract_parts(att, &mut plain, &mut html);
    (plain, html)
}

fn extract_parts(
    att: &melib::email::attachments::Attachment,
    plain: &mut Option<String>,
    html: &mut Option<String>,
) {
    match &att.content_type {
        ContentType::Text {
            kind: Text::Plain, ..
        } if !att.content_disposition.kind.is_attachment() => append_text(att, plain),
        ContentType::Text {
            kind: Text::Html, ..
        } if !att.content_disposition.kind.is_attachment() => append_text(att, html),
        ContentType::Multipart { parts, .. } => {
            for part in parts {
                extract_parts(part, plain, html);
            }
        }
        // Binary parts carry nothing searchable.
        _ => {}
    }
}

fn append_text(att: &melib::email::attachments::Attachment, slot: &mut Option<String>) {
    let bytes = att.decode(Default::default());
    let text = String::from_utf8_lossy(&bytes);
    if !text.trim().is_empty() {
        let combined = slot.take().unwrap_or_default() + &text;
        *slot = Some(combined);
    }
}
