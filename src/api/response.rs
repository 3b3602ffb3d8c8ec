//! Turns a raw HTTP response into the tracker's success data or an [`AppError`].
//!
//! Precedence:
//! 1. a JSON envelope, whatever the status code (`422` carries validation messages);
//! 2. an HTML error page, whose first paragraph becomes the message;
//! 3. any other non-2xx status;
//! 4. anything else is malformed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::errors::{AppError, GENERIC_ERROR};
use crate::models::Envelope;

static FIRST_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("valid paragraph regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

pub fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, AppError> {
    let trimmed = body.trim_start();

    if trimmed.starts_with('{') {
        return match serde_json::from_str::<Envelope<T>>(trimmed) {
            Ok(envelope) if envelope.success => Ok(envelope.data),
            Ok(envelope) => Err(AppError::Application(
                envelope.error.unwrap_or_else(|| GENERIC_ERROR.to_string()),
            )),
            Err(e) if is_success(status) => Err(AppError::Malformed(e.to_string())),
            Err(_) => Err(status_error(status, body)),
        };
    }

    if let Some(message) = first_paragraph(body) {
        return Err(AppError::Application(message));
    }

    if !is_success(status) {
        return Err(status_error(status, body));
    }

    Err(AppError::Malformed(format!(
        "expected a JSON envelope, got: {}",
        snippet(body)
    )))
}

/// Text of the first `<p>` element, tags stripped and whitespace collapsed.
pub fn first_paragraph(html: &str) -> Option<String> {
    let inner = FIRST_PARAGRAPH.captures(html)?.get(1)?.as_str();
    let text = TAG.replace_all(inner, "");
    let text = decode_entities(WHITESPACE.replace_all(&text, " ").trim());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn status_error(status: u16, body: &str) -> AppError {
    AppError::Status {
        status,
        message: snippet(body),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ack, NotificationBatch};

    #[test]
    fn test_success_envelope_yields_data() {
        let batch: NotificationBatch = parse_response(
            200,
            r#"{"success": true, "notifications": [{"notificationId": 4, "name": "mark open", "data": {}, "timestamp": 5}]}"#,
        )
        .unwrap();
        assert_eq!(batch.notifications.len(), 1);
    }

    #[test]
    fn test_validation_error_keeps_server_message() {
        let err = parse_response::<Ack>(
            422,
            r#"{"success": false, "error": "You have already marked this notification as read."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.application_message(),
            Some("You have already marked this notification as read.")
        );
    }

    #[test]
    fn test_failure_without_message_uses_generic_text() {
        let err = parse_response::<Ack>(200, r#"{"success": false}"#).unwrap_err();
        assert_eq!(err.application_message(), Some(GENERIC_ERROR));
    }

    #[test]
    fn test_html_error_page_first_paragraph() {
        let html = r#"<html><body><h1>404</h1>
            <p class="lead">The page you are
              looking for <strong>does not</strong> exist.</p>
            <p>Second paragraph</p></body></html>"#;
        let err = parse_response::<Ack>(404, html).unwrap_err();
        assert_eq!(
            err.application_message(),
            Some("The page you are looking for does not exist.")
        );
    }

    #[test]
    fn test_html_entities_decoded() {
        assert_eq!(
            first_paragraph("<p>Tom &amp; Jerry&#39;s &lt;project&gt;</p>").as_deref(),
            Some("Tom & Jerry's <project>")
        );
    }

    #[test]
    fn test_non_envelope_error_status() {
        let err = parse_response::<Ack>(502, "Bad Gateway").unwrap_err();
        assert!(matches!(err, AppError::Status { status: 502, .. }));
    }

    #[test]
    fn test_garbage_on_success_is_malformed() {
        let err = parse_response::<NotificationBatch>(200, "{not json").unwrap_err();
        assert!(matches!(err, AppError::Malformed(_)));

        let err = parse_response::<NotificationBatch>(200, "plain text").unwrap_err();
        assert!(matches!(err, AppError::Malformed(_)));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let err = parse_response::<NotificationBatch>(
            200,
            r#"{"success": true, "notifications": "nope"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Malformed(_)));
    }
}
