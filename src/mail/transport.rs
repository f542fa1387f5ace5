// ABOUTME: Prepares rendered mail for a transport
// ABOUTME: Derives the plain-text alternative from the rendered HTML body

use super::RenderedMail;
use crate::template::{Result, TemplateError};

/// Line width of the plain-text alternative
const TEXT_WIDTH: usize = 130;

/// Subject, HTML body and plain-text alternative, ready for a mail transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Convert an HTML body into an equivalent plain-text representation
pub fn html_to_text(html: &str) -> Result<String> {
    html2text::config::plain()
        .string_from_read(html.as_bytes(), TEXT_WIDTH)
        .map_err(|e| TemplateError::ConversionError(e.to_string()))
}

impl RenderedMail {
    pub fn into_outgoing(self) -> Result<OutgoingMail> {
        let text = html_to_text(&self.body)?;
        Ok(OutgoingMail {
            subject: self.subject,
            html: self.body,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_markup() {
        let text = html_to_text("<h1>Hallo</h1><p>Hi <b>Alice</b>, dein Knoten ist offline.</p>").unwrap();

        assert!(text.contains("Hallo"));
        assert!(text.contains("Alice"));
        assert!(text.contains("offline"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_into_outgoing_keeps_subject_and_html() {
        let rendered = RenderedMail {
            subject: "Willkommen".to_string(),
            body: "<p>Hallo Welt</p>".to_string(),
        };

        let outgoing = rendered.into_outgoing().unwrap();
        assert_eq!(outgoing.subject, "Willkommen");
        assert_eq!(outgoing.html, "<p>Hallo Welt</p>");
        assert!(outgoing.text.contains("Hallo Welt"));
    }
}
