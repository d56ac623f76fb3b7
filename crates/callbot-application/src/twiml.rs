//! TwiML rendering of prompts.

use crate::prompt::{Directive, Prompt};

/// Renders prompts as `<Say>` followed by `<Record>` or `<Hangup>`.
#[derive(Debug, Clone)]
pub struct TwimlRenderer {
    language: String,
    record_max_length: u32,
    action: String,
}

impl TwimlRenderer {
    /// `action` is the URL the provider posts the recording result to.
    pub fn new(
        language: impl Into<String>,
        record_max_length: u32,
        action: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            record_max_length,
            action: action.into(),
        }
    }

    pub fn render(&self, prompt: &Prompt) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        xml.push_str(&format!(
            r#"<Say language="{}">{}</Say>"#,
            escape_xml(&self.language),
            escape_xml(&prompt.text)
        ));
        match prompt.directive {
            Directive::RecordNext => xml.push_str(&format!(
                r#"<Record maxLength="{}" action="{}" method="POST" playBeep="false"/>"#,
                self.record_max_length,
                escape_xml(&self.action)
            )),
            Directive::HangUp => xml.push_str("<Hangup/>"),
        }
        xml.push_str("</Response>");
        xml
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
