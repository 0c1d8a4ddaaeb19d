//! Minimal TwiML builder.
//!
//! The telephony boundary only ever speaks four verbs: `<Say>`,
//! `<Gather>`, `<Redirect>`, and `<Hangup>`. Every response on that
//! boundary must be a well-formed document, including the internal-error
//! fallback, so handlers build responses exclusively through this type.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// A TwiML `<Response>` document under construction.
#[derive(Debug, Clone)]
pub struct Twiml {
    body: String,
}

impl Default for Twiml {
    fn default() -> Self {
        Self::new()
    }
}

impl Twiml {
    pub fn new() -> Self {
        Self {
            body: String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n"),
        }
    }

    /// Generic fallback for internal failures: spoken apology plus hangup.
    pub fn internal_error() -> Self {
        Self::new()
            .say("An internal error occurred. Please try again later.")
            .hangup()
    }

    pub fn say(mut self, text: &str) -> Self {
        self.body
            .push_str(&format!("  <Say>{}</Say>\n", xml_escape(text)));
        self
    }

    pub fn redirect(mut self, url: &str) -> Self {
        self.body
            .push_str(&format!("  <Redirect>{}</Redirect>\n", xml_escape(url)));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.body.push_str("  <Hangup/>\n");
        self
    }

    /// A digit-collection directive wrapping a spoken prompt.
    ///
    /// `pciCompliance="true"` tells the provider to exclude the captured
    /// digits from its own request logs; raw card digits must never leave
    /// this gateway's control.
    pub fn gather(mut self, action_url: &str, timeout_secs: u64, prompt: &str) -> Self {
        self.body.push_str(&format!(
            "  <Gather action=\"{}\" method=\"POST\" pciCompliance=\"true\" timeout=\"{}\">\n    <Say>{}</Say>\n  </Gather>\n",
            xml_escape(action_url),
            timeout_secs,
            xml_escape(prompt),
        ));
        self
    }

    pub fn finish(mut self) -> String {
        self.body.push_str("</Response>");
        self.body
    }
}

impl IntoResponse for Twiml {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/xml")],
            self.finish(),
        )
            .into_response()
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
