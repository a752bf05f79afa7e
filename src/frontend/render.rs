//! Page rendering.
//!
//! Handlers only depend on [`Renderer`]; [`HtmlRenderer`] is the built-in
//! page.

use std::fmt::Write;

use axum::http::StatusCode;

use crate::store::Entry;

pub trait Renderer: Send + Sync {
    /// Render the index page: submission form plus every entry.
    fn render_index(&self, entries: &[Entry]) -> String;
}

/// Minimal self-contained HTML page.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

const FORM: &str = r#"<form method="post" action="/">
  <input name="key" placeholder="key" required>
  <input name="value" placeholder="value" required>
  <button type="submit">Add</button>
</form>"#;

impl Renderer for HtmlRenderer {
    fn render_index(&self, entries: &[Entry]) -> String {
        let mut rows = String::new();
        for entry in entries {
            let _ = write!(
                rows,
                "\n    <tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.id,
                escape(&entry.key),
                escape(&entry.value)
            );
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head><title>Key/Value Store</title></head>\n<body>\n\
             <h1>Key/Value Store</h1>\n{FORM}\n<table>\n    \
             <tr><th>ID</th><th>Key</th><th>Value</th></tr>{rows}\n</table>\n</body>\n</html>\n"
        )
    }
}

/// Error page. Never lists entries.
pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{status}</title></head>\n<body>\n\
         <h1>{status}</h1>\n<p>{}</p>\n<a href=\"/\">Back</a>\n</body>\n</html>\n",
        escape(message)
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
