//! HTML rendering of backend environments
//!
//! Every backend gets its own self-contained fragment so the page can be
//! streamed one backend at a time:
//! - a table of variables, sorted by name
//! - a one-line note when the backend reported no variables
//! - a one-line note when the backend could not be queried

use crate::backend::{BackendError, BackendTarget, EnvironmentMap};
use std::borrow::Cow;
use std::fmt::Write;

/// Values at least this many characters long are truncated
pub const TRUNCATE_AT: usize = 80;

/// Variable rendered in bold to surface the deployed version
pub const VERSION_KEY: &str = "APP_VERSION";

const TABLE_STYLE: &str = r#"<style>
table, th, td {
  border: 1px solid black;
  border-collapse: collapse;
}

th, td {
  padding: 10px;
}

tr:nth-child(even) {background-color: #f2f2f2;}
</style>"#;

/// Cut `value` to its first `TRUNCATE_AT` characters plus `...`
///
/// Counts chars, not bytes, so multi-byte values are never split.
pub fn truncate_value(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(TRUNCATE_AT - 1) {
        Some((idx, c)) => {
            let end = idx + c.len_utf8();
            Cow::Owned(format!("{}...", &value[..end]))
        }
        None => Cow::Borrowed(value),
    }
}

/// Escape the characters that are significant in HTML text
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn backend_label(target: &BackendTarget) -> String {
    format!("{} ({})", escape_html(&target.ip), escape_html(&target.name))
}

/// Note emitted in place of a table when the fetch failed
pub fn render_fetch_error(target: &BackendTarget) -> String {
    format!(
        "<h1>Unable to get environment variables from backend {}</h1>",
        backend_label(target)
    )
}

/// Note emitted when the backend answered with no variables
pub fn render_empty(target: &BackendTarget) -> String {
    format!(
        "<h1>Environment variables not found in backend {}</h1>",
        backend_label(target)
    )
}

/// Render a non-empty environment as a table sorted by variable name
pub fn render_env_table(target: &BackendTarget, env: &EnvironmentMap) -> String {
    let mut keys: Vec<&String> = env.keys().collect();
    keys.sort();

    let mut html = format!(
        "\n<html>\n<head>\n{}\n</head>\n<body>\n\n\
         <h1>Environment Variables from backend {}</h1>\n\
         <table>\n<tr>\n<th>Name</th>\n<th>Value</th>\n</tr>\n",
        TABLE_STYLE,
        backend_label(target)
    );

    for key in keys {
        let value = truncate_value(&env[key]);
        let key_cell = escape_html(key);
        let value_cell = escape_html(&value);

        let (open, close) = if key == VERSION_KEY {
            ("<b>", "</b>")
        } else {
            ("", "")
        };

        // Writing into a String cannot fail
        let _ = write!(
            html,
            "<tr><td>{open}{key_cell}{close}</td><td>{open}{value_cell}{close}</td></tr>"
        );
    }

    html.push_str("</table></body></html>");
    html
}

/// Render the outcome of one backend fetch
pub fn render_backend(
    target: &BackendTarget,
    result: &Result<EnvironmentMap, BackendError>,
) -> String {
    match result {
        Err(_) => render_fetch_error(target),
        Ok(env) if env.is_empty() => render_empty(target),
        Ok(env) => render_env_table(target, env),
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
