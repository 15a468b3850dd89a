//! Output escaping for the HTML fragments this crate emits.

use url::Url;

/// Escape text for use between tags.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#039;"),
      _ => out.push(c),
    }
  }
  out
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String { escape_html(s) }

/// Sanitize a URL for an `href`/`src` attribute.
///
/// Only absolute `http`/`https` URLs survive; anything else (including
/// `javascript:` and unparseable input) becomes the empty string. The result
/// is attribute-escaped.
pub fn escape_url(s: &str) -> String {
  match Url::parse(s.trim()) {
    Ok(url) if matches!(url.scheme(), "http" | "https") => escape_attr(url.as_str()),
    _ => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_markup_characters() {
    assert_eq!(
      escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
      "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
    );
  }

  #[test]
  fn plain_text_is_untouched() {
    assert_eq!(escape_html("Alice Liddell"), "Alice Liddell");
  }

  #[test]
  fn url_keeps_http_and_https() {
    assert_eq!(
      escape_url("https://example.com/author/alice/"),
      "https://example.com/author/alice/"
    );
    assert_eq!(escape_url("http://example.com/?a=1&b=2"), "http://example.com/?a=1&amp;b=2");
  }

  #[test]
  fn url_rejects_other_schemes() {
    assert_eq!(escape_url("javascript:alert(1)"), "");
    assert_eq!(escape_url("not a url"), "");
  }
}
