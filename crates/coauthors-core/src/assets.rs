//! Static asset declarations.
//!
//! Components only *declare* what they need through [`AssetRegistry`]; the
//! host decides how the files are delivered. [`AssetManifest`] is the
//! in-process registry that turns declarations into `<link>`/`<script>` tags.

use std::collections::HashSet;

use crate::html::{escape_attr, escape_url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleAsset {
  pub handle:  String,
  pub src:     String,
  pub deps:    Vec<String>,
  pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptAsset {
  pub handle:    String,
  pub src:       String,
  pub deps:      Vec<String>,
  pub version:   Option<String>,
  pub in_footer: bool,
}

/// The asset-delivery collaborator.
pub trait AssetRegistry {
  fn enqueue_style(&mut self, style: StyleAsset);

  fn enqueue_script(&mut self, script: ScriptAsset);
}

/// Collects declarations for one page.
///
/// Enqueuing a handle twice keeps the first declaration. Scripts that are
/// only [registered](AssetManifest::register_script) are emitted when an
/// enqueued script depends on them.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
  styles:     Vec<StyleAsset>,
  scripts:    Vec<ScriptAsset>,
  registered: Vec<ScriptAsset>,
}

impl AssetManifest {
  pub fn new() -> Self { Self::default() }

  /// Make a script available as a dependency without enqueuing it.
  pub fn register_script(&mut self, script: ScriptAsset) {
    if !self.registered.iter().any(|s| s.handle == script.handle) {
      self.registered.push(script);
    }
  }

  pub fn styles(&self) -> &[StyleAsset] { &self.styles }

  pub fn scripts(&self) -> &[ScriptAsset] { &self.scripts }

  /// Tags for the document head: every stylesheet, then header scripts.
  pub fn head_html(&self) -> String {
    let mut out = String::new();
    for style in &self.styles {
      out.push_str(&format!(
        "<link rel=\"stylesheet\" id=\"{}-css\" href=\"{}\" media=\"all\">\n",
        escape_attr(&style.handle),
        versioned(&style.src, style.version.as_deref()),
      ));
    }
    out.push_str(&self.scripts_html(false));
    out
  }

  /// Tags for the end of the body.
  pub fn footer_html(&self) -> String { self.scripts_html(true) }

  fn scripts_html(&self, footer: bool) -> String {
    let mut emitted = HashSet::new();
    let mut out = String::new();
    for script in self.scripts.iter().filter(|s| s.in_footer == footer) {
      self.emit_script(script, &mut emitted, &mut out);
    }
    out
  }

  fn emit_script<'a>(
    &'a self,
    script: &'a ScriptAsset,
    emitted: &mut HashSet<&'a str>,
    out: &mut String,
  ) {
    if !emitted.insert(script.handle.as_str()) {
      return;
    }
    for dep in &script.deps {
      match self.lookup(dep) {
        Some(found) => self.emit_script(found, emitted, out),
        None => tracing::warn!(handle = %script.handle, dependency = %dep, "unresolved script dependency"),
      }
    }
    out.push_str(&format!(
      "<script src=\"{}\" id=\"{}-js\"></script>\n",
      versioned(&script.src, script.version.as_deref()),
      escape_attr(&script.handle),
    ));
  }

  fn lookup(&self, handle: &str) -> Option<&ScriptAsset> {
    self
      .scripts
      .iter()
      .chain(self.registered.iter())
      .find(|s| s.handle == handle)
  }
}

impl AssetRegistry for AssetManifest {
  fn enqueue_style(&mut self, style: StyleAsset) {
    if !self.styles.iter().any(|s| s.handle == style.handle) {
      self.styles.push(style);
    }
  }

  fn enqueue_script(&mut self, script: ScriptAsset) {
    if !self.scripts.iter().any(|s| s.handle == script.handle) {
      self.scripts.push(script);
    }
  }
}

fn versioned(src: &str, version: Option<&str>) -> String {
  let url = match version {
    Some(v) => {
      let sep = if src.contains('?') { '&' } else { '?' };
      format!("{src}{sep}ver={v}")
    }
    None => src.to_owned(),
  };
  escape_url(&url)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn script(handle: &str, deps: &[&str], in_footer: bool) -> ScriptAsset {
    ScriptAsset {
      handle: handle.into(),
      src: format!("https://cdn.example.com/{handle}.js"),
      deps: deps.iter().map(|d| d.to_string()).collect(),
      version: Some("1.0.0".into()),
      in_footer,
    }
  }

  #[test]
  fn style_tag_carries_version() {
    let mut m = AssetManifest::new();
    m.enqueue_style(StyleAsset {
      handle:  "site".into(),
      src:     "https://example.com/site.css".into(),
      deps:    vec![],
      version: Some("2.1".into()),
    });
    assert_eq!(
      m.head_html(),
      "<link rel=\"stylesheet\" id=\"site-css\" href=\"https://example.com/site.css?ver=2.1\" media=\"all\">\n"
    );
  }

  #[test]
  fn duplicate_enqueue_keeps_first() {
    let mut m = AssetManifest::new();
    m.enqueue_script(script("app", &[], true));
    let mut other = script("app", &[], true);
    other.src = "https://elsewhere.example.com/app.js".into();
    m.enqueue_script(other);
    assert_eq!(m.scripts().len(), 1);
    assert!(m.scripts()[0].src.starts_with("https://cdn.example.com/"));
  }

  #[test]
  fn registered_dependency_is_emitted_first_and_once() {
    let mut m = AssetManifest::new();
    m.register_script(script("jquery", &[], false));
    m.enqueue_script(script("a", &["jquery"], true));
    m.enqueue_script(script("b", &["jquery"], true));

    let footer = m.footer_html();
    let jq = footer.find("jquery-js").unwrap();
    let a = footer.find("a-js").unwrap();
    assert!(jq < a);
    assert_eq!(footer.matches("jquery-js").count(), 1);
    assert!(m.head_html().is_empty());
  }

  #[test]
  fn missing_dependency_is_skipped() {
    let mut m = AssetManifest::new();
    m.enqueue_script(script("a", &["nope"], false));
    let head = m.head_html();
    assert!(head.contains("a-js"));
    assert!(!head.contains("nope"));
  }

  #[test]
  fn query_strings_are_extended() {
    assert_eq!(
      versioned("https://example.com/x.js?min=1", Some("3")),
      "https://example.com/x.js?min=1&amp;ver=3"
    );
  }
}
