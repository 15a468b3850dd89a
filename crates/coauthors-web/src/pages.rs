//! Minimal HTML page templates for the host.

use coauthors_core::{
  assets::AssetManifest,
  editor::METABOX_TITLE,
  html::{escape_attr, escape_html},
  post::Post,
};

/// Wrap `body` in a complete document, with the manifest's tags in the head
/// and at the end of the body.
pub fn layout(title: &str, assets: &AssetManifest, body: &str) -> String {
  format!(
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n{head}</head>\n<body>\n{body}{footer}</body>\n</html>\n",
    title = escape_html(title),
    head = assets.head_html(),
    footer = assets.footer_html(),
  )
}

/// One `<article>`; `content` is the (possibly augmented) post body and is
/// trusted markup.
pub fn article(post: &Post, content: &str, permalink: bool) -> String {
  let heading = if permalink {
    format!("<a href=\"/posts/{}\">{}</a>", post.id, escape_html(&post.title))
  } else {
    escape_html(&post.title)
  };
  format!(
    "<article id=\"post-{id}\">\n<h2>{heading}</h2>\n<div class=\"entry-content\">\n{content}\n</div>\n</article>\n",
    id = post.id,
  )
}

/// The post edit screen. `metabox` is `None` when the contributor box does
/// not apply to this kind of post.
pub fn edit_screen(post: &Post, metabox: Option<&str>) -> String {
  let mut out = format!(
    "<h1>Edit {}</h1>\n<form method=\"post\" action=\"/admin/posts/{}\">\n<p><input type=\"text\" disabled value=\"{}\"></p>\n",
    escape_html(&post.title),
    post.id,
    escape_attr(&post.title),
  );
  if let Some(metabox) = metabox {
    out.push_str(&format!(
      "<div id=\"pcauthors-metabox\" class=\"postbox\">\n<h2>{}</h2>\n<div class=\"inside\">\n{metabox}</div>\n</div>\n",
      escape_html(METABOX_TITLE),
    ));
  }
  out.push_str("<p><button type=\"submit\">Update</button></p>\n</form>\n");
  out
}

#[cfg(test)]
mod tests {
  use coauthors_core::{
    assets::{AssetRegistry as _, StyleAsset},
    ids::{PostId, UserId},
    post::PostType,
  };

  use super::*;

  fn post() -> Post {
    Post {
      id:        PostId(4),
      author:    UserId(1),
      post_type: PostType::Post,
      title:     "Fish & <Chips>".into(),
      content:   "<p>Body</p>".into(),
    }
  }

  #[test]
  fn layout_places_asset_tags() {
    let mut assets = AssetManifest::new();
    assets.enqueue_style(StyleAsset {
      handle:  "x".into(),
      src:     "https://cdn.example.com/x.css".into(),
      deps:    Vec::new(),
      version: None,
    });
    let html = layout("T", &assets, "<main></main>\n");
    let head_end = html.find("</head>").unwrap();
    assert!(html.find("x-css").unwrap() < head_end);
    assert!(html.contains("<main></main>"));
  }

  #[test]
  fn article_escapes_title_but_not_content() {
    let html = article(&post(), "<p>Body</p>", true);
    assert!(html.contains("<a href=\"/posts/4\">Fish &amp; &lt;Chips&gt;</a>"));
    assert!(html.contains("<p>Body</p>"));
  }

  #[test]
  fn edit_screen_without_metabox() {
    let html = edit_screen(&post(), None);
    assert!(html.contains("action=\"/admin/posts/4\""));
    assert!(!html.contains("pcauthors-metabox"));
  }

  #[test]
  fn edit_screen_with_metabox() {
    let html = edit_screen(&post(), Some("<ul class=\"pcauthors-list\"></ul>\n"));
    assert!(html.contains("<h2>Contributors</h2>"));
    assert!(html.contains("pcauthors-list"));
  }
}
