//! The plugin's own stylesheet and script, bundled into the binary.

use axum::{http::header, response::IntoResponse};

const STYLESHEET: &str = include_str!("../../assets/css/pcauthors.css");
const SCRIPT: &str = include_str!("../../assets/js/pcauthors.js");

pub async fn stylesheet() -> impl IntoResponse {
  ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

pub async fn script() -> impl IntoResponse {
  ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], SCRIPT)
}
