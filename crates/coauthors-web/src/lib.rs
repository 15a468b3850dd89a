//! HTTP host for the contributor components.
//!
//! Exposes an axum [`Router`] with a public post listing and single post view
//! (where the [`ContributorRenderer`] runs) and an authenticated post edit
//! screen (where the [`ContributorEditor`] runs), backed by any
//! [`SiteStore`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use chrono::TimeDelta;
use coauthors_core::{
  VERSION,
  assets::{AssetManifest, ScriptAsset},
  cache::CachedMetaStore,
  editor::ContributorEditor,
  nonce::HashNonces,
  renderer::{ContributorRenderer, SCRIPT_DEPENDENCY},
  site::{GRAVATAR_URL, Site},
  store::{AccountStore, MetaStore, OptionStore, PostCatalog, UserDirectory},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `COAUTHORS_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  /// Public root of the site; author pages live under it.
  pub base_url:            String,
  /// Where `css/pcauthors.css` and `js/pcauthors.js` are served from.
  pub assets_url:          String,
  pub avatar_url:          String,
  pub jquery_url:          String,
  pub store_path:          PathBuf,
  /// Anti-forgery secret. A random one is generated at start-up when unset,
  /// which invalidates open edit forms on restart.
  pub nonce_secret:        Option<String>,
  pub nonce_lifetime_secs: i64,
  /// Platform release reported to the activation check.
  pub platform_version:    String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      base_url:            "http://127.0.0.1:8080/".to_string(),
      assets_url:          "http://127.0.0.1:8080/assets/".to_string(),
      avatar_url:          GRAVATAR_URL.to_string(),
      jquery_url:          "https://code.jquery.com/jquery-3.7.1.min.js".to_string(),
      store_path:          PathBuf::from("~/.local/share/coauthors/coauthors.db"),
      nonce_secret:        None,
      nonce_lifetime_secs: 86_400,
      platform_version:    "6.4".to_string(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Every store capability the host needs, in one bound.
pub trait SiteStore:
  MetaStore + OptionStore + UserDirectory + AccountStore + PostCatalog + Clone + 'static
{
}

impl<T> SiteStore for T where
  T: MetaStore + OptionStore + UserDirectory + AccountStore + PostCatalog + Clone + 'static
{
}

pub type Editor<S> = ContributorEditor<CachedMetaStore<S>, S, HashNonces>;
pub type Renderer<S> = ContributorRenderer<CachedMetaStore<S>, S>;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SiteStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  /// Metadata cache shared by the editor and the renderer.
  pub meta:     Arc<CachedMetaStore<S>>,
  pub editor:   Arc<Editor<S>>,
  pub renderer: Arc<Renderer<S>>,
  /// Registered-but-not-enqueued scripts every page starts from.
  pub assets:   Arc<AssetManifest>,
}

impl<S: SiteStore> AppState<S> {
  /// Wire the components from configuration.
  pub fn new(store: S, config: ServerConfig) -> Result<Self, Error> {
    let site = Arc::new(Site::new(
      &config.base_url,
      &config.assets_url,
      &config.avatar_url,
      VERSION,
    )?);

    let lifetime = TimeDelta::try_seconds(config.nonce_lifetime_secs)
      .filter(|d| *d > TimeDelta::zero())
      .ok_or_else(|| {
        Error::Config(format!(
          "nonce_lifetime_secs must be positive, got {}",
          config.nonce_lifetime_secs
        ))
      })?;
    let nonces = Arc::new(match &config.nonce_secret {
      Some(secret) => HashNonces::new(secret.as_bytes(), lifetime),
      None => HashNonces::random(lifetime),
    });

    let mut assets = AssetManifest::new();
    assets.register_script(ScriptAsset {
      handle:    SCRIPT_DEPENDENCY.to_string(),
      src:       config.jquery_url.clone(),
      deps:      Vec::new(),
      version:   None,
      in_footer: true,
    });

    let meta = Arc::new(CachedMetaStore::new(store.clone()));
    let store = Arc::new(store);

    Ok(Self {
      editor: Arc::new(ContributorEditor::new(meta.clone(), store.clone(), nonces)),
      renderer: Arc::new(ContributorRenderer::new(meta.clone(), store.clone(), site)),
      assets: Arc::new(assets),
      config: Arc::new(config),
      meta,
      store,
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the site.
pub fn router<S: SiteStore>(state: AppState<S>) -> Router {
  Router::new()
    .route("/",                         get(handlers::view::index::<S>))
    .route("/posts/{id}",               get(handlers::view::single::<S>))
    .route("/admin/posts/{id}/edit",    get(handlers::edit::handler::<S>))
    .route("/admin/posts/{id}",         post(handlers::save::handler::<S>))
    .route("/assets/css/pcauthors.css", get(handlers::assets::stylesheet))
    .route("/assets/js/pcauthors.js",   get(handlers::assets::script))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
