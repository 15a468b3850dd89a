//! Core types, collaborator traits and the two contributor components.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! [`editor::ContributorEditor`] and [`renderer::ContributorRenderer`] are
//! built from injected collaborators (see [`store`], [`nonce`], [`assets`],
//! [`user::Capabilities`]) and invoked directly by whatever hosts them.

// Native `async fn` in traits; the store traits spell out `Send` futures
// explicitly, so the advisory lint is noise here.
#![allow(async_fn_in_trait)]

pub mod assets;
pub mod cache;
pub mod editor;
pub mod error;
pub mod html;
pub mod ids;
pub mod lifecycle;
pub mod memory;
pub mod nonce;
pub mod post;
pub mod renderer;
pub mod site;
pub mod store;
pub mod user;

pub use error::{Error, Result};

/// Plugin version marker, written on activation and used to version assets.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
