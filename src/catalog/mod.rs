//! # Catalog Module
//!
//! Audio previews come from Deezer, whose search API is public. The game does not
//! call Deezer directly: the local server exposes `GET /api/search?songName=`
//! ([`CatalogProxy`]) and the game queries that endpoint ([`CatalogClient`]).
//!
//! Nothing here is retried. An empty search result is reported as
//! [`crate::error::ApiError::UpstreamDataEmpty`].

mod client;
mod proxy;

pub use client::CatalogClient;
pub use proxy::CatalogProxy;
