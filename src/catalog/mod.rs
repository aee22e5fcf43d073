//! Catalog lookups - locates album artwork in external music catalogs.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types the rest of the app sees
//! - **API DTOs** (`*/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - URL building on top of the injectable [`HttpClient`]
//! - **Matcher** - Album name scoring shared by every catalog
//!
//! Each catalog implements [`CatalogSource`], so the cover resolver can
//! treat them as interchangeable steps of one cascade.

pub mod coverart;
pub mod domain;
pub mod http;
pub mod itunes;
pub mod matcher;
pub mod musicbrainz;
pub mod traits;

pub use domain::{CatalogError, CatalogMatch, CoverSource, MatchConfidence, ReleaseInfo};
pub use http::{HttpClient, HttpError, HttpResponse, ReqwestHttpClient};
pub use itunes::ITunesCatalog;
pub use matcher::match_album;
pub use musicbrainz::MusicBrainzCatalog;
pub use traits::CatalogSource;
