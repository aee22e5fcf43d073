//! iTunes Search HTTP client
//!
//! One endpoint for everything: a free-text term plus an entity type.
//! No API key required. Apple throttles at roughly 20 calls per minute.

use std::sync::Arc;
use std::time::Duration;

use super::dto;
use crate::catalog::domain::CatalogError;
use crate::catalog::http::{HttpClient, fetch_json};

pub const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";

/// Which kind of hit to search for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Album,
    Song,
}

impl Entity {
    fn as_str(self) -> &'static str {
        match self {
            Entity::Album => "album",
            Entity::Song => "song",
        }
    }
}

/// iTunes Search API client
pub struct ITunesClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    country: String,
    timeout: Duration,
}

impl ITunesClient {
    pub fn with_base_url(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        country: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            country: country.into(),
            timeout,
        }
    }

    pub async fn search(
        &self,
        term: &str,
        entity: Entity,
        limit: u32,
    ) -> Result<dto::SearchResponse, CatalogError> {
        let url = format!(
            "{}/search?term={}&entity={}&limit={}&country={}",
            self.base_url,
            urlencoding::encode(term.trim()),
            entity.as_str(),
            limit,
            urlencoding::encode(&self.country)
        );
        fetch_json(self.http.as_ref(), &url, self.timeout).await
    }
}
