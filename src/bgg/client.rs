use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{bgg::BggError, bgg::xml, config::Config, utils};

/// Body of a successful response, or the 404 marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Body(String),
    NotFound,
}

impl Fetched {
    /// The body, or `None` for a 404.
    pub fn body(self) -> Option<String> {
        match self {
            Fetched::Body(body) => Some(body),
            Fetched::NotFound => None,
        }
    }
}

/// HTTP client for the BoardGameGeek XML API.
///
/// Built once from a [`Config`]; carries the base URLs, poll delays and the
/// bearer token used on authenticated endpoints.
pub struct BggClient {
    http: Client,
    config: Config,
}

impl BggClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Retrieves one or more "things" (games, expansions, accessories).
    ///
    /// `ids` is a single id or a comma-separated list. Every `(key, value)`
    /// pair in `params` is appended to the query string, e.g. `("stats", "1")`.
    ///
    /// Returns the response body with newline and tab characters removed, or
    /// [`Fetched::NotFound`] on a 404. While the API answers 202 the request
    /// is repeated after the configured item delay.
    pub async fn get_thing(&self, ids: &str, params: &[(&str, &str)]) -> Result<Fetched, BggError> {
        let url = format!("{}/thing", self.config.api_url);
        let mut query = vec![("id", ids.trim())];
        query.extend_from_slice(params);
        self.fetch(&url, &query, false, self.config.item_queue_delay)
            .await
    }

    /// Retrieves one page of a user's collection. Authenticated.
    pub async fn get_collection(
        &self,
        username: &str,
        params: &[(&str, &str)],
    ) -> Result<Fetched, BggError> {
        let url = format!("{}/collection", self.config.api_url);
        let mut query = vec![("username", username.trim())];
        query.extend_from_slice(params);
        self.fetch(&url, &query, true, self.config.collection_queue_delay)
            .await
    }

    /// Retrieves a user record. Authenticated.
    pub async fn get_user(&self, name: &str, params: &[(&str, &str)]) -> Result<Fetched, BggError> {
        let url = format!("{}/users", self.config.api_url);
        let mut query = vec![("name", name.trim())];
        query.extend_from_slice(params);
        self.fetch(&url, &query, true, self.config.collection_queue_delay)
            .await
    }

    /// Retrieves an HTML page below the browse URL, e.g. `boardgamecategory`.
    pub async fn get_browse_page(&self, page: &str) -> Result<String, BggError> {
        let url = format!("{}/{}", self.config.browse_url, page);
        match self
            .fetch(&url, &[], false, self.config.item_queue_delay)
            .await?
        {
            Fetched::Body(body) => Ok(body),
            Fetched::NotFound => Err(BggError::NotFound),
        }
    }

    async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
        authenticated: bool,
        queue_delay: Duration,
    ) -> Result<Fetched, BggError> {
        loop {
            let mut request = self.http.get(url).query(query);
            if authenticated {
                let token = self.config.token.as_deref().ok_or(BggError::MissingToken)?;
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            match response.status() {
                StatusCode::NOT_FOUND => return Ok(Fetched::NotFound),
                StatusCode::ACCEPTED => {
                    // queued upstream, poll again
                    sleep(queue_delay).await;
                    continue;
                }
                status => {
                    let body = utils::strip_layout(&response.text().await?);
                    if status.is_success() {
                        return Ok(Fetched::Body(body));
                    }

                    let message = xml::upstream_error(&body)
                        .unwrap_or_else(|| format!("Request failed with status {}", status));
                    return Err(BggError::Upstream(message));
                }
            }
        }
    }
}
