use crate::{
    bgg::{BggClient, BggError, Fetched, xml},
    types::Buddy,
};

/// Parses the `<buddy>` entries of a `users?buddies=1` response.
pub fn parse_buddies(body: &str) -> Result<Vec<Buddy>, BggError> {
    if let Some(message) = xml::upstream_error(body) {
        return Err(BggError::Upstream(message));
    }

    let doc = xml::parse(body)?;
    Ok(xml::find_all(doc.root(), "buddy")
        .map(|b| Buddy {
            name: b.attribute("name").unwrap_or_default().to_string(),
            id: b.attribute("id").unwrap_or_default().to_string(),
        })
        .collect())
}

impl BggClient {
    /// Fetches the geekbuddies of a user.
    ///
    /// Only the first page is requested, so at most 1000 buddies come back.
    pub async fn fetch_buddies(&self, username: &str) -> Result<Vec<Buddy>, BggError> {
        match self.get_user(username, &[("buddies", "1")]).await? {
            Fetched::Body(body) => parse_buddies(&body),
            Fetched::NotFound => Err(BggError::Upstream("Page not found".to_string())),
        }
    }
}
