use std::collections::HashMap;

use chrono::NaiveDateTime;
use roxmltree::Node;

use crate::{
    bgg::{
        BggClient, BggError, Fetched,
        xml::{self, Field},
    },
    types::{CollectionEntry, MISSING},
};

const LASTMODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The two requests a collection is split into. Without the split the API
/// reports expansions as `subtype="boardgame"`.
const COLLECTION_QUERIES: [[(&str, &str); 2]; 2] = [
    [("excludesubtype", "boardgameexpansion"), ("stats", "1")],
    [("subtype", "boardgameexpansion"), ("stats", "1")],
];

/// Builds a [`CollectionEntry`] from one `<item>` of a collection response.
pub fn parse_collection_item(item: Node, username: &str) -> Option<CollectionEntry> {
    let id: u32 = Field::parse(item.attribute("objectid")).ok()?;

    // status attributes are kept as text and coerced below
    let status: HashMap<&str, &str> = xml::find(item, "status")
        .map(|s| s.attributes().map(|a| (a.name(), a.value())).collect())
        .unwrap_or_default();
    let flag = |name: &str| coerce(Field::parse(status.get(name).copied()));

    let rating = match xml::find(item, "rating").and_then(|r| r.attribute("value")) {
        Some("N/A") | None => None,
        Some(raw) => Field::parse(Some(raw)).into_option(id, "rating"),
    };

    Some(CollectionEntry {
        id,
        name: xml::find(item, "name").map(xml::text_of).unwrap_or_default(),
        subtype: item.attribute("subtype").unwrap_or_default().to_string(),
        yearpublished: coerce(xml::text_field(item, "yearpublished")),
        own: flag("own"),
        prevowned: flag("prevowned"),
        fortrade: flag("fortrade"),
        want: flag("want"),
        wanttoplay: flag("wanttoplay"),
        wanttobuy: flag("wanttobuy"),
        wishlist: flag("wishlist"),
        preordered: flag("preordered"),
        lastmodified: status
            .get("lastmodified")
            .and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), LASTMODIFIED_FORMAT).ok()),
        rating,
        numplays: coerce(xml::text_field(item, "numplays")),
        // sent as a status attribute; older payloads carry it as an element
        wishlistpriority: match status.get("wishlistpriority").copied() {
            Some(raw) => coerce(Field::parse(Some(raw))),
            None => coerce(xml::text_field(item, "wishlistpriority")),
        },
        comment: xml::find(item, "comment").map(xml::text_of),
        username: username.to_string(),
    })
}

/// Parses a collection response. An upstream error payload becomes
/// [`BggError::Upstream`].
pub fn parse_collection(body: &str, username: &str) -> Result<Vec<CollectionEntry>, BggError> {
    if let Some(message) = xml::upstream_error(body) {
        return Err(BggError::Upstream(message));
    }

    let doc = xml::parse(body)?;
    Ok(xml::find_all(doc.root(), "item")
        .filter_map(|item| parse_collection_item(item, username))
        .collect())
}

fn coerce(field: Field<i32>) -> i32 {
    field.ok().unwrap_or(MISSING)
}

impl BggClient {
    /// Fetches a user's full collection, base games first, then expansions,
    /// sorted by name.
    ///
    /// An empty result means the user has not logged a collection; it is not
    /// an error.
    pub async fn fetch_collection(&self, username: &str) -> Result<Vec<CollectionEntry>, BggError> {
        let username = username.trim();
        let mut entries = Vec::new();

        for params in COLLECTION_QUERIES.iter() {
            let body = match self.get_collection(username, params).await? {
                Fetched::Body(body) => body,
                Fetched::NotFound => return Err(BggError::Upstream("Page not found".to_string())),
            };
            entries.extend(parse_collection(&body, username)?);
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
