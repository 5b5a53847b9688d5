use roxmltree::Node;
use tokio::time::sleep;

use crate::{
    bgg::{
        BggClient, BggError, Fetched,
        xml::{self, Field},
    },
    types::{GameFetchMode, GameRecord},
    utils,
};

/// Builds a [`GameRecord`] from one `<item>` of a `thing?stats=1` response.
///
/// Returns `None` only when the item has no numeric `id`. Every other field
/// is looked up on its own; a missing element leaves that field empty.
pub fn parse_game_item(item: Node) -> Option<GameRecord> {
    let id: u32 = Field::parse(item.attribute("id")).ok()?;

    let description = xml::find(item, "description")
        .map(xml::text_of)
        .map(|text| utils::clean_description(&text));

    Some(GameRecord {
        id,
        name: primary_name(item),
        subtype: item.attribute("type").unwrap_or_default().to_string(),
        description,
        yearpublished: xml::attr_field(item, "yearpublished", "value").into_option(id, "yearpublished"),
        minplayers: xml::attr_field(item, "minplayers", "value").into_option(id, "minplayers"),
        maxplayers: xml::attr_field(item, "maxplayers", "value").into_option(id, "maxplayers"),
        playingtime: xml::attr_field(item, "playingtime", "value").into_option(id, "playingtime"),
        minplaytime: xml::attr_field(item, "minplaytime", "value").into_option(id, "minplaytime"),
        maxplaytime: xml::attr_field(item, "maxplaytime", "value").into_option(id, "maxplaytime"),
        averating: xml::attr_field(item, "average", "value").into_option(id, "average"),
        bayesaverage: xml::attr_field(item, "bayesaverage", "value").into_option(id, "bayesaverage"),
        bggrank: board_game_rank(item),
        averageweight: xml::attr_field(item, "averageweight", "value").into_option(id, "averageweight"),
        numratings: xml::attr_field(item, "usersrated", "value").into_option(id, "usersrated"),
        categories: link_values(item, "boardgamecategory"),
        mechanics: link_values(item, "boardgamemechanic"),
        family: link_values(item, "boardgamefamily"),
        designer: link_values(item, "boardgamedesigner"),
        artist: link_values(item, "boardgameartist"),
        publisher: link_values(item, "boardgamepublisher"),
        expansions: link_ids(item, "boardgameexpansion"),
    })
}

/// Parses every `<item>` of a `thing` response, skipping items without an id.
pub fn parse_games(body: &str) -> Result<Vec<GameRecord>, BggError> {
    let doc = xml::parse(body)?;
    Ok(xml::find_all(doc.root(), "item")
        .filter_map(parse_game_item)
        .collect())
}

/// Ids of every `<item>` in a `thing` response.
pub fn parse_item_ids(body: &str) -> Result<Vec<u32>, BggError> {
    let doc = xml::parse(body)?;
    Ok(xml::find_all(doc.root(), "item")
        .filter_map(|item| Field::parse(item.attribute("id")).ok())
        .collect())
}

fn primary_name(item: Node) -> Option<String> {
    let mut names = xml::find_all(item, "name").filter(|n| n.parent() == Some(item));
    let first = names.next()?;
    let primary = std::iter::once(first)
        .chain(names)
        .find(|n| n.attribute("type") == Some("primary"))
        .unwrap_or(first);
    primary.attribute("value").map(str::to_string)
}

/// The overall "boardgame" rank. Zero or several matching ranks, or a
/// non-numeric value such as `Not Ranked`, give `None`.
fn board_game_rank(item: Node) -> Option<u32> {
    let ranks: Vec<Node> = xml::find_all(item, "rank")
        .filter(|r| r.attribute("name") == Some("boardgame"))
        .collect();
    match ranks.as_slice() {
        [rank] => Field::parse(rank.attribute("value")).ok(),
        _ => None,
    }
}

fn links<'a, 'input: 'a>(
    item: Node<'a, 'input>,
    link_type: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    xml::find_all(item, "link").filter(move |l| l.attribute("type") == Some(link_type))
}

fn link_values(item: Node, link_type: &str) -> Vec<String> {
    links(item, link_type)
        .filter_map(|l| l.attribute("value"))
        .map(str::to_string)
        .collect()
}

fn link_ids(item: Node, link_type: &str) -> Vec<u32> {
    links(item, link_type)
        .filter_map(|l| Field::parse(l.attribute("id")).ok())
        .collect()
}

impl BggClient {
    /// Fetches a single game with statistics. `Ok(None)` if it does not exist.
    pub async fn get_game(&self, id: u32) -> Result<Option<GameRecord>, BggError> {
        match self.get_thing(&id.to_string(), &[("stats", "1")]).await? {
            Fetched::Body(body) => Ok(parse_games(&body)?.into_iter().next()),
            Fetched::NotFound => Ok(None),
        }
    }

    /// Fetches the games for `ids`. Ids without a valid item are simply
    /// missing from the result.
    pub async fn get_games(&self, ids: &[u32]) -> Result<Vec<GameRecord>, BggError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        match self.config().fetch_mode {
            GameFetchMode::Batch => {
                match self
                    .get_thing(&utils::join_ids(ids), &[("stats", "1")])
                    .await?
                {
                    Fetched::Body(body) => parse_games(&body),
                    Fetched::NotFound => Ok(Vec::new()),
                }
            }
            GameFetchMode::Probe => self.get_games_one_by_one(ids).await,
        }
    }

    async fn get_games_one_by_one(&self, ids: &[u32]) -> Result<Vec<GameRecord>, BggError> {
        let existing = match self.get_thing(&utils::join_ids(ids), &[]).await? {
            Fetched::Body(body) => parse_item_ids(&body)?,
            Fetched::NotFound => return Ok(Vec::new()),
        };
        sleep(self.config().probe_delay).await;

        let mut games = Vec::with_capacity(existing.len());
        for id in existing {
            if let Some(game) = self.get_game(id).await? {
                games.push(game);
            }
            sleep(self.config().probe_delay).await;
        }
        Ok(games)
    }
}
