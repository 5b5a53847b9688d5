use bggcache::{
    bgg::{
        BggError,
        browse::parse_browse_page,
        collection::parse_collection,
        games::{parse_games, parse_item_ids},
        users::parse_buddies,
        xml::{Field, upstream_error},
    },
    types::{Classification, MISSING},
};
use chrono::NaiveDate;

const CATAN: &str = r#"<?xml version="1.0" encoding="utf-8"?><items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"><item type="boardgame" id="13"><thumbnail>https://example.org/t.jpg</thumbnail><name type="alternate" sortindex="1" value="Die Siedler von Catan"/><name type="primary" sortindex="1" value="CATAN"/><description>Players try to be the dominant force on the island.&amp;#10;&amp;#10;In CATAN&amp;mdash;players collect &amp;quot;resources&amp;quot;   and build.</description><yearpublished value="1995"/><minplayers value="3"/><maxplayers value="4"/><playingtime value="120"/><minplaytime value="60"/><maxplaytime value="120"/><link type="boardgamecategory" id="1021" value="Economic"/><link type="boardgamecategory" id="1026" value="Negotiation"/><link type="boardgamemechanic" id="2072" value="Dice Rolling"/><link type="boardgamefamily" id="3" value="Catan"/><link type="boardgameexpansion" id="926" value="Catan: 5-6 Player Extension"/><link type="boardgameexpansion" id="325" value="Catan: Seafarers"/><link type="boardgamedesigner" id="11" value="Klaus Teuber"/><link type="boardgameartist" id="12" value="Volkan Baga"/><link type="boardgamepublisher" id="37" value="KOSMOS"/><link type="boardgamepublisher" id="37" value="KOSMOS"/><statistics page="1"><ratings><usersrated value="123456"/><average value="7.09"/><bayesaverage value="6.95"/><ranks><rank type="subtype" id="1" name="boardgame" friendlyname="Board Game Rank" value="522" bayesaverage="6.95"/><rank type="family" id="5499" name="familygames" friendlyname="Family Game Rank" value="101" bayesaverage="7.0"/></ranks><averageweight value="2.29"/></ratings></statistics></item></items>"#;

const SPARSE: &str = r#"<items><item type="boardgameexpansion" id="99"><name type="primary" value="Tiny Expansion"/><yearpublished value=""/><statistics page="1"><ratings><ranks><rank type="subtype" id="1" name="boardgame" value="Not Ranked"/></ranks></ratings></statistics></item></items>"#;

const COLLECTION: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?><items totalitems="2" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"><item objecttype="thing" objectid="13" subtype="boardgame" collid="1"><name sortindex="1">CATAN</name><yearpublished>1995</yearpublished><stats minplayers="3" maxplayers="4"><rating value="8"><usersrated value="1"/></rating></stats><status own="1" prevowned="0" fortrade="0" want="0" wanttoplay="0" wanttobuy="0" wishlist="0" preordered="0" lastmodified="2023-05-01 10:20:30"/><comment>Classic</comment></item><item objecttype="thing" objectid="822" subtype="boardgame" collid="2"><name sortindex="1">Carcassonne</name><stats><rating value="N/A"/></stats><status own="0" wishlist="1" lastmodified="2023-06-02 08:00:00"/><numplays>4</numplays><wishlistpriority>2</wishlistpriority></item></items>"#;

#[test]
fn test_parse_game_item_full() {
    let games = parse_games(CATAN).unwrap();
    assert_eq!(games.len(), 1);
    let game = &games[0];

    assert_eq!(game.id, 13);
    // primary name wins over the alternate listed first
    assert_eq!(game.name.as_deref(), Some("CATAN"));
    assert_eq!(game.subtype, "boardgame");
    assert_eq!(
        game.description.as_deref(),
        Some("Players try to be the dominant force on the island. In CATAN players collect \"resources\" and build.")
    );
    assert_eq!(game.yearpublished, Some(1995));
    assert_eq!(game.minplayers, Some(3));
    assert_eq!(game.maxplayers, Some(4));
    assert_eq!(game.playingtime, Some(120));
    assert_eq!(game.minplaytime, Some(60));
    assert_eq!(game.maxplaytime, Some(120));
    assert_eq!(game.averating, Some(7.09));
    assert_eq!(game.bayesaverage, Some(6.95));
    assert_eq!(game.bggrank, Some(522));
    assert_eq!(game.averageweight, Some(2.29));
    assert_eq!(game.numratings, Some(123_456));

    assert_eq!(game.categories, vec!["Economic", "Negotiation"]);
    assert_eq!(game.mechanics, vec!["Dice Rolling"]);
    assert_eq!(game.family, vec!["Catan"]);
    assert_eq!(game.designer, vec!["Klaus Teuber"]);
    assert_eq!(game.artist, vec!["Volkan Baga"]);
    // duplicates are kept in document order
    assert_eq!(game.publisher, vec!["KOSMOS", "KOSMOS"]);
    assert_eq!(game.expansions, vec![926, 325]);
}

#[test]
fn test_parse_game_item_sparse() {
    let games = parse_games(SPARSE).unwrap();
    assert_eq!(games.len(), 1);
    let game = &games[0];

    assert_eq!(game.id, 99);
    assert_eq!(game.subtype, "boardgameexpansion");
    assert_eq!(game.name.as_deref(), Some("Tiny Expansion"));

    // missing and malformed values stay absent instead of becoming zero
    assert_eq!(game.description, None);
    assert_eq!(game.yearpublished, None);
    assert_eq!(game.minplayers, None);
    assert_eq!(game.averating, None);
    assert_eq!(game.bggrank, None);
    assert_eq!(game.numratings, None);
    assert!(game.categories.is_empty());
    assert!(game.expansions.is_empty());
}

#[test]
fn test_parse_games_skips_missing_ids() {
    // id 2 was requested but has no item in the response
    let body = r#"<items><item type="boardgame" id="1"><name type="primary" value="One"/></item><item type="boardgame" id="3"><name type="primary" value="Three"/></item></items>"#;
    let games = parse_games(body).unwrap();
    let ids: Vec<u32> = games.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![1, 3]);

    assert_eq!(parse_item_ids(body).unwrap(), vec![1, 3]);
}

#[test]
fn test_parse_games_ambiguous_rank() {
    let body = r#"<items><item type="boardgame" id="5"><rank name="boardgame" value="10"/><rank name="boardgame" value="11"/></item></items>"#;
    let games = parse_games(body).unwrap();
    assert_eq!(games[0].bggrank, None);
}

#[test]
fn test_parse_games_empty_response() {
    let games = parse_games(r#"<items termsofuse="x"></items>"#).unwrap();
    assert!(games.is_empty());

    assert!(matches!(parse_games("not xml"), Err(BggError::Xml(_))));
}

#[test]
fn test_parse_collection() {
    let entries = parse_collection(COLLECTION, "alice").unwrap();
    assert_eq!(entries.len(), 2);

    let catan = &entries[0];
    assert_eq!(catan.id, 13);
    assert_eq!(catan.name, "CATAN");
    assert_eq!(catan.subtype, "boardgame");
    assert_eq!(catan.yearpublished, 1995);
    assert_eq!(catan.own, 1);
    assert_eq!(catan.prevowned, 0);
    assert_eq!(catan.rating, Some(8.0));
    assert_eq!(catan.comment.as_deref(), Some("Classic"));
    assert_eq!(catan.username, "alice");
    assert_eq!(
        catan.lastmodified,
        NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(10, 20, 30)
    );

    // missing numbers use the sentinel, never an absent marker
    assert_eq!(catan.numplays, MISSING);
    assert_eq!(catan.wishlistpriority, MISSING);

    let carcassonne = &entries[1];
    assert_eq!(carcassonne.rating, None);
    assert_eq!(carcassonne.yearpublished, MISSING);
    assert_eq!(carcassonne.own, 0);
    assert_eq!(carcassonne.wishlist, 1);
    assert_eq!(carcassonne.fortrade, MISSING);
    assert_eq!(carcassonne.numplays, 4);
    assert_eq!(carcassonne.wishlistpriority, 2);
    assert_eq!(carcassonne.comment, None);
}

#[test]
fn test_parse_collection_wishlist_priority_attribute() {
    let body = r#"<items totalitems="1"><item objecttype="thing" objectid="31260" subtype="boardgame" collid="7"><name sortindex="1">Agricola</name><status own="0" prevowned="0" fortrade="0" want="0" wanttoplay="0" wanttobuy="0" wishlist="1" wishlistpriority="3" preordered="0" lastmodified="2024-02-10 17:45:00"/><numplays>0</numplays></item></items>"#;
    let entries = parse_collection(body, "alice").unwrap();

    assert_eq!(entries[0].wishlist, 1);
    assert_eq!(entries[0].wishlistpriority, 3);
    assert_eq!(entries[0].numplays, 0);
}

#[test]
fn test_parse_collection_upstream_error() {
    let body = r#"<?xml version="1.0" encoding="utf-8" standalone="yes" ?><errors><error><message>Invalid username specified</message></error></errors>"#;
    match parse_collection(body, "nobody") {
        Err(BggError::Upstream(message)) => assert_eq!(message, "Invalid username specified"),
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[test]
fn test_parse_collection_without_items() {
    let body = r#"<items totalitems="0" termsofuse="x"></items>"#;
    assert!(parse_collection(body, "alice").unwrap().is_empty());
}

#[test]
fn test_parse_buddies() {
    let body = r#"<user id="1" name="alice" termsofuse="x"><buddies total="2" page="1"><buddy id="10" name="bob"/><buddy id="11" name="carol"/></buddies></user>"#;
    let buddies = parse_buddies(body).unwrap();
    let pairs: Vec<(&str, &str)> = buddies
        .iter()
        .map(|b| (b.name.as_str(), b.id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("bob", "10"), ("carol", "11")]);
}

#[test]
fn test_upstream_error_variants() {
    assert_eq!(
        upstream_error(r#"<error message="Rate limit exceeded."/>"#),
        Some("Rate limit exceeded.".to_string())
    );
    assert_eq!(
        upstream_error("<div><error>Not found</error></div>"),
        Some("Not found".to_string())
    );
    assert_eq!(upstream_error("<items></items>"), None);
    assert_eq!(upstream_error("<html><body>oops"), None);
}

#[test]
fn test_field_tri_state() {
    assert_eq!(Field::<u32>::parse(Some("42")), Field::Present(42));
    assert_eq!(Field::<u32>::parse(None), Field::Absent);
    assert_eq!(
        Field::<u32>::parse(Some("Not Ranked")),
        Field::Malformed("Not Ranked".to_string())
    );
    assert_eq!(Field::<u32>::parse(Some("Not Ranked")).ok(), None);
}

#[test]
fn test_parse_browse_page() {
    let html = r#"<table class="forum_table">
        <tr><td class="col"><a href="/boardgamecategory/1021/economic">Economic</a></td><td>&nbsp;</td></tr>
        <tr><td><a href="/boardgamecategory/1022/fantasy">Fantasy</a></td></tr>
        <tr><th>Heading</th></tr>
    </table>"#;

    let rows = parse_browse_page(html);
    assert_eq!(
        rows,
        vec![
            Classification {
                id: "1021".to_string(),
                label: "Economic".to_string()
            },
            Classification {
                id: "1022".to_string(),
                label: "Fantasy".to_string()
            },
        ]
    );
}
