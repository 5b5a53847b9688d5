use std::{path::PathBuf, time::Duration};

use bggcache::{
    bgg::{BggClient, BggError, Fetched},
    config::Config,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

// Helper function to build a raw HTTP response
fn response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

/// Serves `responses` in order, one per connection, and returns the raw
/// requests it received.
async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for reply in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            requests.push(String::from_utf8_lossy(&raw).to_string());
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

fn config(api_url: &str, token: Option<&str>) -> Config {
    let mut config = Config::new(PathBuf::from("unused"));
    config.api_url = api_url.to_string();
    config.browse_url = api_url.to_string();
    config.token = token.map(str::to_string);
    config.item_queue_delay = Duration::ZERO;
    config.collection_queue_delay = Duration::ZERO;
    config
}

#[tokio::test]
async fn test_queued_request_is_polled_until_ready() {
    let (url, server) = serve(vec![
        response("202 Accepted", ""),
        response("202 Accepted", ""),
        response("200 OK", "<items>\n\t<item type=\"boardgame\" id=\"13\"/>\n</items>"),
    ])
    .await;
    let client = BggClient::new(&config(&url, Some("secret")));

    let fetched = client.get_thing("13", &[("stats", "1")]).await.unwrap();
    assert_eq!(
        fetched,
        Fetched::Body("<items><item type=\"boardgame\" id=\"13\"/></items>".to_string())
    );

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].starts_with("GET /thing?id=13&stats=1 "));
    // item lookups are anonymous even when a token is configured
    assert!(
        requests
            .iter()
            .all(|r| !r.to_lowercase().contains("authorization:"))
    );
}

#[tokio::test]
async fn test_not_found_is_not_an_error() {
    let (url, server) = serve(vec![response("404 Not Found", "<html>gone</html>")]).await;
    let client = BggClient::new(&config(&url, None));

    let fetched = client.get_thing("999999999", &[]).await.unwrap();
    assert_eq!(fetched, Fetched::NotFound);
    assert_eq!(fetched.body(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn test_error_payload_becomes_upstream_error() {
    let (url, server) = serve(vec![response(
        "400 Bad Request",
        "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\" ?><errors><error><message>Invalid username specified</message></error></errors>",
    )])
    .await;
    let client = BggClient::new(&config(&url, Some("secret")));

    match client.get_collection("nobody", &[("stats", "1")]).await {
        Err(BggError::Upstream(message)) => assert_eq!(message, "Invalid username specified"),
        other => panic!("expected upstream error, got {:?}", other),
    }

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("GET /collection?username=nobody&stats=1 "));
    assert!(
        requests[0]
            .to_lowercase()
            .contains("authorization: bearer secret")
    );
}

#[tokio::test]
async fn test_failure_without_payload() {
    let (url, server) = serve(vec![response("500 Internal Server Error", "")]).await;
    let client = BggClient::new(&config(&url, None));

    match client.get_thing("13", &[]).await {
        Err(BggError::Upstream(message)) => assert!(message.contains("500")),
        other => panic!("expected upstream error, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_authenticated_call_needs_token() {
    // nothing listens here; the call must fail before any request
    let client = BggClient::new(&config("http://127.0.0.1:9", None));

    assert!(matches!(
        client.get_user("alice", &[("buddies", "1")]).await,
        Err(BggError::MissingToken)
    ));
}

#[tokio::test]
async fn test_fetch_collection_merges_both_subtypes() {
    let (url, server) = serve(vec![
        response(
            "200 OK",
            r#"<items totalitems="1"><item objecttype="thing" objectid="822" subtype="boardgame"><name>Carcassonne</name><status own="1"/></item></items>"#,
        ),
        response(
            "200 OK",
            r#"<items totalitems="1"><item objecttype="thing" objectid="926" subtype="boardgameexpansion"><name>Agricola: Farmers</name><status own="0" wishlist="1" wishlistpriority="4"/></item></items>"#,
        ),
    ])
    .await;
    let client = BggClient::new(&config(&url, Some("secret")));

    let entries = client.fetch_collection("alice").await.unwrap();

    // sorted by name across both calls
    let ids: Vec<u32> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![926, 822]);
    assert_eq!(entries[0].subtype, "boardgameexpansion");
    assert_eq!(entries[0].wishlistpriority, 4);

    let requests = server.await.unwrap();
    assert!(requests[0].contains("excludesubtype=boardgameexpansion"));
    assert!(requests[1].contains("subtype=boardgameexpansion"));
    assert!(!requests[1].contains("excludesubtype"));
}
